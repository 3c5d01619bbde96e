/// Receiver for the ordered event stream produced by [`SaxParser`].
///
/// All slices borrow from the document buffer handed to the parser and are
/// only valid while that buffer lives. Namespace prefixes arrive verbatim
/// (no URI resolution at this layer); an element or attribute without a
/// prefix gets an empty `ns`.
///
/// Event order within one open tag is `attribute`* then `start_element`,
/// matching the order the bytes are encountered. A self-closing element
/// emits `start_element` immediately followed by `end_element`.
///
/// [`SaxParser`]: crate::xml::parser::SaxParser
pub trait SaxHandler<'a> {
    fn start_element(&mut self, ns: &'a str, name: &'a str);

    fn end_element(&mut self, ns: &'a str, name: &'a str);

    fn attribute(&mut self, ns: &'a str, name: &'a str, value: &'a str);

    /// Character data between tags. Never called with an empty slice.
    fn characters(&mut self, text: &'a str);
}
