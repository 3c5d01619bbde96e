use log::trace;

use crate::err::{ParseError, ParseResult};
use crate::xml::handler::SaxHandler;

/// A minimal, zero-copy SAX parser over an in-memory buffer.
///
/// The grammar is a deliberately narrow XML subset, just rich enough for
/// OPC manifests and parts:
///
/// - the document must open with an `<?xml ... ?>` header;
/// - names are ASCII: a letter first, then letters, digits or `-`, with an
///   optional single `prefix:` split;
/// - attribute values must be double-quoted and are passed through raw
///   (no entity decoding);
/// - no comments, CDATA, processing instructions or DTD.
///
/// Close tags are balanced against a nesting counter only; the closing
/// name is *not* checked against the most recently opened name, so some
/// corrupt documents parse without error (see the `mismatched_close_tag`
/// test).
///
/// A `SaxParser` borrows the handler for the duration of one `parse()`
/// call and is consumed by it; parsing is not resumable.
pub struct SaxParser<'a, 'h, H: SaxHandler<'a>> {
    content: &'a [u8],
    pos: usize,
    nest_level: u32,
    handler: &'h mut H,
}

impl<'a, 'h, H: SaxHandler<'a>> SaxParser<'a, 'h, H> {
    pub fn new(content: &'a [u8], handler: &'h mut H) -> Self {
        SaxParser {
            content,
            pos: 0,
            nest_level: 0,
            handler,
        }
    }

    /// Drive the whole document: header, then body until end of input.
    ///
    /// Any grammar violation aborts with a [`ParseError`]; events already
    /// delivered to the handler stay delivered.
    pub fn parse(mut self) -> ParseResult<()> {
        trace!("parsing xml, {} bytes", self.content.len());
        self.header()?;
        self.blank();
        self.body()?;
        trace!("finished parsing, nest level {}", self.nest_level);
        Ok(())
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.content.get(self.pos).copied()
    }

    #[inline]
    fn cur_char(&self, what: &'static str) -> ParseResult<u8> {
        self.peek().ok_or(ParseError::UnexpectedEof {
            what,
            offset: self.pos,
        })
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    fn blank(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Re-borrow `content[start..end]` as text.
    ///
    /// Names are ASCII by construction; values and character data are
    /// arbitrary bytes and must be valid UTF-8 to be emitted.
    fn text_slice(&self, start: usize, end: usize) -> ParseResult<&'a str> {
        std::str::from_utf8(&self.content[start..end])
            .map_err(|_| ParseError::NonUtf8Text { offset: start })
    }

    /// `<?xml ... ?>`. Header attributes are validated but not emitted;
    /// they belong to no element.
    fn header(&mut self) -> ParseResult<()> {
        if !self.content.starts_with(b"<?xml") {
            return Err(ParseError::BadHeader { offset: self.pos });
        }
        self.pos += 5;
        self.blank();
        while self.cur_char("xml header")? != b'?' {
            self.attribute(false)?;
            self.blank();
        }
        self.advance();
        if self.cur_char("xml header")? != b'>' {
            return Err(ParseError::BadHeader { offset: self.pos });
        }
        self.advance();
        Ok(())
    }

    fn body(&mut self) -> ParseResult<()> {
        while self.pos < self.content.len() {
            if self.peek() == Some(b'<') {
                self.element()?;
            } else {
                self.characters()?;
            }
        }
        Ok(())
    }

    fn element(&mut self) -> ParseResult<()> {
        // Caller guarantees we sit on '<'.
        self.advance();
        if self.cur_char("element")? == b'/' {
            self.element_close()
        } else {
            self.element_open()
        }
    }

    fn element_open(&mut self) -> ParseResult<()> {
        let (ns, name) = self.qualified_name()?;

        loop {
            self.blank();
            match self.cur_char("element open tag")? {
                b'/' => {
                    // Self-closing element: start and end back to back,
                    // nesting unchanged.
                    self.advance();
                    if self.cur_char("element open tag")? != b'>' {
                        return Err(ParseError::BadTag {
                            what: "expected `/>` to self-close the element",
                            offset: self.pos,
                        });
                    }
                    self.advance();
                    self.handler.start_element(ns, name);
                    self.handler.end_element(ns, name);
                    return Ok(());
                }
                b'>' => {
                    self.advance();
                    self.handler.start_element(ns, name);
                    self.nest_level += 1;
                    return Ok(());
                }
                _ => self.attribute(true)?,
            }
        }
    }

    fn element_close(&mut self) -> ParseResult<()> {
        // Caller guarantees we sit on '/'. The nesting counter is the only
        // balance check; the closing name is taken on faith.
        if self.nest_level == 0 {
            return Err(ParseError::UnbalancedClose { offset: self.pos });
        }
        self.nest_level -= 1;
        self.advance();

        let (ns, name) = self.qualified_name()?;
        if self.cur_char("element close tag")? != b'>' {
            return Err(ParseError::BadTag {
                what: "expected `>` to close the element",
                offset: self.pos,
            });
        }
        self.advance();
        self.handler.end_element(ns, name);
        Ok(())
    }

    /// Maximal run up to the next `<`; emitted only if non-empty.
    fn characters(&mut self) -> ParseResult<()> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c != b'<') {
            self.pos += 1;
        }
        if self.pos > start {
            let text = self.text_slice(start, self.pos)?;
            self.handler.characters(text);
        }
        Ok(())
    }

    fn attribute(&mut self, emit: bool) -> ParseResult<()> {
        let (ns, name) = self.qualified_name()?;
        if self.cur_char("attribute")? != b'=' {
            return Err(ParseError::BadAttribute {
                what: "attribute must be of the form `name=\"value\"`",
                offset: self.pos,
            });
        }
        self.advance();
        let value = self.value()?;
        if emit {
            self.handler.attribute(ns, name, value);
        }
        Ok(())
    }

    /// `[prefix:]name`, split on the first `:`.
    fn qualified_name(&mut self) -> ParseResult<(&'a str, &'a str)> {
        let first = self.name()?;
        if self.peek() == Some(b':') {
            self.advance();
            let local = self.name()?;
            Ok((first, local))
        } else {
            Ok(("", first))
        }
    }

    fn name(&mut self) -> ParseResult<&'a str> {
        let start = self.pos;
        let c = self.cur_char("name")?;
        if !c.is_ascii_alphabetic() {
            return Err(ParseError::BadName {
                found: c as char,
                offset: self.pos,
            });
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'-') {
            self.pos += 1;
        }
        self.text_slice(start, self.pos)
    }

    fn value(&mut self) -> ParseResult<&'a str> {
        if self.cur_char("attribute value")? != b'"' {
            return Err(ParseError::BadAttribute {
                what: "attribute value must be quoted",
                offset: self.pos,
            });
        }
        self.advance();
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => break,
                Some(_) => self.pos += 1,
                None => {
                    return Err(ParseError::UnexpectedEof {
                        what: "attribute value",
                        offset: self.pos,
                    });
                }
            }
        }
        let value = self.text_slice(start, self.pos)?;
        // Skip the closing quote.
        self.advance();
        Ok(value)
    }
}
