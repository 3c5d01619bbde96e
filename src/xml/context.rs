use std::any::Any;

use log::trace;

use crate::xml::handler::SaxHandler;

/// One attribute of an open tag, owned so contexts can hold onto it past
/// the life of the part buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub ns: String,
    pub name: String,
    pub value: String,
}

/// A per-element state object owning the interpretation of one vocabulary
/// subtree.
///
/// Dynamic dispatch in the crate is confined to this boundary: the
/// tokenizer below it is monomorphic, and the stream handler above it only
/// ever talks to the current top of the context stack.
pub trait XmlContext {
    /// Does this context already own element `(ns, name)`?
    fn can_handle_element(&self, ns: &str, name: &str) -> bool;

    /// Produce the child context for an element this one does not own.
    /// Only called when `can_handle_element` returned `false`.
    fn create_child_context(&self, ns: &str, name: &str) -> Box<dyn XmlContext>;

    fn start_element(&mut self, ns: &str, name: &str, attrs: &[Attr]);

    /// `true` means this context is finished for this element and should
    /// be popped (the root context's answer is recorded but it is never
    /// popped).
    fn end_element(&mut self, ns: &str, name: &str) -> bool;

    fn characters(&mut self, _text: &str) {}

    /// Sibling handoff: invoked on the parent right before a finished
    /// child is destroyed, so the parent can pull accumulated results out
    /// of it (downcast through [`XmlContext::as_any_mut`]).
    fn end_child_context(&mut self, _ns: &str, _name: &str, _child: &mut dyn XmlContext) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Swallows a subtree nobody claims, tracking depth so it knows when the
/// unclaimed element is done.
#[derive(Debug, Default)]
pub struct NoopContext {
    depth: u32,
}

impl XmlContext for NoopContext {
    fn can_handle_element(&self, _ns: &str, _name: &str) -> bool {
        true
    }

    fn create_child_context(&self, _ns: &str, _name: &str) -> Box<dyn XmlContext> {
        Box::new(NoopContext::default())
    }

    fn start_element(&mut self, _ns: &str, _name: &str, _attrs: &[Attr]) {
        self.depth += 1;
    }

    fn end_element(&mut self, _ns: &str, _name: &str) -> bool {
        self.depth = self.depth.saturating_sub(1);
        self.depth == 0
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Turns the flat SAX event stream into a tree of cooperating contexts.
///
/// The root context is owned by the handler and lives for its whole
/// lifetime; children are pushed when the current top declines an element
/// and popped when they report themselves finished, with the parent given
/// a chance to extract results via `end_child_context` before the child is
/// dropped.
///
/// Attribute events precede their `start_element` on the wire, so they are
/// buffered here and delivered together with it.
pub struct XmlStreamHandler<R: XmlContext> {
    root: R,
    stack: Vec<Box<dyn XmlContext>>,
    pending_attrs: Vec<Attr>,
}

impl<R: XmlContext> XmlStreamHandler<R> {
    pub fn new(root: R) -> Self {
        XmlStreamHandler {
            root,
            stack: Vec::new(),
            pending_attrs: Vec::new(),
        }
    }

    pub fn root_mut(&mut self) -> &mut R {
        &mut self.root
    }

    pub fn into_root(self) -> R {
        self.root
    }

    fn current(&self) -> &dyn XmlContext {
        match self.stack.last() {
            Some(ctx) => ctx.as_ref(),
            None => &self.root,
        }
    }

    fn current_mut(&mut self) -> &mut dyn XmlContext {
        match self.stack.last_mut() {
            Some(ctx) => ctx.as_mut(),
            None => &mut self.root,
        }
    }
}

impl<'a, R: XmlContext> SaxHandler<'a> for XmlStreamHandler<R> {
    fn start_element(&mut self, ns: &'a str, name: &'a str) {
        let attrs = std::mem::take(&mut self.pending_attrs);

        if !self.current().can_handle_element(ns, name) {
            trace!("pushing child context for <{}:{}>", ns, name);
            let child = self.current().create_child_context(ns, name);
            self.stack.push(child);
        }

        self.current_mut().start_element(ns, name, &attrs);
    }

    fn end_element(&mut self, ns: &'a str, name: &'a str) {
        let ended = self.current_mut().end_element(ns, name);

        if ended {
            if let Some(mut child) = self.stack.pop() {
                trace!("popping context at </{}:{}>", ns, name);
                let parent: &mut dyn XmlContext = match self.stack.last_mut() {
                    Some(ctx) => ctx.as_mut(),
                    None => &mut self.root,
                };
                parent.end_child_context(ns, name, child.as_mut());
            }
        }
    }

    fn attribute(&mut self, ns: &'a str, name: &'a str, value: &'a str) {
        self.pending_attrs.push(Attr {
            ns: ns.to_owned(),
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn characters(&mut self, text: &'a str) {
        self.current_mut().characters(text);
    }
}
