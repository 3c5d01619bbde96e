//! The two fixed manifest vocabularies: content-type declarations and
//! relationship lists. Both are root contexts for the dispatch engine and
//! hand their accumulated results out through `pop_*` methods, leaving the
//! context empty for reuse on the next manifest file.
//!
//! The parser reports namespace *prefixes*, not URIs, and both manifests
//! are conventionally written in the default namespace. Each context
//! therefore claims its vocabulary by local name and checks the `xmlns`
//! declared on the root element against the expected schema, logging a
//! mismatch without gating on it.

use std::any::Any;
use std::mem;

use hashbrown::HashMap;
use log::{debug, warn};

use crate::opc::schemas;
use crate::xml::context::{Attr, NoopContext, XmlContext};

pub const NS_CONTENT_TYPES: &str = schemas::SCH_OPC_CONTENT_TYPES;
pub const NS_RELATIONSHIPS: &str = schemas::SCH_OPC_RELS;

/// A typed, identified edge from one part (or the package root) to another
/// part or external resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    /// Target path, possibly relative to the owning part's directory.
    pub target: String,
    /// Relationship type (schema URI), see [`crate::opc::schemas`].
    pub rel_type: String,
    /// `TargetMode="External"` — the target is not a part of this package.
    pub external: bool,
}

/// Caller-supplied side-channel data keyed by relationship id, passed
/// through to the part handler untouched.
pub type RelExtras<E> = HashMap<String, E>;

fn attr_value<'a>(attrs: &'a [Attr], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.ns.is_empty() && a.name == name)
        .map(|a| a.value.as_str())
}

fn check_xmlns(attrs: &[Attr], expected: &str, manifest: &str) {
    if let Some(ns) = attr_value(attrs, "xmlns") {
        if ns != expected {
            warn!("{manifest} declares unexpected namespace `{ns}`");
        }
    }
}

/// Root context for `[Content_Types].xml`.
///
/// Collects `Default` entries (keyed by file extension, no dot) and
/// `Override` entries (keyed by exact part name with a leading `/`), each
/// mapping to a MIME string.
#[derive(Debug, Default)]
pub struct ContentTypesContext {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypesContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer the extension defaults out, emptying the context.
    pub fn pop_defaults(&mut self) -> HashMap<String, String> {
        mem::take(&mut self.defaults)
    }

    /// Transfer the exact-path overrides out, emptying the context.
    pub fn pop_overrides(&mut self) -> HashMap<String, String> {
        mem::take(&mut self.overrides)
    }
}

impl XmlContext for ContentTypesContext {
    fn can_handle_element(&self, _ns: &str, name: &str) -> bool {
        matches!(name, "Types" | "Default" | "Override")
    }

    fn create_child_context(&self, _ns: &str, _name: &str) -> Box<dyn XmlContext> {
        Box::new(NoopContext::default())
    }

    fn start_element(&mut self, _ns: &str, name: &str, attrs: &[Attr]) {
        match name {
            "Types" => check_xmlns(attrs, NS_CONTENT_TYPES, "[Content_Types].xml"),
            "Default" => {
                if let (Some(ext), Some(ct)) = (
                    attr_value(attrs, "Extension"),
                    attr_value(attrs, "ContentType"),
                ) {
                    self.defaults.insert(ext.to_owned(), ct.to_owned());
                } else {
                    debug!("Default entry missing Extension or ContentType");
                }
            }
            "Override" => {
                if let (Some(part), Some(ct)) = (
                    attr_value(attrs, "PartName"),
                    attr_value(attrs, "ContentType"),
                ) {
                    self.overrides.insert(part.to_owned(), ct.to_owned());
                } else {
                    debug!("Override entry missing PartName or ContentType");
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _ns: &str, name: &str) -> bool {
        name == "Types"
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Root context for a `_rels/<name>.rels` relationship list.
///
/// Must be re-`init`-ed before reuse on the next relationship file.
#[derive(Debug, Default)]
pub struct RelationshipsContext {
    rels: Vec<Relationship>,
}

impl RelationshipsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset accumulated state before parsing the next manifest.
    pub fn init(&mut self) {
        self.rels.clear();
    }

    /// Transfer the collected relationships out, emptying the context.
    pub fn pop_rels(&mut self) -> Vec<Relationship> {
        mem::take(&mut self.rels)
    }
}

impl XmlContext for RelationshipsContext {
    fn can_handle_element(&self, _ns: &str, name: &str) -> bool {
        matches!(name, "Relationships" | "Relationship")
    }

    fn create_child_context(&self, _ns: &str, _name: &str) -> Box<dyn XmlContext> {
        Box::new(NoopContext::default())
    }

    fn start_element(&mut self, _ns: &str, name: &str, attrs: &[Attr]) {
        match name {
            "Relationships" => check_xmlns(attrs, NS_RELATIONSHIPS, "relationships manifest"),
            "Relationship" => {
                let id = attr_value(attrs, "Id");
                let target = attr_value(attrs, "Target");
                let rel_type = attr_value(attrs, "Type");
                let external = attr_value(attrs, "TargetMode") == Some("External");

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    self.rels.push(Relationship {
                        id: id.to_owned(),
                        target: target.to_owned(),
                        rel_type: rel_type.to_owned(),
                        external,
                    });
                } else {
                    debug!("Relationship entry missing Id, Target or Type");
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _ns: &str, name: &str) -> bool {
        name == "Relationships"
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
