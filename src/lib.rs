//! A fast (and safe) streaming reader for OPC (Open Packaging Conventions)
//! document packages — the zip-of-XML-parts container used by `.xlsx`,
//! `.docx` and `.pptx`.
//!
//! The crate walks a package's relationship graph and delivers every
//! reachable part to a caller-supplied [`PartHandler`], built out of three
//! layers:
//!
//! - [`SaxParser`] — a minimal, zero-copy XML tokenizer with a strict
//!   grammar and an explicit failure model;
//! - [`XmlStreamHandler`] — a context-dispatch engine turning the flat
//!   event stream into a tree of cooperating per-vocabulary
//!   [`XmlContext`] objects;
//! - [`OpcReader`] — the package walker: opens archive entries lazily,
//!   parses the content-types and relationships manifests, resolves
//!   relative part paths (including `..` backtracking) and recurses
//!   depth-first into each part's own relationships.
//!
//! ```no_run
//! use opcx::{OpcReader, PartHandler};
//!
//! struct ListParts;
//!
//! impl PartHandler for ListParts {
//!     type Extra = ();
//!
//!     fn handle_part(&mut self, rel_type: &str, dir: &str, name: &str, _: Option<&()>) -> bool {
//!         println!("{dir}{name} <- {rel_type}");
//!         true
//!     }
//! }
//!
//! let mut handler = ListParts;
//! OpcReader::new(&mut handler).read_file("book.xlsx")?;
//! # Ok::<(), opcx::Error>(())
//! ```

pub mod err;
pub mod opc;
pub mod xml;

pub use err::{Error, ParseError, ParseResult, Result};
pub use opc::archive::{EntryBuf, PackageArchive, ReadSeek};
pub use opc::context::{ContentTypesContext, RelExtras, Relationship, RelationshipsContext};
pub use opc::reader::{CONTENT_TYPES_PART, ContentTypes, OpcReader, PartHandler, resolve_target};
pub use opc::schemas;
pub use xml::context::{Attr, NoopContext, XmlContext, XmlStreamHandler};
pub use xml::handler::SaxHandler;
pub use xml::parser::SaxParser;
