use std::fs::File;
use std::path::Path;

use hashbrown::HashMap;
use log::{debug, warn};

use crate::err::{Error, Result};
use crate::opc::archive::{PackageArchive, ReadSeek};
use crate::opc::context::{ContentTypesContext, RelExtras, Relationship, RelationshipsContext};
use crate::xml::context::XmlStreamHandler;
use crate::xml::parser::SaxParser;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Receives every part the walker resolves.
///
/// `handle_part` is invoked once per resolved part with the relationship
/// type, the part's directory (segments joined, each ending in `/`), the
/// file name, and any extra keyed to the relationship id. Returning
/// `false` marks the relationship type unhandled: it is reported and
/// skipped, and the walker does not descend into that part's own
/// relationships.
pub trait PartHandler {
    /// Side-channel data attached to relationships, passed through
    /// untouched.
    type Extra;

    fn handle_part(
        &mut self,
        rel_type: &str,
        dir: &str,
        name: &str,
        extra: Option<&Self::Extra>,
    ) -> bool;

    /// Called right after a part was accepted, before the walker descends
    /// into that part's own relationship list. The returned map keys
    /// extras by relationship id for that nested list.
    fn linked_extras(&mut self) -> Option<RelExtras<Self::Extra>> {
        None
    }
}

/// The content-type mapping declared by `[Content_Types].xml`, retained
/// for a whole package walk.
#[derive(Debug, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Resolve a part path: exact-path override first (keys carry a
    /// leading `/`), else the extension default.
    pub fn resolve(&self, part_path: &str) -> Option<&str> {
        let key = if part_path.starts_with('/') {
            part_path.to_owned()
        } else {
            format!("/{part_path}")
        };
        if let Some(ct) = self.overrides.get(key.as_str()) {
            return Some(ct);
        }
        let (_, ext) = part_path.rsplit_once('.')?;
        self.defaults.get(ext).map(String::as_str)
    }
}

/// Resolve a relationship target against the current directory.
///
/// The target is scanned segment by segment: `..` drops the last
/// directory segment, anything else appends one (stored with its trailing
/// `/`), and the trailing non-slash run is the file name. The caller's
/// directory is taken by reference and never mutated, so sibling and
/// nested resolutions cannot disturb each other.
pub fn resolve_target(dir: &[String], target: &str) -> (Vec<String>, String) {
    let mut resolved = dir.to_vec();
    let mut rest = target;
    while let Some((segment, tail)) = rest.split_once('/') {
        if segment == ".." {
            resolved.pop();
        } else {
            resolved.push(format!("{segment}/"));
        }
        rest = tail;
    }
    (resolved, rest.to_owned())
}

/// Top-level driver: opens the archive, parses `[Content_Types].xml`
/// once, then walks the relationship graph depth-first starting at
/// `_rels/.rels`, dispatching every resolved part to the handler and
/// recursing into each part's own `_rels/<name>.rels`.
///
/// Malformed nested parts are reported and skipped; the walk continues
/// with the remaining relationships. Failures on the two root manifests
/// abort the read with a typed error.
pub struct OpcReader<'h, H: PartHandler> {
    handler: &'h mut H,
    rels_handler: XmlStreamHandler<RelationshipsContext>,
    content_types: ContentTypes,
    /// Normalized part paths currently on the recursion chain; breaks
    /// relationship cycles.
    walk_chain: Vec<String>,
}

impl<'h, H: PartHandler> OpcReader<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        OpcReader {
            handler,
            rels_handler: XmlStreamHandler::new(RelationshipsContext::new()),
            content_types: ContentTypes::default(),
            walk_chain: Vec::new(),
        }
    }

    /// Content-type mapping of the package read last. Empty before the
    /// first read.
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Open a package on disk and walk it. The archive closes on every
    /// exit path when it drops at the end of this call.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("reading package {}", path.display());
        let mut archive: PackageArchive<File> = PackageArchive::from_path(path)?;
        self.read_archive(&mut archive)
    }

    /// Walk an already-opened archive.
    pub fn read_archive<R: ReadSeek>(&mut self, archive: &mut PackageArchive<R>) -> Result<()> {
        debug!("archive contains {} entries", archive.len());

        self.content_types = self.read_content_types(archive)?;
        self.walk_chain.clear();

        let root: Vec<String> = Vec::new();
        let rels = self
            .read_relations(archive, &root, "")?
            .ok_or_else(|| Error::EntryNotFound {
                path: "_rels/.rels".to_owned(),
            })?;

        self.process_relationships(archive, rels, &root, None)
    }

    fn read_content_types<R: ReadSeek>(
        &mut self,
        archive: &mut PackageArchive<R>,
    ) -> Result<ContentTypes> {
        let buf = archive.read_entry(CONTENT_TYPES_PART)?;

        let mut handler = XmlStreamHandler::new(ContentTypesContext::new());
        SaxParser::new(buf.data(), &mut handler)
            .parse()
            .map_err(|source| Error::FailedToParsePart {
                path: CONTENT_TYPES_PART.to_owned(),
                source,
            })?;

        let ctx = handler.root_mut();
        Ok(ContentTypes {
            defaults: ctx.pop_defaults(),
            overrides: ctx.pop_overrides(),
        })
    }

    /// Read `_rels/<file_name>.rels` under `dir`. `Ok(None)` means the
    /// manifest does not exist, which is the normal case for most parts.
    fn read_relations<R: ReadSeek>(
        &mut self,
        archive: &mut PackageArchive<R>,
        dir: &[String],
        file_name: &str,
    ) -> Result<Option<Vec<Relationship>>> {
        let rels_path = format!("{}_rels/{file_name}.rels", dir.concat());

        let buf = match archive.read_entry(&rels_path) {
            Ok(buf) => buf,
            Err(Error::EntryNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if buf.actual_len() == 0 {
            return Ok(Some(Vec::new()));
        }

        // One relationships context is reused across every manifest in
        // the package; reset it before each parse.
        self.rels_handler.root_mut().init();
        SaxParser::new(buf.data(), &mut self.rels_handler)
            .parse()
            .map_err(|source| Error::FailedToParsePart {
                path: rels_path.clone(),
                source,
            })?;

        let rels = self.rels_handler.root_mut().pop_rels();
        debug!("{rels_path}: {} relationships", rels.len());
        Ok(Some(rels))
    }

    fn process_relationships<R: ReadSeek>(
        &mut self,
        archive: &mut PackageArchive<R>,
        rels: Vec<Relationship>,
        dir: &[String],
        extras: Option<&RelExtras<H::Extra>>,
    ) -> Result<()> {
        for rel in rels {
            if rel.external {
                debug!("skipping external relationship `{}` -> {}", rel.id, rel.target);
                continue;
            }

            let (part_dir, file_name) = resolve_target(dir, &rel.target);
            if file_name.is_empty() {
                warn!("relationship `{}` targets no file: {}", rel.id, rel.target);
                continue;
            }
            let dir_str = part_dir.concat();
            let part_path = format!("{dir_str}{file_name}");

            let Some(content_type) = self.content_types.resolve(&part_path) else {
                warn!("no content type declared for part `{part_path}`; skipping");
                continue;
            };
            debug!("part `{part_path}` ({content_type}) via {}", rel.rel_type);

            let extra = extras.and_then(|map| map.get(&rel.id));
            if !self.handler.handle_part(&rel.rel_type, &dir_str, &file_name, extra) {
                warn!("unhandled relationship type: {}", rel.rel_type);
                continue;
            }

            if self.walk_chain.iter().any(|p| p == &part_path) {
                warn!("relationship cycle at `{part_path}`; skipping its relationships");
                continue;
            }

            let nested_extras = self.handler.linked_extras();
            self.walk_chain.push(part_path);
            let outcome =
                self.read_linked_parts(archive, &part_dir, &file_name, nested_extras.as_ref());
            self.walk_chain.pop();

            match outcome {
                Ok(()) => {}
                // A malformed part aborts only that part's pass; the walk
                // continues with the remaining relationships.
                Err(Error::FailedToParsePart { path, source }) => {
                    warn!("skipping malformed part `{path}`: {source}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Resolve and dispatch the relationships a part owns at
    /// `_rels/<file_name>.rels` in its own directory, recursing through
    /// the same algorithm.
    fn read_linked_parts<R: ReadSeek>(
        &mut self,
        archive: &mut PackageArchive<R>,
        dir: &[String],
        file_name: &str,
        extras: Option<&RelExtras<H::Extra>>,
    ) -> Result<()> {
        match self.read_relations(archive, dir, file_name)? {
            Some(rels) if !rels.is_empty() => {
                self.process_relationships(archive, rels, dir, extras)
            }
            _ => Ok(()),
        }
    }
}
