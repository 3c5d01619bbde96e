use fixtures::*;

use std::io::Cursor;

use opcx::{Error, OpcReader, PackageArchive, PartHandler, RelExtras, schemas};
use pretty_assertions::assert_eq;

/// Records every dispatched part; relationship types listed in
/// `reject_types` are reported as unhandled.
#[derive(Default)]
struct Collector {
    parts: Vec<(String, String, String, Option<String>)>,
    reject_types: Vec<String>,
    staged_extras: Option<RelExtras<String>>,
}

impl PartHandler for Collector {
    type Extra = String;

    fn handle_part(
        &mut self,
        rel_type: &str,
        dir: &str,
        name: &str,
        extra: Option<&String>,
    ) -> bool {
        self.parts.push((
            rel_type.to_owned(),
            dir.to_owned(),
            name.to_owned(),
            extra.cloned(),
        ));
        !self.reject_types.iter().any(|t| t == rel_type)
    }

    fn linked_extras(&mut self) -> Option<RelExtras<String>> {
        self.staged_extras.take()
    }
}

fn walk(entries: &[(&str, &str)], handler: &mut Collector) -> opcx::Result<()> {
    ensure_env_logger_initialized();
    let mut archive = PackageArchive::from_read_seek(build_package(entries)).unwrap();
    OpcReader::new(handler).read_archive(&mut archive)
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

#[test]
fn single_relationship_dispatches_exactly_one_part() {
    let mut handler = Collector::default();
    walk(
        &[
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", "<?xml version=\"1.0\"?><workbook/>"),
        ],
        &mut handler,
    )
    .unwrap();

    assert_eq!(
        handler.parts,
        vec![(
            schemas::SCH_OD_RELS_OFFICE_DOC.to_owned(),
            "xl/".to_owned(),
            "workbook.xml".to_owned(),
            None,
        )]
    );
}

#[test]
fn nested_relationships_recurse_depth_first_with_parent_dir_targets() {
    let workbook_rels = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="../docProps/core.xml"/>
</Relationships>"#;

    let mut handler = Collector::default();
    walk(
        &[
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", "<?xml version=\"1.0\"?><workbook/>"),
            ("xl/_rels/workbook.xml.rels", workbook_rels),
            ("xl/worksheets/sheet1.xml", "<?xml version=\"1.0\"?><worksheet/>"),
            ("docProps/core.xml", "<?xml version=\"1.0\"?><coreProperties/>"),
        ],
        &mut handler,
    )
    .unwrap();

    let dirs_and_names: Vec<(&str, &str)> = handler
        .parts
        .iter()
        .map(|(_, dir, name, _)| (dir.as_str(), name.as_str()))
        .collect();
    assert_eq!(
        dirs_and_names,
        vec![
            ("xl/", "workbook.xml"),
            ("xl/worksheets/", "sheet1.xml"),
            ("docProps/", "core.xml"),
        ]
    );
}

#[test]
fn relationship_cycles_terminate() {
    let rels_to = |target: &str| {
        format!(
            r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="{target}"/>
</Relationships>"#
        )
    };

    let a_rels = rels_to("b.xml");
    let b_rels = rels_to("a.xml");
    let root = rels_to("a.xml");

    let mut handler = Collector::default();
    walk(
        &[
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", &root),
            ("a.xml", "<?xml version=\"1.0\"?><a/>"),
            ("b.xml", "<?xml version=\"1.0\"?><b/>"),
            ("_rels/a.xml.rels", &a_rels),
            ("_rels/b.xml.rels", &b_rels),
        ],
        &mut handler,
    )
    .unwrap();

    // a (from root), b (from a), a again (from b) -- then the chain guard
    // stops the descent instead of looping.
    let names: Vec<&str> = handler.parts.iter().map(|(_, _, n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a.xml", "b.xml", "a.xml"]);
}

#[test]
fn malformed_nested_part_is_skipped_and_walk_continues() {
    let root = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="xl/styles.xml"/>
</Relationships>"#;

    // Unquoted attribute value: a grammar violation.
    let bad_rels = r#"<?xml version="1.0"?><Relationships a=1></Relationships>"#;

    let mut handler = Collector::default();
    walk(
        &[
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", root),
            ("xl/workbook.xml", "<?xml version=\"1.0\"?><workbook/>"),
            ("xl/_rels/workbook.xml.rels", bad_rels),
            ("xl/styles.xml", "<?xml version=\"1.0\"?><styleSheet/>"),
        ],
        &mut handler,
    )
    .unwrap();

    let names: Vec<&str> = handler.parts.iter().map(|(_, _, n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["workbook.xml", "styles.xml"]);
}

#[test]
fn missing_content_types_manifest_is_a_typed_error() {
    let mut handler = Collector::default();
    let err = walk(&[("_rels/.rels", ROOT_RELS)], &mut handler).unwrap_err();
    assert!(matches!(err, Error::EntryNotFound { path } if path == "[Content_Types].xml"));
    assert!(handler.parts.is_empty());
}

#[test]
fn missing_root_relationships_is_a_typed_error() {
    let mut handler = Collector::default();
    let err = walk(
        &[("[Content_Types].xml", CONTENT_TYPES_XML)],
        &mut handler,
    )
    .unwrap_err();
    assert!(matches!(err, Error::EntryNotFound { path } if path == "_rels/.rels"));
}

#[test]
fn malformed_root_manifest_aborts_the_read() {
    let mut handler = Collector::default();
    let err = walk(
        &[
            ("[Content_Types].xml", "<Types/>"),
            ("_rels/.rels", ROOT_RELS),
        ],
        &mut handler,
    )
    .unwrap_err();
    assert!(
        matches!(err, Error::FailedToParsePart { path, .. } if path == "[Content_Types].xml")
    );
}

#[test]
fn part_without_content_type_is_skipped() {
    let root = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="media/image1.png"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    let mut handler = Collector::default();
    walk(
        &[
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", root),
            ("media/image1.png", "not really a png"),
            ("xl/workbook.xml", "<?xml version=\"1.0\"?><workbook/>"),
        ],
        &mut handler,
    )
    .unwrap();

    let names: Vec<&str> = handler.parts.iter().map(|(_, _, n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["workbook.xml"]);
}

#[test]
fn unhandled_relationship_type_is_not_descended_into() {
    let thumb_rels = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="hidden.xml"/>
</Relationships>"#;

    let root = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://example.com/unknown-part" Target="thumb.xml"/>
</Relationships>"#;

    let mut handler = Collector {
        reject_types: vec!["http://example.com/unknown-part".to_owned()],
        ..Collector::default()
    };
    walk(
        &[
            ("[Content_Types].xml", CONTENT_TYPES_XML),
            ("_rels/.rels", root),
            ("thumb.xml", "<?xml version=\"1.0\"?><thumb/>"),
            ("_rels/thumb.xml.rels", thumb_rels),
            ("hidden.xml", "<?xml version=\"1.0\"?><hidden/>"),
        ],
        &mut handler,
    )
    .unwrap();

    // thumb.xml is offered once and declined; its own relationships are
    // never resolved.
    let names: Vec<&str> = handler.parts.iter().map(|(_, _, n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["thumb.xml"]);
}

#[test]
fn extras_are_keyed_by_relationship_id_and_passed_through() {
    let workbook_rels = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    struct SheetNames {
        inner: Collector,
    }

    impl PartHandler for SheetNames {
        type Extra = String;

        fn handle_part(
            &mut self,
            rel_type: &str,
            dir: &str,
            name: &str,
            extra: Option<&String>,
        ) -> bool {
            if name == "workbook.xml" {
                // Pretend the workbook body named the sheet behind rId7.
                let mut extras = RelExtras::new();
                extras.insert("rId7".to_owned(), "Sheet One".to_owned());
                self.inner.staged_extras = Some(extras);
            }
            self.inner.handle_part(rel_type, dir, name, extra)
        }

        fn linked_extras(&mut self) -> Option<RelExtras<String>> {
            self.inner.linked_extras()
        }
    }

    ensure_env_logger_initialized();
    let package = build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", "<?xml version=\"1.0\"?><workbook/>"),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", "<?xml version=\"1.0\"?><worksheet/>"),
    ]);
    let mut archive = PackageArchive::from_read_seek(package).unwrap();
    let mut handler = SheetNames {
        inner: Collector::default(),
    };
    OpcReader::new(&mut handler).read_archive(&mut archive).unwrap();

    assert_eq!(
        handler.inner.parts,
        vec![
            (
                schemas::SCH_OD_RELS_OFFICE_DOC.to_owned(),
                "xl/".to_owned(),
                "workbook.xml".to_owned(),
                None,
            ),
            (
                schemas::SCH_OD_RELS_WORKSHEET.to_owned(),
                "xl/worksheets/".to_owned(),
                "sheet1.xml".to_owned(),
                Some("Sheet One".to_owned()),
            ),
        ]
    );
}

#[test]
fn garbage_input_is_not_a_package() {
    ensure_env_logger_initialized();
    let err = PackageArchive::from_read_seek(Cursor::new(b"not a zip".to_vec())).unwrap_err();
    assert!(matches!(err, Error::InvalidArchive { .. }));
}
