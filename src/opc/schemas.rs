//! Well-known OPC and OfficeOpenXML schema URIs.
//!
//! Process-wide read-only constants; relationship types in `.rels` files
//! and the two manifest namespaces are compared against these.

pub const SCH_OPC_CONTENT_TYPES: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";
pub const SCH_OPC_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const SCH_OPC_RELS_METADATA_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const SCH_OD_RELS_CONNECTIONS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/connections";
pub const SCH_OD_RELS_PRINTER_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/printerSettings";
pub const SCH_OD_RELS_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
pub const SCH_OD_RELS_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const SCH_OD_RELS_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const SCH_OD_RELS_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub const SCH_OD_RELS_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const SCH_OD_RELS_OFFICE_DOC: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const SCH_XLSX_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

pub const SCH_ALL: &[&str] = &[
    SCH_OPC_CONTENT_TYPES,
    SCH_OPC_RELS,
    SCH_OPC_RELS_METADATA_CORE_PROPS,
    SCH_OD_RELS_CONNECTIONS,
    SCH_OD_RELS_PRINTER_SETTINGS,
    SCH_OD_RELS_SHARED_STRINGS,
    SCH_OD_RELS_STYLES,
    SCH_OD_RELS_THEME,
    SCH_OD_RELS_WORKSHEET,
    SCH_OD_RELS_EXTENDED_PROPS,
    SCH_OD_RELS_OFFICE_DOC,
    SCH_XLSX_MAIN,
];
