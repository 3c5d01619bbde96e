pub mod archive;
pub mod context;
pub mod reader;
pub mod schemas;
