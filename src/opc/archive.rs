use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

use log::{debug, trace};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::err::{Error, Result};

pub trait ReadSeek: Read + Seek {
    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }
}

impl<T: Read + Seek> ReadSeek for T {}

/// One archive entry read fully into an owned buffer.
///
/// The declared (stat) size and the byte count actually read can
/// legitimately differ; downstream parsing must size itself on
/// [`EntryBuf::actual_len`], which is what [`EntryBuf::data`] exposes.
#[derive(Debug)]
pub struct EntryBuf {
    data: Vec<u8>,
    declared_size: u64,
}

impl EntryBuf {
    /// Bytes actually read out of the archive.
    pub fn actual_len(&self) -> usize {
        self.data.len()
    }

    /// Uncompressed size the entry declared before reading.
    pub fn declared_size(&self) -> u64 {
        self.declared_size
    }

    /// The actually-read bytes, `actual_len` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Lazy, on-demand access to named entries inside a zip container.
///
/// The underlying source closes exactly once, when the `PackageArchive`
/// drops; per-entry read handles are scoped to a single
/// [`PackageArchive::read_entry`] call and released on every exit path.
#[derive(Debug)]
pub struct PackageArchive<R: ReadSeek> {
    zip: ZipArchive<R>,
}

impl PackageArchive<File> {
    /// Open a package on disk. On failure nothing is left half-open and a
    /// typed error distinguishes a missing file from a corrupt container.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::FailedToOpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_read_seek(file)
    }
}

impl<R: ReadSeek> PackageArchive<R> {
    pub fn from_read_seek(source: R) -> Result<Self> {
        let zip = ZipArchive::new(source).map_err(|source| Error::InvalidArchive { source })?;
        Ok(PackageArchive { zip })
    }

    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.zip.index_for_name(path).is_some()
    }

    /// Entry names in archive order, for diagnostics.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    /// Stat a named entry, read it fully into an owned buffer, and report
    /// the actual byte count alongside the declared size.
    pub fn read_entry(&mut self, path: &str) -> Result<EntryBuf> {
        let mut entry = match self.zip.by_name(path) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(Error::EntryNotFound {
                    path: path.to_owned(),
                });
            }
            Err(source) => return Err(Error::InvalidArchive { source }),
        };

        let declared_size = entry.size();
        trace!("entry `{path}`: declared size {declared_size}");

        let mut data = Vec::with_capacity(usize::try_from(declared_size).unwrap_or(0));
        entry
            .read_to_end(&mut data)
            .map_err(|source| Error::FailedToReadEntry {
                path: path.to_owned(),
                source,
            })?;

        debug!(
            "read entry `{path}`: {} bytes (declared {declared_size})",
            data.len()
        );
        Ok(EntryBuf {
            data,
            declared_size,
        })
    }
}
