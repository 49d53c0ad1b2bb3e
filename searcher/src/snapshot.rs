//! Zip snapshot access.
//!
//! A snapshot is a zip archive of repository files keyed by their repo-relative
//! path. Reads go one entry at a time; nothing is cached between calls.

use std::{
    fs::File,
    io::{Read, Seek, Write},
    path::{Path, PathBuf},
};

use zip::{
    CompressionMethod, ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions,
};

use crate::errors::{ArchiveReadError, SearchResult};

/// An open snapshot archive.
pub struct Snapshot {
    archive: ZipArchive<File>,
    path: PathBuf,
}

impl Snapshot {
    pub fn open(path: &Path) -> Result<Self, ArchiveReadError> {
        let open_err = |source| ArchiveReadError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(|e| open_err(ZipError::Io(e)))?;
        let archive = ZipArchive::new(file).map_err(open_err)?;
        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full content of the entry named `name`.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveReadError> {
        let mut entry = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => ArchiveReadError::MissingEntry {
                path: name.to_string(),
            },
            source => ArchiveReadError::Entry {
                path: name.to_string(),
                source,
            },
        })?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|source| ArchiveReadError::Read {
                path: name.to_string(),
                source,
            })?;
        Ok(buf)
    }

    /// Visits every file entry in archive order. Directory entries are skipped.
    /// The visitor returns `false` to stop early.
    pub fn for_each_file<F>(&mut self, mut visit: F) -> SearchResult<()>
    where
        F: FnMut(&str, &[u8]) -> SearchResult<bool>,
    {
        for i in 0..self.archive.len() {
            let (name, buf) = {
                let mut entry = self.archive.by_index(i).map_err(|source| {
                    ArchiveReadError::Entry {
                        path: format!("#{i}"),
                        source,
                    }
                })?;
                if entry.is_dir() {
                    continue;
                }
                let name = entry.name().to_string();
                let mut buf = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut buf)
                    .map_err(|source| ArchiveReadError::Read {
                        path: name.clone(),
                        source,
                    })?;
                (name, buf)
            };
            if !visit(&name, &buf)? {
                break;
            }
        }
        Ok(())
    }
}

/// Writes `files` as a deflated zip into `out`, in the given order.
pub fn write_zip<'a, W, I>(out: W, files: I) -> Result<W, ArchiveReadError>
where
    W: Write + Seek,
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zw = ZipWriter::new(out);
    for (name, content) in files {
        zw.start_file(name, opts).map_err(ArchiveReadError::Write)?;
        zw.write_all(content)
            .map_err(|e| ArchiveReadError::Write(ZipError::Io(e)))?;
    }
    zw.finish().map_err(ArchiveReadError::Write)
}
