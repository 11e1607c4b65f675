//! In-memory view of the OPC container a DOCX file really is.
//!
//! The whole archive is read up front; transforms mutate individual entries
//! and the result is written back as a complete new archive. Entries that no
//! transform touches round-trip with their exact original bytes.

pub mod relationships;

use crate::error::{Error, Result};
use crate::ooxml;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A DOCX container loaded fully into memory, entry order preserved.
#[derive(Debug)]
pub struct Package {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    data: Vec<u8>,
}

impl Package {
    /// Opens a DOCX file. Fails with [`Error::InvalidContainer`] when the
    /// input is not a ZIP archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::read_archive(file)
    }

    /// Reads a DOCX container already held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read_archive(Cursor::new(bytes))
    }

    fn read_archive<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::InvalidContainer(format!("not a ZIP archive: {}", e)))?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::InvalidContainer(e.to_string()))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                data,
            });
        }
        Ok(Self { entries })
    }

    /// The main document markup, required for every operation.
    pub fn document(&self) -> Result<&[u8]> {
        self.entry(ooxml::DOCUMENT_PART)
            .ok_or_else(|| Error::InvalidContainer(format!("missing {}", ooxml::DOCUMENT_PART)))
    }

    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Replaces an entry's bytes, or appends the entry if absent.
    pub fn set_entry(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Removes an entry; returns whether it existed.
    pub fn remove_entry(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    /// Serializes the package back to a ZIP archive. Deflate throughout,
    /// which every host application reopens.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in &self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Writes the archive atomically: a temp file in the target directory,
    /// persisted only once complete. A failed run leaves no output behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let bytes = self.to_bytes()?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_archive() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("word/document.xml", options).expect("start entry");
        zip.write_all(b"<w:document/>").expect("write entry");
        zip.start_file("word/media/image1.png", options).expect("start entry");
        zip.write_all(b"pngbytes").expect("write entry");
        zip.finish().expect("finish archive").into_inner()
    }

    #[test]
    fn test_reads_entries_in_order() {
        let package = Package::from_bytes(&sample_archive()).expect("open package");
        let names: Vec<&str> = package.names().collect();
        assert_eq!(names, vec!["word/document.xml", "word/media/image1.png"]);
        assert_eq!(package.document().expect("document"), b"<w:document/>");
    }

    #[test]
    fn test_rejects_non_zip_input() {
        let err = Package::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, Error::InvalidContainer(_)));
    }

    #[test]
    fn test_roundtrip_preserves_untouched_entries() {
        let package = Package::from_bytes(&sample_archive()).expect("open package");
        let rewritten = Package::from_bytes(&package.to_bytes().expect("serialize"))
            .expect("reopen package");
        assert_eq!(rewritten.entry("word/media/image1.png"), Some(&b"pngbytes"[..]));
    }

    #[test]
    fn test_set_and_remove_entries() {
        let mut package = Package::from_bytes(&sample_archive()).expect("open package");
        package.set_entry("word/document.xml", b"<w:document><w:body/></w:document>".to_vec());
        assert!(package.remove_entry("word/media/image1.png"));
        assert!(!package.remove_entry("word/media/image1.png"));
        assert_eq!(
            package.document().expect("document"),
            b"<w:document><w:body/></w:document>"
        );
    }
}
