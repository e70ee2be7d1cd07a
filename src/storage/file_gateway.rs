//! File-backed persistence gateway.
//!
//! The book is stored as a JSON document:
//!
//! ```text
//! {"pages": ["...", "..."], "checksum": 1234567890}
//! ```
//!
//! `checksum` is the CRC32 from [`Book::checksum`]. It is written on every
//! save and verified on load when present; documents without it are
//! accepted as-is.

use crate::error::{BookError, Result};
use crate::storage::PersistenceGateway;
use crate::types::Book;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk form of the book
#[derive(Debug, Serialize, Deserialize)]
struct StoredBook {
    #[serde(flatten)]
    book: Book,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checksum: Option<u32>,
}

/// Gateway storing the book in a single JSON file
pub struct FileGateway {
    /// Path to the book file
    path: PathBuf,
    /// Whether to fsync before the file replaces the previous version
    sync_on_write: bool,
}

impl FileGateway {
    /// Create a gateway for the given file; nothing is touched until load/save
    pub fn new<P: Into<PathBuf>>(path: P, sync_on_write: bool) -> Self {
        Self {
            path: path.into(),
            sync_on_write,
        }
    }

    /// Path to the book file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the next save is staged in
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceGateway for FileGateway {
    fn load(&self) -> Result<Option<Vec<String>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted book");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredBook = serde_json::from_reader(BufReader::new(file))?;

        if let Some(expected) = stored.checksum {
            let actual = stored.book.checksum();
            if expected != actual {
                return Err(BookError::corruption(format!(
                    "{}: checksum mismatch (stored {:#010x}, computed {:#010x})",
                    self.path.display(),
                    expected,
                    actual
                )));
            }
        }

        info!(
            path = %self.path.display(),
            pages = stored.book.len(),
            "loaded book"
        );
        Ok(Some(stored.book.pages))
    }

    fn save(&self, pages: &[String]) -> Result<()> {
        let book = Book::new(pages.to_vec());
        let stored = StoredBook {
            checksum: Some(book.checksum()),
            book,
        };

        // Stage next to the target so the rename stays on one file system
        let staging = self.staging_path();
        {
            let mut writer = BufWriter::new(File::create(&staging)?);
            serde_json::to_writer(&mut writer, &stored)?;
            writer.write_all(b"\n")?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            if self.sync_on_write {
                file.sync_all()?;
            }
        }
        fs::rename(&staging, &self.path)?;

        info!(path = %self.path.display(), pages = pages.len(), "saved book");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pages(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_file_loads_nothing() -> Result<()> {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("book.json"), false);

        assert_eq!(gateway.load()?, None);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");

        {
            let gateway = FileGateway::new(&path, true);
            gateway.save(&pages(&["A", "X", "B", "C"]))?;
        }

        // A fresh gateway on the same file sees the same sequence
        let gateway = FileGateway::new(&path, false);
        assert_eq!(gateway.path(), path.as_path());
        assert_eq!(gateway.load()?, Some(pages(&["A", "X", "B", "C"])));
        assert!(!gateway.staging_path().exists());

        Ok(())
    }

    #[test]
    fn test_save_overwrites() -> Result<()> {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("book.json"), false);

        gateway.save(&pages(&["A", "B"]))?;
        gateway.save(&pages(&["C"]))?;
        assert_eq!(gateway.load()?, Some(pages(&["C"])));

        gateway.save(&[])?;
        assert_eq!(gateway.load()?, Some(Vec::new()));

        Ok(())
    }

    #[test]
    fn test_loads_document_without_checksum() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");
        fs::write(&path, r#"{"pages":["one","two"]}"#)?;

        let gateway = FileGateway::new(&path, false);
        assert_eq!(gateway.load()?, Some(pages(&["one", "two"])));

        Ok(())
    }

    #[test]
    fn test_checksum_mismatch_is_corruption() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");

        let gateway = FileGateway::new(&path, false);
        gateway.save(&pages(&["first draft"]))?;

        // Tamper with the page text but keep the stored checksum
        let contents = fs::read_to_string(&path)?;
        fs::write(&path, contents.replace("first draft", "tampered"))?;

        assert!(matches!(gateway.load(), Err(BookError::Corruption(_))));
        Ok(())
    }

    #[test]
    fn test_malformed_file_fails() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");
        fs::write(&path, "not json at all")?;

        let gateway = FileGateway::new(&path, false);
        assert!(matches!(gateway.load(), Err(BookError::Serialization(_))));

        Ok(())
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("nope").join("book.json"), false);

        assert!(matches!(gateway.save(&pages(&["A"])), Err(BookError::Io(_))));
    }
}
