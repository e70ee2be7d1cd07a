//! Common types used throughout the book store.

use serde::{Deserialize, Serialize};

/// Pages used when no persisted book exists
pub const DEFAULT_SEED: [&str; 3] = ["Chapter 1", "Chapter 2", "Chapter 3"];

/// Default file name for the persisted book
pub const DEFAULT_BOOK_FILE: &str = "bookshelf.json";

/// Build the default seed as owned pages
pub fn default_seed() -> Vec<String> {
    DEFAULT_SEED.iter().map(|page| page.to_string()).collect()
}

/// An ordered collection of text pages.
///
/// This is the wire shape of the read endpoint and the body of the
/// persisted file: `{"pages": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Pages in display order; index 0 is the first page
    pub pages: Vec<String>,
}

impl Book {
    /// Create a book from its pages
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the book has no pages
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// CRC32 over the pages.
    ///
    /// Each page is length-prefixed (big-endian u32) so that
    /// `["ab", "c"]` and `["a", "bc"]` hash differently.
    pub fn checksum(&self) -> u32 {
        pages_checksum(&self.pages)
    }
}

impl From<Vec<String>> for Book {
    fn from(pages: Vec<String>) -> Self {
        Self::new(pages)
    }
}

/// CRC32 over a sequence of pages, see [`Book::checksum`]
pub fn pages_checksum(pages: &[String]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for page in pages {
        hasher.update(&(page.len() as u32).to_be_bytes());
        hasher.update(page.as_bytes());
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed() {
        let seed = default_seed();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed[0], "Chapter 1");
    }

    #[test]
    fn test_book_json_shape() {
        let book = Book::new(vec!["A".to_string(), "B".to_string()]);
        let json = serde_json::to_string(&book).unwrap();
        assert_eq!(json, r#"{"pages":["A","B"]}"#);

        let parsed: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, book);
    }

    #[test]
    fn test_book_from_pages() {
        let book = Book::from(Vec::new());
        assert!(book.is_empty());
        assert_eq!(book.len(), 0);

        let book = Book::from(default_seed());
        assert!(!book.is_empty());
        assert_eq!(book.pages, default_seed());
    }

    #[test]
    fn test_checksum_is_boundary_sensitive() {
        let a = Book::new(vec!["ab".to_string(), "c".to_string()]);
        let b = Book::new(vec!["a".to_string(), "bc".to_string()]);
        assert_ne!(a.checksum(), b.checksum());

        let empty = Book::default();
        assert_eq!(empty.checksum(), pages_checksum(&[]));
    }
}
