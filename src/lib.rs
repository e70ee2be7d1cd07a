//! # Bookshelf
//!
//! A single ordered book of text pages, shared by concurrent request
//! handlers and optionally persisted to a JSON file.
//!
//! ## Architecture
//!
//! - **Store** (`store`): the page sequence behind one reader/writer lock
//! - **Storage** (`storage`): persistence gateway used at startup and shutdown
//! - **Server** (`server`, feature `server`): HTTP adapter over the store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookshelf::{Bookshelf, Config};
//!
//! let shelf = Bookshelf::open(Config::new("bookshelf.json"))?;
//! let store = shelf.store();
//!
//! // Insert at a position, or append with `None`
//! store.insert(Some(0), "Preface")?;
//!
//! // Replace and remove by index
//! store.update_at(1, "Chapter One")?;
//! store.delete_at(2)?;
//!
//! for page in store.read_all()? {
//!     println!("{}", page);
//! }
//!
//! // Saves the book back to disk
//! shelf.close()?;
//! ```

pub mod error;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{BookError, Result};
pub use storage::{FileGateway, MemoryGateway, PersistenceGateway};
pub use store::PageStore;
pub use types::{default_seed, Book, DEFAULT_BOOK_FILE, DEFAULT_SEED};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Bookshelf configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the book file, if any
    pub path: Option<PathBuf>,
    /// Whether the book is loaded from and saved to `path` (default: true)
    pub persist: bool,
    /// Whether to fsync the book file on save (default: false)
    pub sync_on_write: bool,
    /// Upper bound on lock acquisition (default: wait indefinitely)
    pub lock_timeout: Option<Duration>,
    /// Pages used when nothing has been persisted yet
    pub seed: Vec<String>,
}

impl Config {
    /// Create a file-backed configuration with default settings
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
            persist: true,
            sync_on_write: false,
            lock_timeout: None,
            seed: default_seed(),
        }
    }

    /// Create a configuration that never touches the file system
    pub fn in_memory() -> Self {
        Self {
            path: None,
            persist: false,
            ..Self::new(DEFAULT_BOOK_FILE)
        }
    }

    /// Enable or disable persistence
    pub fn persist(mut self, enabled: bool) -> Self {
        self.persist = enabled;
        self
    }

    /// Enable sync on write for durability
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Bound lock acquisition time
    pub fn lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Set the pages used when nothing has been persisted yet
    pub fn seed<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed = pages.into_iter().map(Into::into).collect();
        self
    }

    fn gateway(&self) -> Box<dyn PersistenceGateway> {
        match (&self.path, self.persist) {
            (Some(path), true) => Box::new(FileGateway::new(path, self.sync_on_write)),
            _ => Box::new(MemoryGateway::new()),
        }
    }
}

/// Main handle owning the one book of the process
///
/// The store is created once here and handed out by reference to every
/// consumer; the gateway is consulted only on open and on persist/close.
pub struct Bookshelf {
    store: Arc<PageStore>,
    gateway: Box<dyn PersistenceGateway>,
}

impl Bookshelf {
    /// Open the book described by `config`
    ///
    /// Falls back to the configured seed when no persisted book exists.
    /// Any other load failure is returned.
    pub fn open(config: Config) -> Result<Self> {
        let gateway = config.gateway();
        Self::with_gateway(gateway, config.seed, config.lock_timeout)
    }

    /// Open with an explicit gateway
    pub fn with_gateway(
        gateway: Box<dyn PersistenceGateway>,
        seed: Vec<String>,
        lock_timeout: Option<Duration>,
    ) -> Result<Self> {
        let pages = match gateway.load()? {
            Some(pages) => pages,
            None => {
                info!(
                    gateway = %gateway.describe(),
                    pages = seed.len(),
                    "no persisted book, starting from seed"
                );
                seed
            }
        };

        let store = Arc::new(PageStore::new(pages).with_lock_timeout(lock_timeout));
        Ok(Self { store, gateway })
    }

    /// Shared handle to the page store
    pub fn store(&self) -> Arc<PageStore> {
        Arc::clone(&self.store)
    }

    /// Snapshot the book and hand it to the gateway
    pub fn persist(&self) -> Result<()> {
        let pages = self.store.read_all()?;
        self.gateway.save(&pages)
    }

    /// Persist one last time and release the book
    pub fn close(self) -> Result<()> {
        info!(gateway = %self.gateway.describe(), "closing book");
        self.persist()
    }

    /// Where the book is persisted
    pub fn describe(&self) -> String {
        self.gateway.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_seeds_fresh_book() -> Result<()> {
        let dir = tempdir().unwrap();
        let shelf = Bookshelf::open(Config::new(dir.path().join("book.json")))?;

        assert_eq!(shelf.store().read_all()?, default_seed());
        Ok(())
    }

    #[test]
    fn test_close_then_reopen() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");

        {
            let shelf = Bookshelf::open(Config::new(&path).seed(["A", "B", "C"]))?;
            let store = shelf.store();
            assert_eq!(store.insert(Some(1), "X")?, 1);
            store.delete_at(0)?;
            shelf.close()?;
        }

        let shelf = Bookshelf::open(Config::new(&path))?;
        assert_eq!(shelf.store().read_all()?, vec!["X", "B", "C"]);

        Ok(())
    }

    #[test]
    fn test_untouched_roundtrip() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");

        let first = Bookshelf::open(Config::new(&path).sync_on_write(true))?;
        let before = first.store().read_all()?;
        first.close()?;

        let second = Bookshelf::open(Config::new(&path))?;
        assert_eq!(second.store().read_all()?, before);

        Ok(())
    }

    #[test]
    fn test_reset_to_seed_is_stored() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");

        {
            let shelf = Bookshelf::open(Config::new(&path).seed(["A", "B", "C", "D"]))?;
            let discarded = shelf.store().replace(default_seed())?;
            assert_eq!(discarded.len(), 4);
            shelf.close()?;
        }

        let shelf = Bookshelf::open(Config::new(&path).seed(["unused"]))?;
        assert_eq!(shelf.store().read_all()?, default_seed());

        Ok(())
    }

    #[test]
    fn test_persistence_disabled_leaves_disk_alone() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");

        let shelf = Bookshelf::open(Config::new(&path).persist(false))?;
        shelf.store().insert(None, "scratch")?;
        shelf.close()?;

        assert!(!path.exists());

        let shelf = Bookshelf::open(Config::in_memory().seed(Vec::<String>::new()))?;
        assert!(shelf.store().is_empty()?);
        assert_eq!(shelf.describe(), "in-memory");

        Ok(())
    }

    #[test]
    fn test_corrupt_book_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(&path, "{\"pages\": [1, 2").unwrap();

        assert!(Bookshelf::open(Config::new(&path)).is_err());
    }

    #[test]
    fn test_store_is_shared() -> Result<()> {
        let shelf = Bookshelf::with_gateway(
            Box::new(MemoryGateway::with_pages(vec!["A".to_string()])),
            default_seed(),
            Some(Duration::from_millis(50)),
        )?;

        let a = shelf.store();
        let b = shelf.store();
        a.insert(None, "B")?;
        assert_eq!(b.read_all()?, vec!["A", "B"]);
        assert_eq!(a.lock_timeout(), Some(Duration::from_millis(50)));

        Ok(())
    }
}
