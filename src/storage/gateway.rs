//! Persistence gateway abstraction.
//!
//! The gateway is consulted twice per process: once at startup to load the
//! book and once at shutdown to save it.

use crate::error::Result;
use parking_lot::Mutex;

/// Trait for loading and saving the book
///
/// This abstraction allows swapping the storage backend or mocking for tests.
pub trait PersistenceGateway: Send + Sync {
    /// Load the persisted pages, or `None` if nothing has been persisted yet
    fn load(&self) -> Result<Option<Vec<String>>>;

    /// Persist the given pages, replacing any previous state
    fn save(&self, pages: &[String]) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Gateway that keeps the last saved snapshot in memory.
///
/// Used when persistence is disabled: nothing survives the process.
#[derive(Default)]
pub struct MemoryGateway {
    snapshot: Mutex<Option<Vec<String>>>,
}

impl MemoryGateway {
    /// Create an empty gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway that already holds a snapshot
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self {
            snapshot: Mutex::new(Some(pages)),
        }
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Option<Vec<String>>> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, pages: &[String]) -> Result<()> {
        *self.snapshot.lock() = Some(pages.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
