//! Lock-guarded ordered page sequence.
//!
//! Every operation takes the single reader/writer lock for the whole span
//! of validation and mutation, so concurrent callers observe the book as
//! if operations ran one at a time in lock acquisition order.

use crate::error::{BookError, Result};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// The ordered page collection shared by all request handlers
pub struct PageStore {
    /// Pages in display order
    pages: RwLock<Vec<String>>,
    /// Upper bound on lock acquisition; `None` waits indefinitely
    lock_timeout: Option<Duration>,
}

impl PageStore {
    /// Create a store holding the given pages
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages: RwLock::new(pages),
            lock_timeout: None,
        }
    }

    /// Bound lock acquisition; operations that wait longer fail with `Busy`
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Configured lock acquisition bound
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, Vec<String>>> {
        match self.lock_timeout {
            Some(timeout) => self.pages.try_read_for(timeout).ok_or_else(|| {
                warn!(?timeout, "timed out waiting for shared lock");
                BookError::Busy
            }),
            None => Ok(self.pages.read()),
        }
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Vec<String>>> {
        match self.lock_timeout {
            Some(timeout) => self.pages.try_write_for(timeout).ok_or_else(|| {
                warn!(?timeout, "timed out waiting for exclusive lock");
                BookError::Busy
            }),
            None => Ok(self.pages.write()),
        }
    }

    /// Insert a page, shifting later pages back by one.
    ///
    /// `position` defaults to the current length (append). Valid positions
    /// are `0..=len`; anything else fails with `OutOfRange` and leaves the
    /// book untouched. Returns the position the page now occupies.
    pub fn insert(&self, position: Option<i64>, text: impl Into<String>) -> Result<usize> {
        let mut pages = self.write_guard()?;
        let len = pages.len();

        let position = match position {
            None => len,
            Some(requested) => usize::try_from(requested)
                .ok()
                .filter(|&p| p <= len)
                .ok_or(BookError::OutOfRange {
                    position: requested,
                    len,
                })?,
        };

        pages.insert(position, text.into());
        debug!(position, len = pages.len(), "page inserted");
        Ok(position)
    }

    /// Point-in-time copy of every page
    pub fn read_all(&self) -> Result<Vec<String>> {
        let pages = self.read_guard()?;
        Ok(pages.clone())
    }

    /// Replace the text of an existing page; nothing shifts
    pub fn update_at(&self, index: usize, text: impl Into<String>) -> Result<()> {
        let mut pages = self.write_guard()?;
        let len = pages.len();

        let slot = pages
            .get_mut(index)
            .ok_or(BookError::NotFound { index, len })?;
        *slot = text.into();

        debug!(index, "page updated");
        Ok(())
    }

    /// Remove an existing page, shifting later pages forward by one.
    ///
    /// Returns the removed text.
    pub fn delete_at(&self, index: usize) -> Result<String> {
        let mut pages = self.write_guard()?;
        let len = pages.len();

        if index >= len {
            return Err(BookError::NotFound { index, len });
        }

        let removed = pages.remove(index);
        debug!(index, len = pages.len(), "page deleted");
        Ok(removed)
    }

    /// Swap in a whole new sequence, returning the previous one
    pub fn replace(&self, new_pages: Vec<String>) -> Result<Vec<String>> {
        let mut pages = self.write_guard()?;
        Ok(std::mem::replace(&mut *pages, new_pages))
    }

    /// Number of pages
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_guard()?.len())
    }

    /// Whether the book has no pages
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_guard()?.is_empty())
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
