//! Core page store: the ordered book and its lock discipline.

mod page_store;

pub use page_store::PageStore;
