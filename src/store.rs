//! Document store for releases and settings.

/// JSON-file backed document store.
pub mod file;

/// Storage abstraction used by the release service.
pub mod traits;

pub use file::FileStore;
pub use traits::ReleaseStore;
