pub mod file;
pub mod memory;

pub use file::{JsonFileSource, SourceFormat};
pub use memory::MemorySource;

use matchx_core::{ProfileCorpus, Result};

/// Where profile records come from.
///
/// A source is re-read on every refresh, so `load` must return the current
/// contents rather than a cached copy.
pub trait ProfileSource: Send + Sync {
    fn load(&self) -> Result<ProfileCorpus>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
