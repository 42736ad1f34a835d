//! File system storage management
//!
//! Path sandboxing and the file operations built on top of it.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::FileOps;
pub use results::{Download, Entry, EntryKind, UploadOutcome};
pub use validation::{PathResolver, ResolvedPath};
