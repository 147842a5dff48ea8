//! The conversion pipeline: discovery, hashing, author resolution,
//! conversion, and batch orchestration.

pub mod author;
pub mod convert;
pub mod discovery;
pub mod hash;
pub mod processor;

pub use author::{resolve_author, UNKNOWN_AUTHOR};
pub use convert::{output_filename, Converter};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use hash::{short_fingerprint, Hasher, SHORT_FINGERPRINT_LEN};
pub use processor::Pipeline;
