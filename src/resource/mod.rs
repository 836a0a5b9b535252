//! Clip resolution: sources, cache, warm-up and the clip library

pub mod cache;
pub mod library;
pub mod manifest;
pub mod resolver;
pub mod source;

pub use cache::ClipCache;
pub use library::{Availability, ClipDescriptor, ClipLibrary};
pub use resolver::ResolverConfig;
pub use source::{ClipData, ClipSource, DirectoryClipSource, MemoryClipSource, SourceError};
