mod archive;

pub use archive::{Archive, ArchiveError};
