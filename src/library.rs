//! Audio library stored on disk as `root/<category>/<file>`.
//!
//! Every call reads the filesystem directly; nothing is cached.

mod display;
mod layout;
mod metadata;
mod model;
mod mpeg;
mod transfer;

pub use display::*;
pub use layout::Library;
pub use metadata::read_metadata;
pub use model::*;
pub use transfer::DOWNLOAD_MIME;

#[cfg(test)]
mod tests;
