//! Filesystem module.
//!
//! Provides:
//! - Album directory layout
//! - Filename and path component sanitization

pub mod naming;
pub mod paths;

pub use naming::{check_attachment_filename, sanitize_path_component};
pub use paths::{album_dir, ensure_dir, AlbumLocation};
