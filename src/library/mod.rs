//! Course library: scanning folders into courses and keeping them on disk.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.coursetrack/
//! ├── catalog.json      # course id -> course tree (sections, items, watched flags)
//! ├── progress.json     # course id -> canonical path -> {position, duration}
//! └── icons/            # svg/png assets addressed by logical name
//! ```

pub mod catalog;
pub mod natural_order;
pub mod paths;
pub mod scanner;

pub use catalog::{CatalogError, CatalogSnapshot, CourseCatalog, ImportResult};
pub use paths::CanonicalPath;
pub use scanner::{scan_root, ScanOptions, DEFAULT_ICON};
