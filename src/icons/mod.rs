//! Course icons.

pub mod resolver;

pub use resolver::{fallback, AssetFormat, IconEntry, IconError, IconResolver, FALLBACK_COLOR, MAX_ICON_SIZE};
