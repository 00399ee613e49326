//! `.dbackupignore` handling: parsing, matching and initialization.

pub mod file;
pub mod matcher;
pub mod pattern;

pub use file::{init_ignore_file, load_patterns};
pub use matcher::Matcher;
pub use pattern::{IgnorePattern, PatternSet};
