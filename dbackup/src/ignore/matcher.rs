//! Exclusion decisions for traversal entries.

use super::pattern::PatternSet;
use crate::fs::EntryKind;
use std::borrow::Cow;
use std::path::{Component, Path};

/// Extension of a base name, dot included. Names without a dot, or whose
/// only dot is the leading one (`.profile`), have none.
pub fn extension(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

fn segments(path: &Path) -> Vec<Cow<'_, str>> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect()
}

/// Applies one [`PatternSet`] to paths relative to a source root.
#[derive(Debug, Clone)]
pub struct Matcher {
    patterns: PatternSet,
}

impl Matcher {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// True when any directory, extension or filename pattern matches.
    pub fn is_excluded(&self, relative: &Path, kind: EntryKind) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let segments = segments(relative);
        let Some(name) = segments.last() else {
            return false;
        };

        self.directory_match(&segments, kind)
            || self.extension_match(name)
            || self.patterns.has_filename(name)
    }

    fn directory_match(&self, segments: &[Cow<'_, str>], kind: EntryKind) -> bool {
        let dirs = match kind {
            EntryKind::File => &segments[..segments.len().saturating_sub(1)],
            EntryKind::Directory => segments,
        };
        dirs.iter().any(|s| self.patterns.has_directory(s))
    }

    fn extension_match(&self, name: &str) -> bool {
        extension(name).is_some_and(|ext| self.patterns.has_extension(ext))
    }
}
