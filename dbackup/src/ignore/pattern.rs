//! Ignore-file pattern classification.
//!
//! The first character of a line decides its kind: `/` marks a directory
//! name, `*` an extension, anything else a literal file name.

use std::collections::HashSet;
use tracing::warn;

/// One classified line of an ignore file. The value never contains the
/// classifying prefix and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IgnorePattern {
    /// `/name`: excludes any path with a directory segment equal to `name`
    Directory(String),
    /// `*.ext`: excludes files whose extension (dot included) equals `.ext`
    Extension(String),
    /// `name`: excludes entries whose final segment equals `name`
    Filename(String),
}

impl IgnorePattern {
    /// Classify a single line. Returns None for blank lines and for lines
    /// holding nothing but a prefix.
    pub fn parse(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }

        let pattern = if let Some(rest) = line.strip_prefix('/') {
            IgnorePattern::Directory(rest.to_string())
        } else if let Some(rest) = line.strip_prefix('*') {
            IgnorePattern::Extension(rest.to_string())
        } else {
            IgnorePattern::Filename(line.to_string())
        };

        if pattern.value().is_empty() {
            None
        } else {
            Some(pattern)
        }
    }

    pub fn value(&self) -> &str {
        match self {
            IgnorePattern::Directory(v) | IgnorePattern::Extension(v) | IgnorePattern::Filename(v) => v,
        }
    }
}

/// All patterns of one ignore file, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    directories: HashSet<String>,
    extensions: HashSet<String>,
    filenames: HashSet<String>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the full text of an ignore file.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            match IgnorePattern::parse(line) {
                Some(pattern) => set.insert(pattern),
                None => warn!("Ignoring pattern {:?} on line {}: nothing after its prefix", line, index + 1),
            }
        }

        set
    }

    pub fn insert(&mut self, pattern: IgnorePattern) {
        match pattern {
            IgnorePattern::Directory(v) => self.directories.insert(v),
            IgnorePattern::Extension(v) => self.extensions.insert(v),
            IgnorePattern::Filename(v) => self.filenames.insert(v),
        };
    }

    pub fn has_directory(&self, name: &str) -> bool {
        self.directories.contains(name)
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }

    pub fn has_filename(&self, name: &str) -> bool {
        self.filenames.contains(name)
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.extensions.len() + self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<IgnorePattern> for PatternSet {
    fn from_iter<T: IntoIterator<Item = IgnorePattern>>(iter: T) -> Self {
        let mut set = Self::new();
        for pattern in iter {
            set.insert(pattern);
        }
        set
    }
}
