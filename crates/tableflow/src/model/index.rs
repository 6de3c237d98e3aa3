//! Row identifiers.

use std::fmt;

/// Identifies one row: a section index plus a row index within that section.
///
/// Index paths are plain coordinates. They are only meaningful against the
/// state of the model they were computed for; after a commit, previously
/// obtained paths may point elsewhere.
///
/// Paths order by section first, then by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// The section index.
    pub section: usize,
    /// The row index within the section.
    pub row: usize,
}

impl IndexPath {
    /// Creates a new index path.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }

    /// Returns the same row position in another section.
    #[inline]
    pub const fn in_section(self, section: usize) -> Self {
        Self {
            section,
            row: self.row,
        }
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, row): (usize, usize)) -> Self {
        Self::new(section, row)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}
