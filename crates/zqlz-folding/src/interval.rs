//! Interval keys and tracked folding regions.
//!
//! An [`IntervalKey`] is a half-open `[offset, offset + length)` byte range.
//! Keys order by offset first and length second, which is the order the
//! [`RegionRegistry`](crate::RegionRegistry) iterates in.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A comparable `(offset, length)` pair.
///
/// The derived ordering compares `offset` first and breaks ties on `length`,
/// so field order matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IntervalKey {
    pub offset: usize,
    pub length: usize,
}

impl IntervalKey {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Creates a key from a byte range. A reversed range yields an empty key.
    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            offset: range.start,
            length: range.end.saturating_sub(range.start),
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns true if both ranges share at least one byte.
    ///
    /// Touching ranges (`a.end() == b.offset`) do not overlap.
    pub fn overlaps(&self, other: &IntervalKey) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }

    /// Returns true if this range ends at or before `other` starts.
    pub fn precedes(&self, other: &IntervalKey) -> bool {
        self.end() <= other.offset
    }
}

impl fmt::Display for IntervalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}

/// Opaque identity of a folding annotation.
///
/// The reconciler mints ids from a monotonically increasing counter, so two
/// ids compare equal only if they name the same annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionId(u64);

impl RegionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fold#{}", self.0)
    }
}

/// Mints fresh [`RegionId`]s. Ids are never handed out twice.
#[derive(Debug, Clone, Default)]
pub struct RegionIdAllocator {
    last: u64,
}

impl RegionIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self) -> RegionId {
        self.last += 1;
        RegionId(self.last)
    }

    /// Number of ids minted so far.
    pub fn minted(&self) -> u64 {
        self.last
    }
}

/// An interval together with the annotation identity that renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TrackedRegion {
    pub key: IntervalKey,
    pub id: RegionId,
}

impl TrackedRegion {
    pub fn new(key: IntervalKey, id: RegionId) -> Self {
        Self { key, id }
    }

    pub fn offset(&self) -> usize {
        self.key.offset
    }

    pub fn length(&self) -> usize {
        self.key.length
    }

    pub fn end(&self) -> usize {
        self.key.end()
    }

    pub fn range(&self) -> Range<usize> {
        self.key.range()
    }
}
