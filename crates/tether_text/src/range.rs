//! Byte-offset ranges, text edits, and the rule that moves a range across an edit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open byte range `start..end` within a text.
///
/// Ranges are always "proper": [`TextRange::new`] swaps its arguments when
/// given `start > end`, so `start <= end` holds for every value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TextRange {
    start: u32,
    end: u32,
}

impl TextRange {
    /// Creates a range, normalizing the bounds so that `start <= end`.
    pub fn new(start: u32, end: u32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates an empty range at `offset`.
    pub fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Creates a range starting at `start` spanning `len` bytes.
    pub fn at(start: u32, len: u32) -> Self {
        Self::new(start, start + len)
    }

    /// Inclusive start offset.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `other` lies entirely within this range.
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if `offset` lies in `start..=end`.
    pub fn contains_offset(&self, offset: u32) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Returns `true` if the two ranges share at least one byte.
    pub fn intersects(&self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Moves the range by `delta` bytes, saturating at zero.
    pub fn translate(self, delta: i64) -> Self {
        let move_by = |x: u32| (i64::from(x) + delta).max(0) as u32;
        Self::new(move_by(self.start), move_by(self.end))
    }

    /// Expresses this range relative to the start of `outer`.
    ///
    /// Returns `None` unless `outer` contains this range.
    pub fn relative_to(self, outer: TextRange) -> Option<Self> {
        outer
            .contains_range(self)
            .then(|| Self::new(self.start - outer.start, self.end - outer.start))
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A single replacement of `old_len` bytes at `offset` by `new_text`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TextEdit {
    /// Offset where the replaced text starts.
    pub offset: u32,
    /// Number of bytes removed.
    pub old_len: u32,
    /// Text inserted in their place.
    pub new_text: String,
}

impl TextEdit {
    /// Inserts `text` at `offset`.
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self {
            offset,
            old_len: 0,
            new_text: text.into(),
        }
    }

    /// Deletes the bytes in `range`.
    pub fn delete(range: TextRange) -> Self {
        Self {
            offset: range.start(),
            old_len: range.len(),
            new_text: String::new(),
        }
    }

    /// Replaces the bytes in `range` by `text`.
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            offset: range.start(),
            old_len: range.len(),
            new_text: text.into(),
        }
    }

    /// The range of the text before the edit that this edit removes.
    pub fn old_range(&self) -> TextRange {
        TextRange::at(self.offset, self.old_len)
    }

    /// Length of the inserted text.
    pub fn new_len(&self) -> u32 {
        self.new_text.len() as u32
    }

    /// Signed change in text length.
    pub fn delta(&self) -> i64 {
        i64::from(self.new_len()) - i64::from(self.old_len)
    }
}

/// Maps `range` across `edit`, following range-marker semantics.
///
/// - an edit that removes text covering the whole range deletes it (`None`);
/// - an edit ending at or before `start` shifts the range (so an insertion at
///   `start` pushes the range right);
/// - an edit starting at or after `end` leaves it alone;
/// - an edit inside the range grows or shrinks its end;
/// - an edit overlapping one side clips that side.
pub fn shift_range(range: TextRange, edit: &TextEdit) -> Option<TextRange> {
    let (start, end) = (range.start(), range.end());
    let edit_start = edit.offset;
    let edit_end = edit.offset + edit.old_len;
    let delta = edit.delta();
    let moved = |x: u32| (i64::from(x) + delta).max(0) as u32;

    if edit.old_len > 0 && edit_start <= start && edit_end >= end {
        return None;
    }
    let shifted = if edit_end <= start {
        TextRange::new(moved(start), moved(end))
    } else if edit_start >= end {
        range
    } else if edit_start >= start && edit_end <= end {
        TextRange::new(start, moved(end))
    } else if edit_start < start {
        TextRange::new(edit_start + edit.new_len(), moved(end))
    } else {
        TextRange::new(start, edit_start)
    };
    Some(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_bounds() {
        let r = TextRange::new(20, 10);
        assert_eq!(r.start(), 10);
        assert_eq!(r.end(), 20);
        assert_eq!(r.len(), 10);
    }

    #[test]
    fn containment_and_intersection() {
        let outer = TextRange::new(10, 30);
        assert!(outer.contains_range(TextRange::new(10, 30)));
        assert!(outer.contains_range(TextRange::new(15, 20)));
        assert!(!outer.contains_range(TextRange::new(5, 20)));
        assert!(outer.intersects(TextRange::new(25, 40)));
        assert!(!outer.intersects(TextRange::new(30, 40)));
        assert!(outer.contains_offset(30));
    }

    #[test]
    fn relative_to_outer() {
        let inner = TextRange::new(14, 18);
        assert_eq!(
            inner.relative_to(TextRange::new(10, 30)),
            Some(TextRange::new(4, 8))
        );
        assert_eq!(inner.relative_to(TextRange::new(15, 30)), None);
    }

    #[test]
    fn edit_before_shifts() {
        let r = TextRange::new(10, 20);
        assert_eq!(
            shift_range(r, &TextEdit::insert(2, "abc")),
            Some(TextRange::new(13, 23))
        );
        assert_eq!(
            shift_range(r, &TextEdit::delete(TextRange::new(0, 4))),
            Some(TextRange::new(6, 16))
        );
    }

    #[test]
    fn insertion_at_start_pushes_range() {
        let r = TextRange::new(10, 20);
        assert_eq!(
            shift_range(r, &TextEdit::insert(10, "xx")),
            Some(TextRange::new(12, 22))
        );
    }

    #[test]
    fn edit_after_is_ignored() {
        let r = TextRange::new(10, 20);
        assert_eq!(shift_range(r, &TextEdit::insert(20, "tail")), Some(r));
        assert_eq!(
            shift_range(r, &TextEdit::delete(TextRange::new(25, 30))),
            Some(r)
        );
    }

    #[test]
    fn edit_inside_moves_end() {
        let r = TextRange::new(10, 20);
        assert_eq!(
            shift_range(r, &TextEdit::insert(15, "12345")),
            Some(TextRange::new(10, 25))
        );
        assert_eq!(
            shift_range(r, &TextEdit::delete(TextRange::new(12, 14))),
            Some(TextRange::new(10, 18))
        );
    }

    #[test]
    fn covering_edit_deletes() {
        let r = TextRange::new(10, 20);
        assert_eq!(shift_range(r, &TextEdit::delete(TextRange::new(5, 25))), None);
        assert_eq!(
            shift_range(r, &TextEdit::replace(TextRange::new(10, 20), "other")),
            None
        );
    }

    #[test]
    fn partial_overlaps_clip() {
        let r = TextRange::new(10, 20);
        assert_eq!(
            shift_range(r, &TextEdit::delete(TextRange::new(5, 15))),
            Some(TextRange::new(5, 10))
        );
        assert_eq!(
            shift_range(r, &TextEdit::replace(TextRange::new(15, 25), "z")),
            Some(TextRange::new(10, 15))
        );
    }
}
