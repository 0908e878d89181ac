//! Editable text buffers whose range markers follow every edit.

use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::error::TextError;
use crate::range::{shift_range, TextEdit, TextRange};

/// A range in a [`Document`] that is kept up to date as the document changes.
///
/// The document only holds markers weakly: dropping the last `Arc` detaches
/// the marker. Once an edit removes the whole marked text the marker becomes
/// invalid and [`range`](Self::range) returns `None` forever after.
#[derive(Debug)]
pub struct RangeMarker {
    range: Mutex<Option<TextRange>>,
}

impl RangeMarker {
    fn new(range: TextRange) -> Self {
        Self {
            range: Mutex::new(Some(range)),
        }
    }

    /// Current range, or `None` if the marked text was deleted.
    pub fn range(&self) -> Option<TextRange> {
        *self.range.lock().unwrap()
    }

    /// Returns `true` while the marked text still exists.
    pub fn is_valid(&self) -> bool {
        self.range().is_some()
    }

    fn apply(&self, edit: &TextEdit) {
        let mut range = self.range.lock().unwrap();
        if let Some(current) = *range {
            *range = shift_range(current, edit);
        }
    }
}

#[derive(Debug)]
struct DocumentState {
    text: String,
    stamp: u64,
    markers: Vec<Weak<RangeMarker>>,
}

/// The authoritative text of one virtual file.
///
/// Every successful [`replace`](Self::replace) bumps the modification stamp,
/// which the tree layer compares against the stamp of its last parse to decide
/// whether a commit must reparse.
#[derive(Debug)]
pub struct Document {
    state: RwLock<DocumentState>,
}

impl Document {
    /// Creates a document holding `text` at stamp 0.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(DocumentState {
                text: text.into(),
                stamp: 0,
                markers: Vec::new(),
            }),
        }
    }

    /// Returns a copy of the current text.
    pub fn text(&self) -> String {
        self.state.read().unwrap().text.clone()
    }

    /// Runs `f` with a borrow of the current text.
    pub fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(&self.state.read().unwrap().text)
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> u32 {
        self.state.read().unwrap().text.len() as u32
    }

    /// Returns `true` if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Modification stamp, incremented by every edit.
    pub fn stamp(&self) -> u64 {
        self.state.read().unwrap().stamp
    }

    /// Returns the text covered by `range`, if it is in bounds.
    pub fn slice(&self, range: TextRange) -> Option<String> {
        let state = self.state.read().unwrap();
        state
            .text
            .get(range.start() as usize..range.end() as usize)
            .map(str::to_string)
    }

    /// Applies `edit`, moving every live marker.
    pub fn replace(&self, edit: &TextEdit) -> Result<(), TextError> {
        let mut state = self.state.write().unwrap();
        let old = edit.old_range();
        check_range(&state.text, old)?;

        state.text.replace_range(
            old.start() as usize..old.end() as usize,
            &edit.new_text,
        );
        state.stamp += 1;
        state.markers.retain(|weak| match weak.upgrade() {
            Some(marker) => {
                marker.apply(edit);
                true
            }
            None => false,
        });
        tracing::trace!(
            offset = edit.offset,
            old_len = edit.old_len,
            new_len = edit.new_len(),
            stamp = state.stamp,
            "document edited"
        );
        Ok(())
    }

    /// Inserts `text` at `offset`.
    pub fn insert(&self, offset: u32, text: &str) -> Result<(), TextError> {
        self.replace(&TextEdit::insert(offset, text))
    }

    /// Deletes the text in `range`.
    pub fn delete(&self, range: TextRange) -> Result<(), TextError> {
        self.replace(&TextEdit::delete(range))
    }

    /// Creates a marker tracking `range`.
    pub fn create_marker(&self, range: TextRange) -> Result<Arc<RangeMarker>, TextError> {
        let mut state = self.state.write().unwrap();
        check_range(&state.text, range)?;
        let marker = Arc::new(RangeMarker::new(range));
        state.markers.push(Arc::downgrade(&marker));
        Ok(marker)
    }

    /// Number of markers still attached to this document.
    pub fn marker_count(&self) -> usize {
        let state = self.state.read().unwrap();
        state.markers.iter().filter(|m| m.strong_count() > 0).count()
    }
}

fn check_range(text: &str, range: TextRange) -> Result<(), TextError> {
    let len = text.len() as u32;
    if range.end() > len {
        return Err(TextError::OutOfBounds {
            start: range.start(),
            end: range.end(),
            len,
        });
    }
    for offset in [range.start(), range.end()] {
        if !text.is_char_boundary(offset as usize) {
            return Err(TextError::NotCharBoundary { offset });
        }
    }
    Ok(())
}
