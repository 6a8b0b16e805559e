//! Client-side buffer of radio log output

use serde::Serialize;

/// Length above which a trim kicks in
pub const TRIM_THRESHOLD: usize = 2000;
/// Length kept after a trim
pub const TRIM_KEEP: usize = 1000;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LogBuffer {
    text: String,
}

impl LogBuffer {
    /// Append a fragment. Returns whether anything changed.
    pub fn append(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.text.push_str(fragment);
        true
    }

    /// Keep only the last [`TRIM_KEEP`] characters once the buffer grows
    /// beyond [`TRIM_THRESHOLD`] characters. Returns whether anything changed.
    pub fn trim(&mut self) -> bool {
        let chars = self.text.chars().count();
        if chars <= TRIM_THRESHOLD {
            return false;
        }

        let cut = self
            .text
            .char_indices()
            .nth(chars - TRIM_KEEP)
            .map_or(0, |(idx, _)| idx);
        self.text.drain(..cut);
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.text.is_empty();
        self.text.clear();
        changed
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
