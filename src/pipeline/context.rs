//! Rolling context window carried between section calls.

/// Bounded accumulator holding the tail of previously generated text.
///
/// After each section the window becomes the last `capacity` characters of
/// `window + "\n" + section`. Lengths are counted in `char`s, so a window
/// never splits a UTF-8 sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollingContext {
    capacity: usize,
    window: String,
}

impl RollingContext {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            window: String::new(),
        }
    }

    /// Fold a newly generated section into the window.
    pub fn push(&mut self, text: &str) {
        let combined = format!("{}\n{}", self.window, text);
        let len = combined.chars().count();
        self.window = if len > self.capacity {
            combined.chars().skip(len - self.capacity).collect()
        } else {
            combined
        };
    }

    pub fn as_str(&self) -> &str {
        &self.window
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
