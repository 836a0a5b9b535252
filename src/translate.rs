//! Text to symbol-sequence translation
//!
//! Pure front end of the playback engine: lower-cases the input, keeps
//! supported letters, turns spaces into pauses and drops everything
//! else. An empty result is an ordinary value, not an error; the
//! sequencer checks for it and completes immediately.

use crate::alphabet;

/// One unit of a playback queue: a letter with a clip identity, or a
/// pause that only consumes time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Letter(char),
    Pause,
}

impl Symbol {
    /// The letter, if this symbol carries one
    pub fn letter(&self) -> Option<char> {
        match self {
            Symbol::Letter(c) => Some(*c),
            Symbol::Pause => None,
        }
    }
}

/// Translate input text into an ordered symbol sequence.
///
/// Unsupported characters are silently dropped; relative order of the
/// surviving characters is preserved.
pub fn translate(text: &str) -> Vec<Symbol> {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c == ' ' {
                Some(Symbol::Pause)
            } else if alphabet::is_supported(c) {
                Some(Symbol::Letter(c))
            } else {
                None
            }
        })
        .collect()
}
