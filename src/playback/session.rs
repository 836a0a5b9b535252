//! Playback session
//!
//! One in-progress playback request, from submit to completion or
//! cancellation. Exclusively owned by the sequencer; at most one
//! session exists at a time (overlapping submits are rejected).

use crate::translate::Symbol;

#[derive(Debug, Clone)]
pub struct PlaybackSession {
    queue: Vec<Symbol>,
    cursor: usize,
}

impl PlaybackSession {
    pub fn new(queue: Vec<Symbol>) -> Self {
        Self { queue, cursor: 0 }
    }

    /// Symbol at the cursor, `None` once the queue is exhausted
    pub fn current(&self) -> Option<Symbol> {
        self.queue.get(self.cursor).copied()
    }

    /// Move the cursor forward one symbol
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Symbols not yet reached (including the current one)
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }
}
