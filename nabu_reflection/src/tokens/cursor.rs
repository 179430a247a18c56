//! Bidirectional cursor over a token slice
//!
//! Every declaration parser receives the cursor explicitly. The `find_*`
//! family never moves it; `goto_*` moves it only when the search succeeds.

use super::token::{Token, TokenKind};
use crate::logging::codes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("Invalid search direction '{0}', expected 'next' or 'previous'")]
    InvalidDirection(String),

    #[error("Cursor position {position} is outside the token range (len {len})")]
    InvalidPosition { position: isize, len: usize },
}

impl CursorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            CursorError::InvalidDirection(_) => codes::cursor::INVALID_DIRECTION,
            CursorError::InvalidPosition { .. } => codes::cursor::INVALID_POSITION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        }
    }

    fn step(&self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Previous => -1,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "previous" => Ok(Direction::Previous),
            other => Err(CursorError::InvalidDirection(other.to_string())),
        }
    }
}

/// A position into a borrowed token slice
///
/// The key may step one past either end, after which the cursor is invalid
/// until it is moved back with `seek`.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    key: isize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, key: 0 }
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Current position; only meaningful while `valid()`
    pub fn key(&self) -> usize {
        self.key.max(0) as usize
    }

    pub fn valid(&self) -> bool {
        self.key >= 0 && (self.key as usize) < self.tokens.len()
    }

    /// Token under the cursor
    ///
    /// # Panics
    /// When the cursor is outside the token range.
    pub fn current(&self) -> &'a Token {
        match self.try_current() {
            Some(token) => token,
            None => panic!(
                "contract violation: {}",
                CursorError::InvalidPosition {
                    position: self.key,
                    len: self.tokens.len()
                }
            ),
        }
    }

    pub fn try_current(&self) -> Option<&'a Token> {
        if self.valid() {
            self.tokens.get(self.key as usize)
        } else {
            None
        }
    }

    /// Move to an absolute position
    ///
    /// # Panics
    /// When `position` is outside `[0, len)`.
    pub fn seek(&mut self, position: usize) {
        if position >= self.tokens.len() {
            panic!(
                "contract violation: {}",
                CursorError::InvalidPosition {
                    position: position as isize,
                    len: self.tokens.len()
                }
            );
        }
        self.key = position as isize;
    }

    pub fn next(&mut self) -> Option<&'a Token> {
        if self.key < self.tokens.len() as isize {
            self.key += 1;
        }
        self.try_current()
    }

    pub fn previous(&mut self) -> Option<&'a Token> {
        if self.key >= 0 {
            self.key -= 1;
        }
        self.try_current()
    }

    pub fn token_at(&self, position: usize) -> Option<&'a Token> {
        self.tokens.get(position)
    }

    // ========================================================================
    // BOUNDED SEARCHES
    // ========================================================================

    pub fn find_next_by_type(
        &mut self,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        self.find_by_type(Direction::Next, kinds, max_distance, stop_at)
    }

    pub fn find_previous_by_type(
        &mut self,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        self.find_by_type(Direction::Previous, kinds, max_distance, stop_at)
    }

    pub fn goto_next_by_type(
        &mut self,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        self.goto_by_type(Direction::Next, kinds, max_distance, stop_at)
    }

    pub fn goto_previous_by_type(
        &mut self,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        self.goto_by_type(Direction::Previous, kinds, max_distance, stop_at)
    }

    fn find_by_type(
        &mut self,
        direction: Direction,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        let origin = self.key;
        let found = self.search(direction, kinds, max_distance, stop_at);
        self.key = origin;
        found
    }

    fn goto_by_type(
        &mut self,
        direction: Direction,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        let origin = self.key;
        let found = self.search(direction, kinds, max_distance, stop_at);
        if found.is_none() {
            self.key = origin;
        }
        found
    }

    /// String-directed search, leaving the cursor on the match
    ///
    /// Anything other than `"next"` or `"previous"` is rejected before the
    /// cursor is touched.
    pub fn search_in_direction(
        &mut self,
        direction: &str,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Result<Option<&'a Token>, CursorError> {
        let direction: Direction = direction.parse()?;
        Ok(self.goto_by_type(direction, kinds, max_distance, stop_at))
    }

    /// Core walk; a `max_distance` of 0 means unbounded
    fn search(
        &mut self,
        direction: Direction,
        kinds: &[TokenKind],
        max_distance: usize,
        stop_at: &[TokenKind],
    ) -> Option<&'a Token> {
        let mut count = 0usize;
        loop {
            self.key += direction.step();
            let token = self.try_current()?;
            count += 1;

            if stop_at.contains(&token.kind) {
                return None;
            }
            if kinds.contains(&token.kind) {
                return Some(token);
            }
            if max_distance > 0 && count == max_distance {
                return None;
            }
        }
    }

    // ========================================================================
    // PAIR MATCHING
    // ========================================================================

    /// Positions of the first `open` after the cursor and its matching `close`
    ///
    /// A missing opener yields `(None, None)`; an opener that is never closed
    /// yields `(Some(start), None)`. The cursor does not move.
    pub fn token_ids_of_pair(
        &self,
        open: TokenKind,
        close: TokenKind,
    ) -> (Option<usize>, Option<usize>) {
        let mut depth: i32 = -1;
        let mut start = None;

        for position in self.key() + 1..self.tokens.len() {
            let kind = self.tokens[position].kind;
            if kind == open {
                if depth == -1 {
                    depth = 0;
                    start = Some(position);
                }
                depth += 1;
            } else if kind == close {
                if depth == -1 {
                    continue;
                }
                depth -= 1;
                if depth == 0 {
                    return (start, Some(position));
                }
            }
        }

        (start, None)
    }
}
