// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::fmt;

use crate::config::{CallLimitTracker, Config};
use crate::memo::{MemoStats, MemoTable};
use crate::result::NoMatch;

/// A saved cursor position of a [`Scanner`], used to backtrack.
///
/// [`Scanner`]: struct.Scanner.html
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Mark(usize);

impl Mark {
    #[inline]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// The complete state of one parse session: the input, a cursor into it and the memo table of
/// every memoized rule invoked so far.
///
/// The cursor counts `char`s. A rule that fails must leave the cursor where it found it; a rule
/// that matches leaves it right after the match.
pub struct Scanner<'i> {
    input: &'i str,
    // Byte index of every char, followed by `input.len()`.
    boundaries: Vec<usize>,
    offset: usize,
    config: Config,
    call_tracker: CallLimitTracker,
    // Set once an invocation has been refused by the call limit.
    call_limit_hit: bool,
    // Deepest failure seen so far, for error reporting.
    furthest: Option<NoMatch>,
    pub(crate) memo: MemoTable,
}

impl<'i> Scanner<'i> {
    /// Creates a `Scanner` at the start of `input` with the default [`Config`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::Scanner;
    /// let scanner = Scanner::new("ab");
    ///
    /// assert_eq!(scanner.position(), 0);
    /// assert_eq!(scanner.len(), 2);
    /// ```
    ///
    /// [`Config`]: struct.Config.html
    pub fn new(input: &'i str) -> Self {
        Scanner::with_config(input, Config::default())
    }

    pub fn with_config(input: &'i str, config: Config) -> Self {
        let boundaries = input
            .char_indices()
            .map(|(i, _)| i)
            .chain(Some(input.len()))
            .collect();

        Scanner {
            input,
            boundaries,
            offset: 0,
            config,
            call_tracker: CallLimitTracker::new(config.call_limit()),
            call_limit_hit: false,
            furthest: None,
            memo: MemoTable::default(),
        }
    }

    /// Returns the whole input of the session.
    #[inline]
    pub fn input(&self) -> &'i str {
        self.input
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the length of the input in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current cursor offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn is_at_start(&self) -> bool {
        self.offset == 0
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset == self.len()
    }

    /// Returns up to `n` characters starting at the cursor without moving it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::Scanner;
    /// let scanner = Scanner::new("héllo");
    ///
    /// assert_eq!(scanner.peek(2), "hé");
    /// assert_eq!(scanner.peek(10), "héllo");
    /// ```
    pub fn peek(&self, n: usize) -> &'i str {
        let end = self.len().min(self.offset.saturating_add(n));
        self.slice(self.offset, end - self.offset).unwrap_or("")
    }

    /// Returns the character at the cursor, if any.
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns everything from the cursor to the end of input.
    #[inline]
    pub fn rest(&self) -> &'i str {
        &self.input[self.boundaries[self.offset]..]
    }

    /// Returns the `length` characters starting at `start`, or `None` if that range exceeds the
    /// input.
    pub fn slice(&self, start: usize, length: usize) -> Option<&'i str> {
        let end = start.checked_add(length)?;
        let from = *self.boundaries.get(start)?;
        let to = *self.boundaries.get(end)?;
        Some(&self.input[from..to])
    }

    /// Moves the cursor `n` characters forward. Only call this for a match whose length has
    /// already been determined.
    ///
    /// # Panics
    ///
    /// Panics if the cursor would move past the end of input.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        let offset = self.offset + n;
        assert!(offset <= self.len(), "advanced past the end of input");
        self.offset = offset;
    }

    /// Saves the cursor so that it can be restored with [`reset`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::Scanner;
    /// let mut scanner = Scanner::new("abc");
    /// let mark = scanner.mark();
    ///
    /// scanner.advance(2);
    /// scanner.reset(mark);
    ///
    /// assert_eq!(scanner.position(), 0);
    /// ```
    ///
    /// [`reset`]: #method.reset
    #[inline]
    pub fn mark(&self) -> Mark {
        Mark(self.offset)
    }

    #[inline]
    pub fn reset(&mut self, mark: Mark) {
        self.offset = mark.0;
    }

    // Moves the cursor to an offset already known to be the end of a match.
    #[inline]
    pub(crate) fn jump(&mut self, offset: usize) {
        debug_assert!(offset <= self.len());
        self.offset = offset;
    }

    /// Returns the number of characters of the prefix of `rest()` that is `bytes` long.
    pub(crate) fn chars_in(&self, bytes: usize) -> usize {
        let start = self.boundaries[self.offset];
        let target = start + bytes;
        match self.boundaries[self.offset..].binary_search(&target) {
            Ok(count) => count,
            Err(count) => count - 1,
        }
    }

    /// Counts one rule invocation against the call limit. Returns `false` once the limit has
    /// been reached.
    #[inline]
    pub(crate) fn enter(&mut self) -> bool {
        if self.call_tracker.limit_reached() {
            self.call_limit_hit = true;
            return false;
        }
        self.call_tracker.increment_depth();
        true
    }

    #[inline]
    pub(crate) fn reached_call_limit(&self) -> bool {
        self.call_limit_hit
    }

    // Keeps `failure` if it is at least as deep as every failure recorded before.
    pub(crate) fn record_failure(&mut self, failure: &NoMatch) {
        if failure.reason().is_silent() {
            return;
        }

        self.furthest = match self.furthest.take() {
            Some(furthest) if furthest.offset() > failure.offset() => Some(furthest),
            Some(furthest) => Some(furthest.merge(failure.clone())),
            None => Some(failure.clone()),
        };
    }

    #[inline]
    pub(crate) fn furthest(&self) -> Option<&NoMatch> {
        self.furthest.as_ref()
    }

    #[inline]
    pub(crate) fn set_furthest(&mut self, furthest: Option<NoMatch>) -> Option<NoMatch> {
        std::mem::replace(&mut self.furthest, furthest)
    }

    // Merges `failure` into the deepest failure recorded during the session.
    pub(crate) fn furthest_failure(&mut self, failure: NoMatch) -> NoMatch {
        match self.furthest.take() {
            Some(furthest) => furthest.merge(failure),
            None => failure,
        }
    }

    /// Returns counters describing how the memo table has been used so far.
    pub fn memo_stats(&self) -> MemoStats {
        self.memo.stats()
    }
}

impl fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("offset", &self.offset)
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
