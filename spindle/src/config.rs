// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::num::NonZeroUsize;

/// Per-session settings of a [`Scanner`].
///
/// A `Config` is copied into every scanner it creates, so the same value can be reused across
/// any number of parses.
///
/// # Examples
///
/// ```
/// # use std::num::NonZeroUsize;
/// # use spindle::Config;
/// let config = Config::new()
///     .with_lookbehind_window(16)
///     .with_call_limit(NonZeroUsize::new(10_000).unwrap());
///
/// assert_eq!(config.lookbehind_window(), Some(16));
/// ```
///
/// [`Scanner`]: struct.Scanner.html
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    lookbehind_window: Option<usize>,
    call_limit: Option<NonZeroUsize>,
}

impl Config {
    /// Creates a `Config` with an unbounded lookbehind search and no call limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits backward searches of lookbehind rules to the `window` characters before the
    /// cursor. Without a window, candidates are tried from the start of input.
    pub fn with_lookbehind_window(mut self, window: usize) -> Self {
        self.lookbehind_window = Some(window);
        self
    }

    /// Sets the maximum number of rule invocations of one session.
    ///
    /// Once the limit is reached every further invocation fails, which bounds the running time
    /// of pathological grammars.
    pub fn with_call_limit(mut self, limit: NonZeroUsize) -> Self {
        self.call_limit = Some(limit);
        self
    }

    pub fn lookbehind_window(&self) -> Option<usize> {
        self.lookbehind_window
    }

    pub fn call_limit(&self) -> Option<NonZeroUsize> {
        self.call_limit
    }
}

#[derive(Debug)]
pub(crate) struct CallLimitTracker {
    current_call_limit: Option<(usize, usize)>,
}

impl CallLimitTracker {
    pub(crate) fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            current_call_limit: limit.map(|limit| (0, limit.get())),
        }
    }

    pub(crate) fn limit_reached(&self) -> bool {
        self.current_call_limit
            .map_or(false, |(current, limit)| current >= limit)
    }

    pub(crate) fn increment_depth(&mut self) {
        if let Some((current, _)) = &mut self.current_call_limit {
            *current += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded() {
        let config = Config::default();

        assert_eq!(config.lookbehind_window(), None);
        assert_eq!(config.call_limit(), None);
    }

    #[test]
    fn tracker_without_limit() {
        let mut tracker = CallLimitTracker::new(None);

        for _ in 0..1000 {
            tracker.increment_depth();
        }

        assert!(!tracker.limit_reached());
    }

    #[test]
    fn tracker_reaches_limit() {
        let mut tracker = CallLimitTracker::new(NonZeroUsize::new(2));

        assert!(!tracker.limit_reached());
        tracker.increment_depth();
        assert!(!tracker.limit_reached());
        tracker.increment_depth();
        assert!(tracker.limit_reached());
    }
}
