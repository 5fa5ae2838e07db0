// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Zero-width assertions about the text around the cursor.
//!
//! Lookahead runs its condition forward from the cursor. Lookbehind has no way of running a rule
//! backwards, so it searches for a start offset before the cursor from which the condition
//! matches and ends exactly at the cursor. Candidates are tried leftmost first, starting from the
//! start of input or from the lookbehind window (see [`Config::with_lookbehind_window`]).
//!
//! Neither kind ever keeps what the condition consumed.
//!
//! [`Config::with_lookbehind_window`]: ../struct.Config.html#method.with_lookbehind_window

use tracing::trace;

use crate::result::{Match, NoMatch, ParseResult};
use crate::rule::Rule;
use crate::scanner::Scanner;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Window {
    Configured,
    Fixed(usize),
}

// Runs `cond` at the cursor and puts the cursor back.
fn look_ahead<T: 'static>(cond: &Rule<T>, s: &mut Scanner<'_>) -> ParseResult<T> {
    let mark = s.mark();
    let furthest = s.set_furthest(None);

    let result = cond.scan(s);

    s.reset(mark);
    s.set_furthest(furthest);
    result
}

// Searches for the leftmost offset before the cursor from which `cond` matches up to the cursor.
// The cursor is back where it was when this returns.
fn look_behind<T: 'static>(cond: &Rule<T>, s: &mut Scanner<'_>, window: Window) -> Option<usize> {
    let cursor = s.mark();
    let window = match window {
        Window::Configured => s.config().lookbehind_window(),
        Window::Fixed(window) => Some(window),
    };
    let earliest = window.map_or(0, |window| cursor.offset().saturating_sub(window));
    let furthest = s.set_furthest(None);
    let mut found = None;

    for candidate in earliest..=cursor.offset() {
        s.jump(candidate);
        let result = cond.scan(s);
        s.reset(cursor);

        if matches!(result, Ok(ref m) if m.end() == cursor.offset()) {
            trace!(candidate, cursor = cursor.offset(), "lookbehind matched");
            found = Some(candidate);
            break;
        }
    }

    s.set_furthest(furthest);
    found
}

fn zero_width(s: &Scanner<'_>) -> ParseResult<()> {
    Ok(Match::new((), s.position(), 0))
}

/// Matches the empty string if `cond` matches at the cursor.
///
/// # Examples
///
/// ```
/// # use spindle::{character, followed_by, literal};
/// let rule = literal("ab").then_ignore(followed_by(character('c')));
///
/// assert_eq!(rule.run("abc").unwrap().length(), 2);
/// assert!(rule.run("abd").is_err());
/// ```
pub fn followed_by<T: 'static>(cond: Rule<T>) -> Rule<()> {
    Rule::new(move |s| look_ahead(&cond, s).and_then(|_| zero_width(s)))
}

/// Matches the empty string if `cond` does not match at the cursor.
pub fn not_followed_by<T: 'static>(cond: Rule<T>) -> Rule<()> {
    Rule::new(move |s| match look_ahead(&cond, s) {
        Ok(_) => Err(NoMatch::unexpected(s.position(), cond.describe())),
        Err(_) => zero_width(s),
    })
}

/// Matches `primary` if `cond` matches right after it. Only `primary` is consumed.
pub fn if_followed_by<T, U>(primary: Rule<T>, cond: Rule<U>) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    Rule::new(move |s| {
        let mark = s.mark();
        let m = primary.scan(s)?;

        match look_ahead(&cond, s) {
            Ok(_) => Ok(m),
            Err(failure) => {
                s.reset(mark);
                Err(failure)
            }
        }
    })
}

/// Matches `primary` unless `cond` matches right after it. Only `primary` is consumed.
///
/// # Examples
///
/// ```
/// # use spindle::{char_range, if_not_followed_by, literal};
/// let keyword = if_not_followed_by(literal("if"), char_range('a'..='z'));
///
/// assert!(keyword.run("if x").is_ok());
/// assert!(keyword.run("iffy").is_err());
/// ```
pub fn if_not_followed_by<T, U>(primary: Rule<T>, cond: Rule<U>) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    Rule::new(move |s| {
        let mark = s.mark();
        let m = primary.scan(s)?;

        match look_ahead(&cond, s) {
            Ok(_) => {
                let failure = NoMatch::unexpected(s.position(), cond.describe());
                s.reset(mark);
                Err(failure)
            }
            Err(_) => Ok(m),
        }
    })
}

fn preceded_by_in<T: 'static>(cond: Rule<T>, window: Window) -> Rule<()> {
    Rule::new(move |s| match look_behind(&cond, s, window) {
        Some(_) => zero_width(s),
        None => Err(NoMatch::expected(
            s.position(),
            format!("{} before", cond.describe()),
        )),
    })
}

fn not_preceded_by_in<T: 'static>(cond: Rule<T>, window: Window) -> Rule<()> {
    Rule::new(move |s| match look_behind(&cond, s, window) {
        Some(_) => Err(NoMatch::unexpected(
            s.position(),
            format!("{} before", cond.describe()),
        )),
        None => zero_width(s),
    })
}

fn if_preceded_by_in<T, U>(primary: Rule<T>, cond: Rule<U>, window: Window) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    let gate = preceded_by_in(cond, window);
    Rule::new(move |s| gate.scan(s).and_then(|_| primary.scan(s)))
}

fn if_not_preceded_by_in<T, U>(primary: Rule<T>, cond: Rule<U>, window: Window) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    let gate = not_preceded_by_in(cond, window);
    Rule::new(move |s| gate.scan(s).and_then(|_| primary.scan(s)))
}

/// Matches the empty string if some run of `cond` ends exactly at the cursor.
///
/// # Examples
///
/// ```
/// # use spindle::{literal, preceded_by, Scanner};
/// let after_arrow = preceded_by(literal("->"));
/// let mut scanner = Scanner::new("a->b");
///
/// scanner.advance(3);
/// assert!(after_arrow.scan(&mut scanner).is_ok());
/// assert_eq!(scanner.position(), 3);
/// ```
pub fn preceded_by<T: 'static>(cond: Rule<T>) -> Rule<()> {
    preceded_by_in(cond, Window::Configured)
}

/// Like [`preceded_by`], only searching the `window` characters before the cursor.
///
/// [`preceded_by`]: fn.preceded_by.html
pub fn preceded_by_within<T: 'static>(window: usize, cond: Rule<T>) -> Rule<()> {
    preceded_by_in(cond, Window::Fixed(window))
}

/// Matches the empty string if no run of `cond` ends exactly at the cursor.
pub fn not_preceded_by<T: 'static>(cond: Rule<T>) -> Rule<()> {
    not_preceded_by_in(cond, Window::Configured)
}

/// Like [`not_preceded_by`], only searching the `window` characters before the cursor.
///
/// [`not_preceded_by`]: fn.not_preceded_by.html
pub fn not_preceded_by_within<T: 'static>(window: usize, cond: Rule<T>) -> Rule<()> {
    not_preceded_by_in(cond, Window::Fixed(window))
}

/// Matches `primary` if some run of `cond` ends exactly at the cursor. Only `primary` is
/// consumed.
///
/// # Examples
///
/// ```
/// # use spindle::{char_range, if_preceded_by, literal, Scanner};
/// let suffix = if_preceded_by(literal("ing"), char_range('a'..='z'));
/// let mut scanner = Scanner::new("Xing sing");
///
/// scanner.advance(1);
/// assert!(suffix.scan(&mut scanner).is_err());
///
/// scanner.advance(5);
/// assert_eq!(suffix.scan(&mut scanner).unwrap().length(), 3);
/// ```
pub fn if_preceded_by<T, U>(primary: Rule<T>, cond: Rule<U>) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    if_preceded_by_in(primary, cond, Window::Configured)
}

/// Like [`if_preceded_by`], only searching the `window` characters before the cursor.
///
/// [`if_preceded_by`]: fn.if_preceded_by.html
pub fn if_preceded_by_within<T, U>(window: usize, primary: Rule<T>, cond: Rule<U>) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    if_preceded_by_in(primary, cond, Window::Fixed(window))
}

/// Matches `primary` unless some run of `cond` ends exactly at the cursor.
pub fn if_not_preceded_by<T, U>(primary: Rule<T>, cond: Rule<U>) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    if_not_preceded_by_in(primary, cond, Window::Configured)
}

/// Like [`if_not_preceded_by`], only searching the `window` characters before the cursor.
///
/// [`if_not_preceded_by`]: fn.if_not_preceded_by.html
pub fn if_not_preceded_by_within<T, U>(window: usize, primary: Rule<T>, cond: Rule<U>) -> Rule<T>
where
    T: 'static,
    U: 'static,
{
    if_not_preceded_by_in(primary, cond, Window::Fixed(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::primitives::{character, literal, pattern};

    fn at<'i>(input: &'i str, offset: usize) -> Scanner<'i> {
        let mut scanner = Scanner::new(input);
        scanner.advance(offset);
        scanner
    }

    #[test]
    fn followed_by_is_zero_width() {
        let mut scanner = at("abc", 1);

        let m = followed_by(literal("bc")).scan(&mut scanner).unwrap();
        assert_eq!(m, Match::new((), 1, 0));
        assert_eq!(scanner.position(), 1);
    }

    #[test]
    fn not_followed_by_reports_negative() {
        let failure = not_followed_by(character('a')).run("a").unwrap_err();

        assert_eq!(failure.reason().message(), "unexpected 'a'");
    }

    #[test]
    fn if_followed_by_restores() {
        let rule = if_followed_by(literal("ab"), character('c'));
        let mut scanner = at("abd", 0);

        assert!(rule.scan(&mut scanner).is_err());
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn if_not_followed_by_restores() {
        let rule = if_not_followed_by(literal("ab"), character('c'));
        let mut scanner = at("abc", 0);

        assert!(rule.scan(&mut scanner).is_err());
        assert_eq!(scanner.position(), 0);
        assert_eq!(rule.run("abd").unwrap().length(), 2);
    }

    #[test]
    fn preceded_by_variable_length() {
        let rule = preceded_by(pattern("a+b").unwrap());

        assert!(rule.scan(&mut at("xaaab!", 5)).is_ok());
        assert!(rule.scan(&mut at("xaaab!", 4)).is_err());
    }

    #[test]
    fn preceded_by_needs_exact_end() {
        // "ab" matches from 0, but ends before the cursor.
        let rule = preceded_by(literal("ab"));

        assert!(rule.scan(&mut at("abc", 3)).is_err());
        assert!(rule.scan(&mut at("abc", 2)).is_ok());
    }

    #[test]
    fn preceded_by_at_start() {
        assert!(preceded_by(character('a')).run("a").is_err());
        assert!(not_preceded_by(character('a')).run("a").is_ok());
    }

    #[test]
    fn preceded_by_zero_length_condition() {
        assert!(preceded_by(literal("")).run("a").is_ok());
    }

    #[test]
    fn lookbehind_leaves_cursor() {
        let rule = not_preceded_by(character('b'));
        let mut scanner = at("ab", 2);

        assert!(rule.scan(&mut scanner).is_err());
        assert_eq!(scanner.position(), 2);
    }

    #[test]
    fn window_limits_search() {
        let rule = preceded_by_within(2, literal("abc"));

        assert!(rule.scan(&mut at("abc", 3)).is_err());
        assert!(preceded_by_within(3, literal("abc"))
            .scan(&mut at("abc", 3))
            .is_ok());
    }

    #[test]
    fn configured_window() {
        let rule = preceded_by(literal("abc"));
        let mut scanner = Scanner::with_config("abc", Config::new().with_lookbehind_window(1));
        scanner.advance(3);

        assert!(rule.scan(&mut scanner).is_err());
    }

    #[test]
    fn if_not_preceded_by_gate() {
        let rule = if_not_preceded_by(character('x'), character('\\'));

        assert!(rule.scan(&mut at("\\x", 1)).is_err());
        assert_eq!(rule.scan(&mut at("ax", 1)).unwrap(), Match::new('x', 1, 1));
    }

    #[test]
    fn if_preceded_by_within_gate() {
        let rule = if_preceded_by_within(1, character('b'), literal("aa"));

        assert!(rule.scan(&mut at("aab", 2)).is_err());
    }
}
