// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Rules built from other rules.
//!
//! Every combinator here either matches or leaves the cursor where it found it. Those that run
//! several rules in a row take a [`Mark`] first and reset to it when a later rule fails.
//!
//! [`Mark`]: ../struct.Mark.html

use crate::result::{Match, NoMatch, ParseResult, Reason};
use crate::rule::Rule;
use crate::scanner::Scanner;

/// Tries `rules` in order and returns the first match.
///
/// A choice between no rules matches the empty string with `T::default()`.
///
/// # Examples
///
/// ```
/// # use spindle::{choice, literal};
/// let keyword = choice(vec![literal("for"), literal("fo"), literal("f")]);
///
/// assert_eq!(keyword.run("fox").unwrap().into_value(), "fo");
/// ```
pub fn choice<T, I>(rules: I) -> Rule<T>
where
    T: Default + 'static,
    I: IntoIterator<Item = Rule<T>>,
{
    let rules: Vec<Rule<T>> = rules.into_iter().collect();

    Rule::new(move |s| {
        if rules.is_empty() {
            return Ok(Match::new(T::default(), s.position(), 0));
        }

        let mut failure: Option<NoMatch> = None;
        for rule in &rules {
            match rule.scan(s) {
                Ok(m) => return Ok(m),
                Err(e) => {
                    failure = Some(match failure {
                        Some(previous) => previous.merge(e),
                        None => e,
                    })
                }
            }
        }

        Err(failure.unwrap_or_else(|| NoMatch::silent(s.position())))
    })
}

/// Matches `rule` or, failing that, the empty string. Never fails.
pub fn optional<T: 'static>(rule: Rule<T>) -> Rule<Option<T>> {
    Rule::new(move |s| match rule.scan(s) {
        Ok(m) => Ok(m.map(Some)),
        Err(_) => Ok(Match::new(None, s.position(), 0)),
    })
}

fn checked_bounds(min: isize, max: Option<isize>) -> Option<(usize, Option<usize>)> {
    if min < 0 {
        return None;
    }
    match max {
        Some(max) if max < min => None,
        Some(max) => Some((min as usize, Some(max as usize))),
        None => Some((min as usize, None)),
    }
}

// Greedy repetition. Unbounded repetitions stop at the first zero-length match that brings the
// count up to `min`, since repeating it would never end.
fn repeat<T>(
    rule: &Rule<T>,
    s: &mut Scanner<'_>,
    min: usize,
    max: Option<usize>,
) -> (Vec<T>, Option<NoMatch>)
where
    T: 'static,
{
    let mut values = vec![];

    loop {
        if max.map_or(false, |max| values.len() >= max) {
            return (values, None);
        }

        match rule.scan(s) {
            Ok(m) => {
                let zero_length = m.length() == 0;
                values.push(m.into_value());
                if zero_length && max.is_none() && values.len() >= min {
                    return (values, None);
                }
            }
            Err(failure) => return (values, Some(failure)),
        }
    }
}

fn bounded<T: 'static>(min: isize, max: Option<isize>, rule: Rule<T>) -> Rule<Vec<T>> {
    Rule::new(move |s| {
        let start = s.mark();
        let (min, max) = match checked_bounds(min, max) {
            Some(bounds) => bounds,
            None => {
                return Err(NoMatch::new(
                    start.offset(),
                    Reason::InvalidBounds { min, max },
                ))
            }
        };

        let (values, failure) = repeat(&rule, s, min, max);
        if values.len() >= min {
            let length = s.position() - start.offset();
            Ok(Match::new(values, start.offset(), length))
        } else {
            s.reset(start);
            match failure {
                Some(failure) if !failure.reason().is_silent() => Err(failure),
                _ => Err(NoMatch::custom(
                    start.offset(),
                    format!("expected at least {} repetitions", min),
                )),
            }
        }
    })
}

/// Matches `rule` exactly `n` times.
///
/// `n < 0` always fails with [`Reason::InvalidBounds`]; `n == 0` matches the empty string.
///
/// # Examples
///
/// ```
/// # use spindle::{character, exactly};
/// let three = exactly(3, character('a'));
///
/// assert_eq!(three.run("aaaa").unwrap().length(), 3);
/// assert!(three.run("aa").is_err());
/// assert!(exactly(-1, character('a')).run("aaa").is_err());
/// ```
///
/// [`Reason::InvalidBounds`]: enum.Reason.html#variant.InvalidBounds
pub fn exactly<T: 'static>(n: isize, rule: Rule<T>) -> Rule<Vec<T>> {
    bounded(n, Some(n), rule)
}

/// Matches `rule` greedily at least `min` and at most `max` times. `max < min` always fails.
pub fn range<T: 'static>(min: isize, max: isize, rule: Rule<T>) -> Rule<Vec<T>> {
    bounded(min, Some(max), rule)
}

/// Matches `rule` greedily at most `n` times.
pub fn maximum<T: 'static>(n: isize, rule: Rule<T>) -> Rule<Vec<T>> {
    bounded(0, Some(n), rule)
}

/// Matches `rule` greedily at least `n` times.
pub fn minimum<T: 'static>(n: isize, rule: Rule<T>) -> Rule<Vec<T>> {
    bounded(n, None, rule)
}

/// Matches `rule` as many times as possible. Never fails.
pub fn zero_or_more<T: 'static>(rule: Rule<T>) -> Rule<Vec<T>> {
    bounded(0, None, rule)
}

/// Matches `rule` as many times as possible, but at least once.
pub fn one_or_more<T: 'static>(rule: Rule<T>) -> Rule<Vec<T>> {
    bounded(1, None, rule)
}

/// Matches the greedy run of `rule` unless it is exactly `n` repetitions long.
///
/// # Examples
///
/// ```
/// # use spindle::{character, not_exactly};
/// let not_two = not_exactly(2, character('a'));
///
/// assert_eq!(not_two.run("a").unwrap().length(), 1);
/// assert_eq!(not_two.run("aaa").unwrap().length(), 3);
/// assert!(not_two.run("aab").is_err());
/// ```
pub fn not_exactly<T: 'static>(n: isize, rule: Rule<T>) -> Rule<Vec<T>> {
    Rule::new(move |s| {
        let start = s.mark();
        if n < 0 {
            return Err(NoMatch::new(
                start.offset(),
                Reason::InvalidBounds {
                    min: n,
                    max: Some(n),
                },
            ));
        }

        let (values, _) = repeat(&rule, s, 0, None);
        if values.len() != n as usize {
            let length = s.position() - start.offset();
            Ok(Match::new(values, start.offset(), length))
        } else {
            s.reset(start);
            Err(NoMatch::custom(
                start.offset(),
                format!("expected anything but exactly {} repetitions", n),
            ))
        }
    })
}

/// Matches `open`, `inner` and `close` in a row, keeping only `inner`'s value.
///
/// # Examples
///
/// ```
/// # use spindle::{character, island, pattern};
/// let parenthesized = island(character('('), pattern("[a-z]*").unwrap(), character(')'));
///
/// assert_eq!(parenthesized.run("(abc)").unwrap().into_value(), "abc");
/// assert!(parenthesized.run("(abc").is_err());
/// ```
pub fn island<O, T, C>(open: Rule<O>, inner: Rule<T>, close: Rule<C>) -> Rule<T>
where
    O: 'static,
    T: 'static,
    C: 'static,
{
    Rule::new(move |s| {
        let mark = s.mark();
        let result = open
            .scan(s)
            .and_then(|_| inner.scan(s))
            .and_then(|m| close.scan(s).map(|_| m.into_value()));

        match result {
            Ok(value) => {
                let length = s.position() - mark.offset();
                Ok(Match::new(value, mark.offset(), length))
            }
            Err(failure) => {
                s.reset(mark);
                Err(failure)
            }
        }
    })
}

/// Matches one or more `element`s separated by `separator`. A trailing separator is not
/// consumed.
///
/// # Examples
///
/// ```
/// # use spindle::{char_range, character, separated_by};
/// let digits = separated_by(char_range('0'..='9'), character(','));
///
/// let m = digits.run("1,2,3,").unwrap();
/// assert_eq!(m.value(), &vec!['1', '2', '3']);
/// assert_eq!(m.length(), 5);
/// ```
pub fn separated_by<T, S>(element: Rule<T>, separator: Rule<S>) -> Rule<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    Rule::new(move |s| {
        let start = s.position();
        let first = element.scan(s)?;
        let mut values = vec![first.into_value()];

        loop {
            let mark = s.mark();
            let next = separator.scan(s).and_then(|_| element.scan(s));
            match next {
                Ok(m) => values.push(m.into_value()),
                Err(_) => {
                    s.reset(mark);
                    break;
                }
            }
        }

        Ok(Match::new(values, start, s.position() - start))
    })
}

/// Matches each of `rules` in order with `separator` between every two of them.
///
/// # Examples
///
/// ```
/// # use spindle::{character, join, literal};
/// let date = join(character('-'), vec![literal("2024"), literal("01"), literal("31")]);
///
/// assert!(date.run("2024-01-31").is_ok());
/// assert!(date.run("2024-01-").is_err());
/// ```
pub fn join<T, S>(separator: Rule<S>, rules: Vec<Rule<T>>) -> Rule<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    Rule::new(move |s| {
        let mark = s.mark();
        let mut values = Vec::with_capacity(rules.len());

        for (i, rule) in rules.iter().enumerate() {
            let result = if i == 0 {
                rule.scan(s)
            } else {
                separator.scan(s).and_then(|_| rule.scan(s))
            };

            match result {
                Ok(m) => values.push(m.into_value()),
                Err(failure) => {
                    s.reset(mark);
                    return Err(failure);
                }
            }
        }

        Ok(Match::new(values, mark.offset(), s.position() - mark.offset()))
    })
}

/// Consumes characters until `rule` would match, or to the end of input. `rule` itself is not
/// consumed. The value is the consumed text. Never fails.
///
/// # Examples
///
/// ```
/// # use spindle::{literal, until};
/// let comment = until(literal("*/"));
///
/// assert_eq!(comment.run("a * b */ c").unwrap().into_value(), "a * b ");
/// assert_eq!(comment.run("abc").unwrap().into_value(), "abc");
/// ```
pub fn until<T: 'static>(rule: Rule<T>) -> Rule<String> {
    Rule::new(move |s| {
        let start = s.mark();
        let furthest = s.set_furthest(None);

        while !s.is_at_end() {
            let probe = s.mark();
            let found = rule.scan(s).is_ok();
            s.reset(probe);

            if found {
                break;
            }
            s.advance(1);
        }
        s.set_furthest(furthest);

        let length = s.position() - start.offset();
        let text = s.slice(start.offset(), length).unwrap_or_default();
        Ok(Match::new(text.to_owned(), start.offset(), length))
    })
}

/// Matches `rule` only if `predicate` holds for its value.
///
/// # Examples
///
/// ```
/// # use spindle::{pattern, satisfies};
/// let byte = satisfies(
///     pattern("[0-9]+").unwrap().map(|d| d.parse::<u32>().unwrap()),
///     |n| *n < 256,
/// );
///
/// assert!(byte.run("255").is_ok());
/// assert!(byte.run("256").is_err());
/// ```
pub fn satisfies<T, F>(rule: Rule<T>, predicate: F) -> Rule<T>
where
    T: 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    let description = format!("{} to satisfy its predicate", rule.describe());

    Rule::new(move |s| {
        let mark = s.mark();
        let m = rule.scan(s)?;

        if predicate(m.value()) {
            Ok(m)
        } else {
            s.reset(mark);
            Err(NoMatch::custom(mark.offset(), format!("expected {}", description)))
        }
    })
}

/// Matches `rule` or, when it fails, the rule `recover` builds from the failure. The recovery
/// rule starts at the same offset `rule` did.
///
/// # Examples
///
/// ```
/// # use spindle::{empty, handle, literal};
/// let value = handle(literal("true").to(true), |_| empty().to(false));
///
/// assert_eq!(value.run("true").unwrap().into_value(), true);
/// assert_eq!(value.run("nope").unwrap().into_value(), false);
/// ```
pub fn handle<T, F>(rule: Rule<T>, recover: F) -> Rule<T>
where
    T: 'static,
    F: Fn(&NoMatch) -> Rule<T> + Send + Sync + 'static,
{
    Rule::new(move |s| match rule.scan(s) {
        Ok(m) => Ok(m),
        Err(failure) => recover(&failure).scan(s),
    })
}
