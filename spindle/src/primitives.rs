// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Rules matching input directly. Each of them measures its match before performing a single
//! `advance`, so a failed primitive never moves the cursor.

use std::ops::RangeInclusive;

use regex::Regex;

use crate::result::{Match, NoMatch, ParseResult};
use crate::rule::Rule;
use crate::scanner::Scanner;

fn match_char_by<F>(s: &mut Scanner<'_>, label: &str, f: F) -> ParseResult<char>
where
    F: FnOnce(char) -> bool,
{
    let start = s.position();
    match s.peek_char() {
        Some(c) if f(c) => {
            s.advance(1);
            Ok(Match::new(c, start, 1))
        }
        _ => Err(NoMatch::expected(start, label)),
    }
}

/// Matches the character `c`.
///
/// # Examples
///
/// ```
/// # use spindle::character;
/// let a = character('a');
///
/// assert_eq!(a.run("ab").unwrap().into_value(), 'a');
/// assert!(a.run("ba").is_err());
/// ```
pub fn character(c: char) -> Rule<char> {
    let label = format!("{:?}", c);

    Rule::with_name(label.clone(), move |s| {
        match_char_by(s, &label, |actual| actual == c)
    })
}

/// Matches the string `string` exactly.
pub fn literal(string: impl Into<String>) -> Rule<String> {
    let string = string.into();
    let length = string.chars().count();
    let label = format!("{:?}", string);

    Rule::with_name(label.clone(), move |s| {
        let start = s.position();
        if s.rest().starts_with(string.as_str()) {
            s.advance(length);
            Ok(Match::new(string.clone(), start, length))
        } else {
            Err(NoMatch::expected(start, label.as_str()))
        }
    })
}

/// Matches `string` ignoring ASCII case. The value is the text as it appears in the input.
///
/// # Examples
///
/// ```
/// # use spindle::literal_insensitive;
/// let select = literal_insensitive("select");
///
/// assert_eq!(select.run("SeLeCt *").unwrap().into_value(), "SeLeCt");
/// ```
pub fn literal_insensitive(string: impl Into<String>) -> Rule<String> {
    let string = string.into();
    let length = string.chars().count();
    let label = format!("{:?}", string);

    Rule::with_name(label.clone(), move |s| {
        let start = s.position();
        let candidate = s.peek(length);
        if candidate.chars().count() == length && candidate.eq_ignore_ascii_case(&string) {
            s.advance(length);
            Ok(Match::new(candidate.to_owned(), start, length))
        } else {
            Err(NoMatch::expected(start, label.as_str()))
        }
    })
}

/// Matches a single character within `range`.
pub fn char_range(range: RangeInclusive<char>) -> Rule<char> {
    let label = format!("{:?}..={:?}", range.start(), range.end());

    Rule::with_name(label.clone(), move |s| {
        match_char_by(s, &label, |c| range.contains(&c))
    })
}

/// Matches a single character for which `predicate` holds. `description` names the expected
/// character class in failures.
///
/// # Examples
///
/// ```
/// # use spindle::char_matching;
/// let upper = char_matching("uppercase letter", char::is_uppercase);
///
/// assert!(upper.run("Q").is_ok());
/// assert_eq!(
///     upper.run("q").unwrap_err().reason().message(),
///     "expected uppercase letter"
/// );
/// ```
pub fn char_matching<F>(description: impl Into<String>, predicate: F) -> Rule<char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    let label = description.into();

    Rule::with_name(label.clone(), move |s| match_char_by(s, &label, &predicate))
}

/// Matches any one of `chars`.
pub fn one_of(chars: &str) -> Rule<char> {
    let set: Vec<char> = chars.chars().collect();
    char_matching(format!("one of {:?}", chars), move |c| set.contains(&c))
}

/// Matches any single character not in `chars`.
pub fn none_of(chars: &str) -> Rule<char> {
    let set: Vec<char> = chars.chars().collect();
    char_matching(format!("none of {:?}", chars), move |c| !set.contains(&c))
}

/// Matches any single character; fails only at the end of input.
pub fn any_char() -> Rule<char> {
    char_matching("any character", |_| true)
}

/// Matches the regular expression `regex` at the cursor. The value is the matched text.
///
/// The expression is anchored at the cursor: it must match starting exactly there.
/// Zero-length matches succeed without consuming input.
///
/// # Examples
///
/// ```
/// # use spindle::pattern;
/// let number = pattern(r"[0-9]+(\.[0-9]+)?").unwrap();
///
/// assert_eq!(number.run("3.14+1").unwrap().into_value(), "3.14");
/// assert!(number.run("x3").is_err());
/// ```
pub fn pattern(regex: &str) -> Result<Rule<String>, regex::Error> {
    let anchored = Regex::new(&format!("^(?:{})", regex))?;
    Ok(regex_rule(anchored, format!("/{}/", regex)))
}

/// Matches a compiled regular expression at the cursor. See [`pattern`].
///
/// [`pattern`]: fn.pattern.html
pub fn regex(regex: &Regex) -> Rule<String> {
    // Unanchored expressions are wrapped so that they cannot skip ahead.
    let anchored = Regex::new(&format!("^(?:{})", regex.as_str()))
        .unwrap_or_else(|_| unreachable!("wrapping a valid expression keeps it valid"));
    regex_rule(anchored, format!("/{}/", regex.as_str()))
}

fn regex_rule(anchored: Regex, label: String) -> Rule<String> {
    Rule::with_name(label.clone(), move |s| {
        let start = s.position();
        match anchored.find(s.rest()) {
            Some(found) => {
                let length = s.chars_in(found.end());
                s.advance(length);
                Ok(Match::new(found.as_str().to_owned(), start, length))
            }
            None => Err(NoMatch::expected(start, label.as_str())),
        }
    })
}

/// Matches the empty string at the start of input.
pub fn start_of_input() -> Rule<()> {
    Rule::with_name("start of input", |s| {
        if s.is_at_start() {
            Ok(Match::new((), 0, 0))
        } else {
            Err(NoMatch::expected(s.position(), "start of input"))
        }
    })
}

/// Matches the empty string at the end of input.
pub fn end_of_input() -> Rule<()> {
    Rule::with_name("end of input", |s| {
        let position = s.position();
        if s.is_at_end() {
            Ok(Match::new((), position, 0))
        } else {
            Err(NoMatch::expected(position, "end of input"))
        }
    })
}

/// Always matches, consuming nothing.
pub fn empty() -> Rule<()> {
    Rule::with_name("nothing", |s| Ok(Match::new((), s.position(), 0)))
}

/// Never matches, failing with `message`.
pub fn fail<T: 'static>(message: impl Into<String>) -> Rule<T> {
    let message = message.into();
    Rule::new(move |s| Err(NoMatch::custom(s.position(), message.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_label() {
        let failure = character('x').run("y").unwrap_err();

        assert_eq!(failure, NoMatch::expected(0, "'x'"));
    }

    #[test]
    fn literal_multibyte() {
        let m = literal("αβ").run("αβγ").unwrap();

        assert_eq!((m.offset(), m.length()), (0, 2));
    }

    #[test]
    fn literal_empty_is_zero_length() {
        let mut scanner = Scanner::new("abc");
        let m = literal("").scan(&mut scanner).unwrap();

        assert_eq!(m.length(), 0);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn literal_failure_keeps_cursor() {
        let mut scanner = Scanner::new("abd");

        let failure = literal("abc").scan(&mut scanner).unwrap_err();
        assert_eq!(failure.reason().message(), "expected \"abc\"");
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn insensitive_short_input() {
        assert!(literal_insensitive("abc").run("AB").is_err());
    }

    #[test]
    fn range() {
        let digit = char_range('0'..='9');

        assert!(digit.run("0").is_ok());
        assert!(digit.run("9").is_ok());
        assert!(digit.run("a").is_err());
        assert!(digit.run("").is_err());
    }

    #[test]
    fn sets() {
        assert!(one_of("+-").run("-").is_ok());
        assert!(one_of("+-").run("*").is_err());
        assert!(none_of("\"").run("a").is_ok());
        assert!(none_of("\"").run("\"").is_err());
    }

    #[test]
    fn pattern_zero_length() {
        let spaces = pattern(" *").unwrap();
        let m = spaces.run("abc").unwrap();

        assert_eq!(m.length(), 0);
        assert_eq!(m.into_value(), "");
    }

    #[test]
    fn pattern_is_anchored() {
        let digits = pattern("[0-9]+").unwrap();

        assert!(digits.run("ab12").is_err());
    }

    #[test]
    fn pattern_alternation_is_anchored() {
        let either = pattern("a|b").unwrap();

        assert!(either.run("cb").is_err());
        assert!(either.run("b").is_ok());
    }

    #[test]
    fn pattern_counts_chars() {
        let mut scanner = Scanner::new("ééx");
        let m = pattern("é+").unwrap().scan(&mut scanner).unwrap();

        assert_eq!(m.length(), 2);
        assert_eq!(scanner.position(), 2);
    }

    #[test]
    fn invalid_pattern() {
        assert!(pattern("(").is_err());
    }

    #[test]
    fn compiled_regex() {
        let word = regex(&Regex::new("[a-z]+").unwrap());

        assert_eq!(word.run("abc1").unwrap().into_value(), "abc");
        assert!(word.run("1abc").is_err());
    }

    #[test]
    fn anchors() {
        let mut scanner = Scanner::new("ab");

        assert!(start_of_input().scan(&mut scanner).is_ok());
        assert!(end_of_input().scan(&mut scanner).is_err());

        scanner.advance(2);
        assert!(start_of_input().scan(&mut scanner).is_err());
        assert_eq!(
            end_of_input().scan(&mut scanner).unwrap(),
            Match::new((), 2, 0)
        );
    }

    #[test]
    fn fail_always_fails() {
        let never: Rule<()> = fail("nope");

        assert_eq!(never.run("").unwrap_err(), NoMatch::custom(0, "nope"));
    }
}
