// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use spindle::{
    char_matching, character, if_followed_by, if_not_followed_by, if_not_preceded_by,
    if_preceded_by, if_preceded_by_within, literal, not_preceded_by, one_or_more, pattern,
    preceded_by, zero_or_more, Config, Rule, Scanner,
};

fn lowercase() -> Rule<char> {
    char_matching("lowercase letter", char::is_lowercase)
}

fn scanner_at(input: &str, offset: usize) -> Scanner<'_> {
    let mut scanner = Scanner::new(input);
    scanner.advance(offset);
    scanner
}

#[test]
fn preceded_by_lowercase() {
    let rule = if_preceded_by(pattern("[0-9]+").unwrap(), lowercase());
    let mut scanner = scanner_at("x123", 1);

    let m = rule.scan(&mut scanner).unwrap();

    assert_eq!((m.offset(), m.length()), (1, 3));
    assert_eq!(m.into_value(), "123");
    assert_eq!(scanner.position(), 4);
}

#[test]
fn preceded_by_uppercase() {
    let rule = if_preceded_by(pattern("[0-9]+").unwrap(), lowercase());
    let mut scanner = scanner_at("X123", 1);

    let failure = rule.scan(&mut scanner).unwrap_err();

    assert_eq!(failure.offset(), 1);
    assert_eq!(
        failure.reason().message(),
        "expected lowercase letter before"
    );
    assert_eq!(scanner.position(), 1);
}

#[test]
fn nothing_precedes_start() {
    let rule = if_preceded_by(literal("a"), lowercase());

    assert!(rule.run("a").is_err());
}

#[test]
fn variable_length_lookbehind() {
    // A keyword only counts after a complete identifier followed by a dot.
    let member = if_preceded_by(
        literal("len"),
        one_or_more(lowercase()).then(character('.')),
    );
    let mut scanner = scanner_at("items.len", 6);

    assert_eq!(member.scan(&mut scanner).unwrap().length(), 3);

    let mut scanner = scanner_at("items len", 6);
    assert!(member.scan(&mut scanner).is_err());
}

#[test]
fn lookbehind_picks_leftmost_start() {
    // `zero_or_more` also matches the empty string at the cursor; the leftmost candidate wins
    // and lookbehind still consumes nothing.
    let rule = preceded_by(zero_or_more(lowercase()));
    let mut scanner = scanner_at("abc", 3);

    let m = rule.scan(&mut scanner).unwrap();

    assert_eq!((m.offset(), m.length()), (3, 0));
    assert_eq!(scanner.position(), 3);
}

#[test]
fn window_from_config() {
    let rule = preceded_by(literal("abc"));
    let config = Config::new().with_lookbehind_window(2);

    let mut unbounded = scanner_at("abcd", 3);
    assert!(rule.scan(&mut unbounded).is_ok());

    let mut bounded = Scanner::with_config("abcd", config);
    bounded.advance(3);
    assert!(rule.scan(&mut bounded).is_err());
}

#[test]
fn window_per_rule() {
    let narrow = if_preceded_by_within(2, literal("d"), literal("abc"));
    let wide = if_preceded_by_within(3, literal("d"), literal("abc"));

    assert!(narrow.scan(&mut scanner_at("abcd", 3)).is_err());
    assert!(wide.scan(&mut scanner_at("abcd", 3)).is_ok());
}

#[test]
fn negative_lookbehind() {
    let unescaped_quote = if_not_preceded_by(character('"'), character('\\'));

    assert!(unescaped_quote.scan(&mut scanner_at("a\"", 1)).is_ok());
    assert!(unescaped_quote.scan(&mut scanner_at("\\\"", 1)).is_err());
    assert!(not_preceded_by(character('\\')).run("").is_ok());
}

#[test]
fn lookahead_is_zero_width() {
    let keyword = if_not_followed_by(literal("in"), lowercase());
    let prefix = if_followed_by(literal("in"), literal("put"));

    assert_eq!(keyword.run("in x").unwrap().length(), 2);
    assert!(keyword.run("int").is_err());
    assert_eq!(prefix.run("input").unwrap().length(), 2);
    assert!(prefix.run("inner").is_err());
}

#[test]
fn failed_lookahead_keeps_cursor() {
    let rule = if_followed_by(literal("ab"), literal("c"));
    let mut scanner = Scanner::new("abd");

    assert!(rule.scan(&mut scanner).is_err());
    assert_eq!(scanner.position(), 0);
}
