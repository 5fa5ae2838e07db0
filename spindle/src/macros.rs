// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

/// Tries each rule in order and returns the first match.
///
/// Unlike [`choice`], the value type does not need a `Default`, but at least one rule has to be
/// given.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate spindle;
/// # use spindle::literal;
/// # fn main() {
/// let op = choice![literal("+"), literal("-"), literal("*")];
///
/// assert_eq!(op.run("-1").unwrap().into_value(), "-");
/// # }
/// ```
///
/// [`choice`]: fn.choice.html
#[macro_export]
macro_rules! choice {
    ( $first:expr $(, $rest:expr )* $(,)? ) => {
        $first $( .or($rest) )*
    };
}

/// Asserts that a rule matches an input starting at offset 0.
///
/// `consumed` is the expected match length in characters; `value` is compared with the matched
/// value.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate spindle;
/// # use spindle::literal;
/// # fn main() {
/// parses_to! {
///     rule: literal("ab"),
///     input: "abc",
///     value: "ab",
///     consumed: 2
/// };
/// # }
/// ```
#[macro_export]
macro_rules! parses_to {
    ( rule: $rule:expr, input: $input:expr, value: $value:expr, consumed: $consumed:expr $(,)? ) => {
        {
            let input = $input;
            match $rule.run(input) {
                Ok(m) => {
                    assert_eq!(
                        m.offset(),
                        0,
                        "match of {:?} does not start at 0",
                        input
                    );
                    assert_eq!(
                        m.length(),
                        $consumed,
                        "match of {:?} consumed {:?}",
                        input,
                        m.span(input)
                    );
                    assert_eq!(m.into_value(), $value);
                }
                Err(failure) => panic!(
                    "expected {:?} to match, but it failed:\n{}",
                    input,
                    failure.into_error(input)
                ),
            }
        }
    };
    ( rule: $rule:expr, input: $input:expr, consumed: $consumed:expr $(,)? ) => {
        {
            let input = $input;
            match $rule.run(input) {
                Ok(m) => assert_eq!(
                    m.length(),
                    $consumed,
                    "match of {:?} consumed {:?}",
                    input,
                    m.span(input)
                ),
                Err(failure) => panic!(
                    "expected {:?} to match, but it failed:\n{}",
                    input,
                    failure.into_error(input)
                ),
            }
        }
    };
}

/// Asserts that a rule fails on an input, at the given offset and, optionally, with the given
/// message.
///
/// # Examples
///
/// ```
/// # #[macro_use] extern crate spindle;
/// # use spindle::literal;
/// # fn main() {
/// fails_with! {
///     rule: literal("ab"),
///     input: "ax",
///     offset: 0,
///     message: "expected \"ab\""
/// };
/// # }
/// ```
#[macro_export]
macro_rules! fails_with {
    ( rule: $rule:expr, input: $input:expr, offset: $offset:expr $(, message: $message:expr )? $(,)? ) => {
        {
            let input = $input;
            match $rule.run(input) {
                Ok(m) => panic!(
                    "expected {:?} to fail, but it matched {:?}",
                    input,
                    m.span(input)
                ),
                Err(failure) => {
                    assert_eq!(failure.offset(), $offset, "failure offset in {:?}", input);
                    $( assert_eq!(failure.reason().message(), $message); )?
                }
            }
        }
    };
}
