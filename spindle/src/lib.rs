// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # spindle. Packrat parser combinators
//!
//! spindle builds parsers out of [`Rule`]s: small matchers composed with combinators into
//! grammars. Rules backtrack freely, may look ahead and behind the cursor, and, once wrapped with
//! [`memoize`], may be left recursive, either directly or through other rules.
//!
//! ```
//! # use spindle::{char_range, character, memoize, one_or_more, recursive};
//! let number = one_or_more(char_range('0'..='9'))
//!     .recognize()
//!     .map(|digits| digits.parse::<i64>().unwrap());
//!
//! // difference := difference '-' number | number
//! let difference = recursive("difference", |difference| {
//!     memoize(
//!         difference
//!             .then_ignore(character('-'))
//!             .then(number.clone())
//!             .map(|(left, right)| left - right)
//!             .or(number),
//!     )
//! });
//!
//! assert_eq!(difference.parse("10-2-3").unwrap(), 5);
//! ```
//!
//! Failures report the deepest offset reached, along with what was expected there:
//!
//! ```
//! # use spindle::{character, literal};
//! let greeting = literal("hello").then(character(' ')).then(literal("world"));
//!
//! let error = greeting.parse("hello there").unwrap_err();
//!
//! assert_eq!(error.offset(), 6);
//! assert_eq!(error.reason().message(), "expected \"world\"");
//! ```

#![doc(html_root_url = "https://docs.rs/spindle")]

#[macro_use]
mod macros;

mod combinators;
mod config;
pub mod error;
mod lookaround;
mod memo;
mod primitives;
mod result;
mod rule;
mod scanner;

pub use crate::combinators::{
    choice, exactly, handle, island, join, maximum, minimum, not_exactly, one_or_more, optional,
    range, satisfies, separated_by, until, zero_or_more,
};
pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::lookaround::{
    followed_by, if_followed_by, if_not_followed_by, if_not_preceded_by,
    if_not_preceded_by_within, if_preceded_by, if_preceded_by_within, not_followed_by,
    not_preceded_by, not_preceded_by_within, preceded_by, preceded_by_within,
};
pub use crate::memo::{memoize, MemoStats};
pub use crate::primitives::{
    any_char, char_matching, char_range, character, empty, end_of_input, fail, literal,
    literal_insensitive, none_of, one_of, pattern, regex, start_of_input,
};
pub use crate::result::{Match, NoMatch, ParseResult, Reason};
pub use crate::rule::{recursive, run, run_with, Ref, Rule, RuleId};
pub use crate::scanner::{Mark, Scanner};
