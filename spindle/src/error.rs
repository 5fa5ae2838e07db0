// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Types for rendering parse failures.

use crate::result::{NoMatch, Reason};

/// A [`NoMatch`] resolved against the input it was produced from, carrying the line and column
/// of the failure and the offending source line.
///
/// # Examples
///
/// ```
/// # use spindle::NoMatch;
/// let error = NoMatch::expected(4, "digit").into_error("1+2\n3+x");
///
/// assert_eq!(error.line_col(), (2, 1));
/// assert_eq!(
///     error.to_string(),
///     [
///         " --> 2:1",
///         "  |",
///         "2 | 3+x",
///         "  | ^---",
///         "  |",
///         "  = expected digit",
///     ]
///     .join("\n")
/// );
/// ```
///
/// [`NoMatch`]: ../struct.NoMatch.html
#[derive(Clone, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[error("{}", self.format())]
pub struct Error {
    reason: Reason,
    offset: usize,
    line_col: (usize, usize),
    line: String,
}

impl Error {
    pub fn new(no_match: NoMatch, input: &str) -> Error {
        let offset = no_match.offset();
        let line_col = line_col(input, offset);
        let line = line_of(input, offset).to_owned();

        Error {
            reason: no_match.reason().clone(),
            offset,
            line_col,
            line,
        }
    }

    #[inline]
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// Returns the character offset of the failure.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the 1-based line and column of the failure.
    #[inline]
    pub fn line_col(&self) -> (usize, usize) {
        self.line_col
    }

    /// Returns the source line the failure occurred on, without its line terminator.
    #[inline]
    pub fn line(&self) -> &str {
        &self.line
    }

    fn format(&self) -> String {
        let (line, col) = self.line_col;
        let spacing = " ".repeat(line.to_string().len());

        let mut result = format!("{}--> {}:{}\n", spacing, line, col);
        result.push_str(&format!("{} |\n", spacing));
        result.push_str(&format!("{} | {}\n", line, self.line));
        result.push_str(&format!("{} | {}^---\n", spacing, " ".repeat(col - 1)));
        result.push_str(&format!("{} |\n", spacing));
        result.push_str(&format!("{} = {}", spacing, self.reason.message()));

        result
    }
}

fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut chars = input.chars().take(offset).peekable();
    let mut line_col = (1, 1);

    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                line_col = (line_col.0 + 1, 1);
            }
            '\n' => line_col = (line_col.0 + 1, 1),
            _ => line_col = (line_col.0, line_col.1 + 1),
        }
    }

    line_col
}

fn line_of(input: &str, offset: usize) -> &str {
    let pos = input
        .char_indices()
        .nth(offset)
        .map_or(input.len(), |(i, _)| i);

    let start = input[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = input[pos..].find('\n').map_or(input.len(), |i| pos + i);

    input[start..end].trim_end_matches('\r')
}
