// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::fmt;

use crate::error::Error;

/// The outcome of invoking a [`Rule`]: either a [`Match`] or a [`NoMatch`].
///
/// [`Rule`]: struct.Rule.html
/// [`Match`]: struct.Match.html
/// [`NoMatch`]: struct.NoMatch.html
pub type ParseResult<T> = Result<Match<T>, NoMatch>;

/// A successful match of `length` characters starting at `offset`.
///
/// Offsets and lengths count `char`s, not bytes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Match<T> {
    value: T,
    offset: usize,
    length: usize,
}

impl<T> Match<T> {
    /// Creates a `Match` carrying `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::Match;
    /// let m = Match::new('a', 3, 1);
    ///
    /// assert_eq!(m.end(), 4);
    /// ```
    pub fn new(value: T, offset: usize, length: usize) -> Self {
        Match {
            value,
            offset,
            length,
        }
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Returns the offset the match started at.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of characters consumed.
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the offset right after the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Returns the consumed slice of `input`, or `None` if `input` is not the text this match was
    /// produced from and the span falls outside of it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::Match;
    /// let m = Match::new((), 1, 2);
    ///
    /// assert_eq!(m.span("añob"), Some("ño"));
    /// assert_eq!(m.span("a"), None);
    /// ```
    pub fn span<'i>(&self, input: &'i str) -> Option<&'i str> {
        let start = byte_index(input, self.offset)?;
        let end = byte_index(input, self.end())?;
        input.get(start..end)
    }

    /// Transforms the value, keeping the position untouched.
    pub fn map<U, F>(self, f: F) -> Match<U>
    where
        F: FnOnce(T) -> U,
    {
        Match {
            value: f(self.value),
            offset: self.offset,
            length: self.length,
        }
    }
}

fn byte_index(input: &str, offset: usize) -> Option<usize> {
    input
        .char_indices()
        .map(|(i, _)| i)
        .chain(Some(input.len()))
        .nth(offset)
}

/// A failed match.
///
/// `offset` is the deepest position a failure was detected at, which may lie past the offset the
/// failing rule started from.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NoMatch {
    offset: usize,
    reason: Reason,
}

impl NoMatch {
    pub fn new(offset: usize, reason: Reason) -> Self {
        NoMatch { offset, reason }
    }

    /// Creates a failure expecting `label` at `offset`.
    pub fn expected(offset: usize, label: impl Into<String>) -> Self {
        NoMatch::new(
            offset,
            Reason::Expected {
                positives: vec![label.into()],
                negatives: vec![],
            },
        )
    }

    /// Creates a failure rejecting `label` at `offset`.
    pub fn unexpected(offset: usize, label: impl Into<String>) -> Self {
        NoMatch::new(
            offset,
            Reason::Expected {
                positives: vec![],
                negatives: vec![label.into()],
            },
        )
    }

    pub fn custom(offset: usize, message: impl Into<String>) -> Self {
        NoMatch::new(
            offset,
            Reason::Custom {
                message: message.into(),
            },
        )
    }

    // A failure carrying no expectation; merging it into another failure leaves the other intact.
    pub(crate) fn silent(offset: usize) -> Self {
        NoMatch::new(
            offset,
            Reason::Expected {
                positives: vec![],
                negatives: vec![],
            },
        )
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// Combines two failures, keeping the deepest one. Failures at the same offset have their
    /// expectations merged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::NoMatch;
    /// let merged = NoMatch::expected(2, "a").merge(NoMatch::expected(2, "b"));
    /// assert_eq!(merged.reason().to_string(), "expected a or b");
    ///
    /// let deeper = NoMatch::expected(2, "a").merge(NoMatch::expected(5, "c"));
    /// assert_eq!(deeper.offset(), 5);
    /// ```
    pub fn merge(self, other: NoMatch) -> NoMatch {
        if other.offset > self.offset {
            return other;
        }
        if other.offset < self.offset {
            return self;
        }

        let offset = self.offset;
        let reason = match (self.reason, other.reason) {
            (
                Reason::Expected {
                    mut positives,
                    mut negatives,
                },
                Reason::Expected {
                    positives: other_positives,
                    negatives: other_negatives,
                },
            ) => {
                extend_distinct(&mut positives, other_positives);
                extend_distinct(&mut negatives, other_negatives);
                Reason::Expected {
                    positives,
                    negatives,
                }
            }
            (reason, other) if reason.is_silent() => other,
            (reason, _) => reason,
        };

        NoMatch { offset, reason }
    }

    /// Renders the failure against the `input` it was produced from.
    pub fn into_error(self, input: &str) -> Error {
        Error::new(self, input)
    }
}

fn extend_distinct(labels: &mut Vec<String>, others: Vec<String>) {
    for label in others {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.reason, self.offset)
    }
}

/// Why a rule failed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Reason {
    /// Labels of what was expected at the failure offset, and labels that matched there although
    /// they were not allowed to.
    Expected {
        /// Expected labels
        positives: Vec<String>,
        /// Rejected labels
        negatives: Vec<String>,
    },
    /// A repetition was built with a negative count or with `max < min`.
    InvalidBounds {
        /// Lower bound
        min: isize,
        /// Upper bound, `None` when unbounded
        max: Option<isize>,
    },
    /// Any other failure, such as an unsatisfied predicate.
    Custom {
        /// Short explanation
        message: String,
    },
}

impl Reason {
    pub(crate) fn is_silent(&self) -> bool {
        matches!(
            self,
            Reason::Expected { positives, negatives } if positives.is_empty() && negatives.is_empty()
        )
    }

    /// Returns a human-readable explanation of the failure.
    pub fn message(&self) -> String {
        match self {
            Reason::Expected {
                positives,
                negatives,
            } => parsing_error_message(positives, negatives),
            Reason::InvalidBounds { min, max: Some(max) } => {
                format!("invalid repetition bounds {}..={}", min, max)
            }
            Reason::InvalidBounds { min, max: None } => {
                format!("invalid repetition bounds {}..", min)
            }
            Reason::Custom { message } => message.to_owned(),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn parsing_error_message(positives: &[String], negatives: &[String]) -> String {
    let positives = sorted(positives);
    let negatives = sorted(negatives);

    match (negatives.is_empty(), positives.is_empty()) {
        (false, false) => format!(
            "unexpected {}; expected {}",
            enumerate(&negatives),
            enumerate(&positives)
        ),
        (false, true) => format!("unexpected {}", enumerate(&negatives)),
        (true, false) => format!("expected {}", enumerate(&positives)),
        (true, true) => "unknown parsing error".to_owned(),
    }
}

fn sorted(labels: &[String]) -> Vec<&str> {
    let mut labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

fn enumerate(labels: &[&str]) -> String {
    match labels.len() {
        1 => labels[0].to_owned(),
        2 => format!("{} or {}", labels[0], labels[1]),
        l => {
            let separated = labels[..l - 1].join(", ");
            format!("{}, or {}", separated, labels[l - 1])
        }
    }
}
