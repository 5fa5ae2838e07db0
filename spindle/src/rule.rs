// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::config::Config;
use crate::error::Error;
use crate::result::{Match, NoMatch, ParseResult};
use crate::scanner::Scanner;

/// Identity of a [`Rule`], used to key memo entries.
///
/// [`Rule`]: struct.Rule.html
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn fresh() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);
        RuleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type ParseFn<T> = dyn Fn(&mut Scanner<'_>) -> ParseResult<T> + Send + Sync;

/// A parse function producing values of type `T`.
///
/// Rules are cheap to clone and hold no per-parse state; everything that changes during a parse
/// lives in the [`Scanner`]. The same rule may therefore be run against any number of inputs,
/// from any number of threads.
///
/// [`Scanner`]: struct.Scanner.html
pub struct Rule<T> {
    id: RuleId,
    name: Option<Arc<str>>,
    parse: Arc<ParseFn<T>>,
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Rule {
            id: self.id,
            name: self.name.clone(),
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl<T: 'static> Rule<T> {
    /// Creates a rule from a parse function.
    ///
    /// The function must uphold the backtracking contract: when it returns a [`NoMatch`], the
    /// scanner's cursor is where it was when the function was called.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::{Match, NoMatch, Rule};
    /// let digit = Rule::new(|s| {
    ///     let start = s.position();
    ///     match s.peek_char().and_then(|c| c.to_digit(10)) {
    ///         Some(d) => {
    ///             s.advance(1);
    ///             Ok(Match::new(d, start, 1))
    ///         }
    ///         None => Err(NoMatch::expected(start, "digit")),
    ///     }
    /// });
    ///
    /// assert_eq!(digit.run("7").unwrap().into_value(), 7);
    /// ```
    ///
    /// [`NoMatch`]: struct.NoMatch.html
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Scanner<'_>) -> ParseResult<T> + Send + Sync + 'static,
    {
        Rule {
            id: RuleId::fresh(),
            name: None,
            parse: Arc::new(f),
        }
    }

    pub(crate) fn with_name<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Scanner<'_>) -> ParseResult<T> + Send + Sync + 'static,
    {
        Rule {
            id: RuleId::fresh(),
            name: Some(Arc::from(name.into())),
            parse: Arc::new(f),
        }
    }

    pub(crate) fn from_parts<F>(id: RuleId, name: Option<&str>, f: F) -> Self
    where
        F: Fn(&mut Scanner<'_>) -> ParseResult<T> + Send + Sync + 'static,
    {
        Rule {
            id,
            name: name.map(Arc::from),
            parse: Arc::new(f),
        }
    }

    #[inline]
    pub fn id(&self) -> RuleId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    // Label used when this rule is named in a failure reason.
    pub(crate) fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => format!("rule {}", self.id),
        }
    }

    /// Invokes the rule at the scanner's cursor.
    #[inline]
    pub fn scan(&self, scanner: &mut Scanner<'_>) -> ParseResult<T> {
        if !scanner.enter() {
            return Err(NoMatch::custom(scanner.position(), "call limit reached"));
        }

        let result = (self.parse)(scanner);
        if let Err(failure) = &result {
            scanner.record_failure(failure);
        }
        result
    }

    fn scan_session(&self, scanner: &mut Scanner<'_>) -> ParseResult<T> {
        let result = self.scan(scanner);

        if scanner.reached_call_limit() {
            warn!(rule = %self.describe(), offset = scanner.position(), "call limit reached");
            return Err(NoMatch::custom(scanner.position(), "call limit reached"));
        }

        result
    }

    /// Runs the rule at the start of `input` in a fresh session.
    ///
    /// The match does not need to consume the whole input; see [`parse`] for that.
    ///
    /// [`parse`]: #method.parse
    pub fn run(&self, input: &str) -> ParseResult<T> {
        self.run_with(input, &Config::default())
    }

    /// Runs the rule at the start of `input` in a fresh session configured by `config`.
    pub fn run_with(&self, input: &str, config: &Config) -> ParseResult<T> {
        let mut scanner = Scanner::with_config(input, *config);
        self.scan_session(&mut scanner)
    }

    /// Runs the rule against `input`, requiring it to consume everything, and returns its value.
    ///
    /// The error points at the deepest offset any rule failed at during the parse, even when
    /// that failure was backtracked over.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::literal;
    /// let ab = literal("ab");
    ///
    /// assert_eq!(ab.parse("ab").unwrap(), "ab");
    /// assert_eq!(ab.parse("abc").unwrap_err().line_col(), (1, 3));
    /// ```
    pub fn parse(&self, input: &str) -> Result<T, Error> {
        self.parse_with(input, &Config::default())
    }

    pub fn parse_with(&self, input: &str, config: &Config) -> Result<T, Error> {
        let mut scanner = Scanner::with_config(input, *config);

        let failure = match self.scan_session(&mut scanner) {
            Ok(m) if m.end() == scanner.len() => return Ok(m.into_value()),
            Ok(m) => scanner.furthest_failure(NoMatch::expected(m.end(), "end of input")),
            Err(failure) if scanner.reached_call_limit() => failure,
            Err(failure) => scanner.furthest_failure(failure),
        };

        Err(failure.into_error(input))
    }

    /// Names the rule. When the rule fails without any nested rule getting past its start, the
    /// failure is reported as expecting `label`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::character;
    /// let sign = character('+').or(character('-')).label("sign");
    /// let failure = sign.run("*").unwrap_err();
    ///
    /// assert_eq!(failure.reason().message(), "expected sign");
    /// ```
    pub fn label(self, label: impl Into<String>) -> Rule<T> {
        let label = label.into();
        let reported = label.clone();

        Rule::with_name(label, move |s| {
            let start = s.position();
            let furthest = s.furthest().cloned();

            self.scan(s).map_err(|failure| {
                if failure.offset() > start {
                    failure
                } else {
                    // The label stands in for everything the rule expected here.
                    s.set_furthest(furthest);
                    NoMatch::expected(start, reported.clone())
                }
            })
        })
    }

    /// Transforms the matched value.
    pub fn map<U, F>(self, f: F) -> Rule<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Rule::new(move |s| self.scan(s).map(|m| m.map(&f)))
    }

    /// Replaces the matched value with `value`.
    pub fn to<U>(self, value: U) -> Rule<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    /// Replaces the matched value with the consumed text.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::{char_range, one_or_more};
    /// let word = one_or_more(char_range('a'..='z')).recognize();
    ///
    /// assert_eq!(word.run("abc1").unwrap().into_value(), "abc");
    /// ```
    pub fn recognize(self) -> Rule<String> {
        Rule::new(move |s| {
            let m = self.scan(s)?;
            let text = s.slice(m.offset(), m.length()).unwrap_or_default().to_owned();
            Ok(m.map(|_| text))
        })
    }

    /// Runs the rule, then the rule `f` builds from its value. Either both match or the cursor is
    /// restored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use spindle::{any_char, character};
    /// // A character followed by the same character.
    /// let double = any_char().bind(character);
    ///
    /// assert!(double.run("aa").is_ok());
    /// assert!(double.run("ab").is_err());
    /// ```
    pub fn bind<U, F>(self, f: F) -> Rule<U>
    where
        U: 'static,
        F: Fn(T) -> Rule<U> + Send + Sync + 'static,
    {
        Rule::new(move |s| {
            let mark = s.mark();
            let first = self.scan(s)?;
            let next = f(first.into_value());

            match next.scan(s) {
                Ok(second) => {
                    let length = second.end() - mark.offset();
                    Ok(Match::new(second.into_value(), mark.offset(), length))
                }
                Err(failure) => {
                    s.reset(mark);
                    Err(failure)
                }
            }
        })
    }

    /// Runs the rule, then `other`, pairing their values.
    pub fn then<U: 'static>(self, other: Rule<U>) -> Rule<(T, U)> {
        Rule::new(move |s| {
            let mark = s.mark();
            let first = self.scan(s)?;

            match other.scan(s) {
                Ok(second) => {
                    let length = second.end() - mark.offset();
                    Ok(Match::new(
                        (first.into_value(), second.into_value()),
                        mark.offset(),
                        length,
                    ))
                }
                Err(failure) => {
                    s.reset(mark);
                    Err(failure)
                }
            }
        })
    }

    /// Runs the rule, then `other`, keeping this rule's value.
    pub fn then_ignore<U: 'static>(self, other: Rule<U>) -> Rule<T> {
        self.then(other).map(|(value, _)| value)
    }

    /// Runs the rule, then `other`, keeping `other`'s value.
    pub fn ignore_then<U: 'static>(self, other: Rule<U>) -> Rule<U> {
        self.then(other).map(|(_, value)| value)
    }

    /// Tries this rule, then `other` if it fails.
    pub fn or(self, other: Rule<T>) -> Rule<T> {
        Rule::new(move |s| match self.scan(s) {
            Ok(m) => Ok(m),
            Err(first) => other.scan(s).map_err(|second| first.merge(second)),
        })
    }
}

/// A lazily resolved reference to a rule, used to build self-referential and mutually recursive
/// grammars.
///
/// [`rule`] hands out references that resolve the definition on each invocation. They hold the
/// definition weakly, so a grammar referring to itself does not keep itself alive; the rule
/// returned by [`define`] owns it.
///
/// # Panics
///
/// Invoking a reference before [`define`] was called, or after the defined rule was dropped,
/// panics.
///
/// # Examples
///
/// ```
/// # use spindle::{character, Ref, Rule};
/// // nested = "(" nested ")" | ""
/// let nested: Ref<usize> = Ref::declare("nested");
/// let body = character('(')
///     .ignore_then(nested.rule())
///     .then_ignore(character(')'))
///     .map(|depth| depth + 1)
///     .or(spindle::empty().to(0));
/// let nested = nested.define(body);
///
/// assert_eq!(nested.run("((()))").unwrap().into_value(), 3);
/// ```
///
/// [`rule`]: #method.rule
/// [`define`]: #method.define
pub struct Ref<T> {
    name: Arc<str>,
    cell: Arc<OnceCell<Rule<T>>>,
}

impl<T: 'static> Ref<T> {
    pub fn declare(name: impl Into<String>) -> Self {
        Ref {
            name: Arc::from(name.into()),
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Returns a rule that forwards to the eventual definition.
    pub fn rule(&self) -> Rule<T> {
        let name = Arc::clone(&self.name);
        let cell: Weak<OnceCell<Rule<T>>> = Arc::downgrade(&self.cell);

        Rule::with_name(name.to_string(), move |s| {
            let cell = cell.upgrade().unwrap_or_else(|| {
                panic!("rule `{}` was invoked after its definition was dropped", name)
            });
            let rule = cell
                .get()
                .unwrap_or_else(|| panic!("rule `{}` was invoked before it was defined", name))
                .clone();
            rule.scan(s)
        })
    }

    /// Resolves every reference handed out by [`rule`] to `rule` and returns the owning rule.
    ///
    /// Only the returned rule keeps the definition alive. A handle from [`rule`] used on its own,
    /// such as an intermediate rule parsed directly, works only while the owning rule is kept
    /// around; once it is dropped, invoking the handle panics.
    ///
    /// [`rule`]: #method.rule
    pub fn define(self, rule: Rule<T>) -> Rule<T> {
        let cell = self.cell;
        let id = rule.id;
        let name = rule.name.clone().or(Some(self.name));

        if cell.set(rule).is_err() {
            unreachable!("a `Ref` is defined exactly once");
        }

        Rule {
            id,
            name,
            parse: Arc::new(move |s| match cell.get() {
                Some(rule) => rule.scan(s),
                None => unreachable!("the cell was set above"),
            }),
        }
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("name", &self.name)
            .field("defined", &self.cell.get().is_some())
            .finish()
    }
}

/// Builds a rule that refers to itself. `f` receives a reference to the rule being defined.
///
/// The reference does not own the definition. Keep the returned rule alive for as long as any
/// rule built from the reference is used on its own.
///
/// # Examples
///
/// ```
/// # use spindle::{character, recursive};
/// // list = "a" list | "a"
/// let list = recursive("list", |list| {
///     character('a')
///         .then(list)
///         .map(|(_, n): (char, usize)| n + 1)
///         .or(character('a').to(1))
/// });
///
/// assert_eq!(list.run("aaaa").unwrap().into_value(), 4);
/// ```
pub fn recursive<T, F>(name: impl Into<String>, f: F) -> Rule<T>
where
    T: 'static,
    F: FnOnce(Rule<T>) -> Rule<T>,
{
    let reference = Ref::declare(name);
    let body = f(reference.rule());
    reference.define(body)
}

/// Runs `rule` at the start of `input` in a fresh session.
pub fn run<T: 'static>(rule: &Rule<T>, input: &str) -> ParseResult<T> {
    rule.run(input)
}

/// Runs `rule` at the start of `input` in a fresh session configured by `config`.
pub fn run_with<T: 'static>(rule: &Rule<T>, input: &str, config: &Config) -> ParseResult<T> {
    rule.run_with(input, config)
}
