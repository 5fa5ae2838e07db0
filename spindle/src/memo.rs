// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Packrat memoization with support for direct and indirect left recursion.
//!
//! Results of memoized rules are cached per `(rule, offset)` in the [`Scanner`]'s memo table.
//! Left recursion is resolved by growing a seed: the first time a memoized rule re-enters itself
//! at the same offset, the re-entrant call fails. If the outer call still matches, its result
//! becomes the seed handed to re-entrant calls on the next evaluation, and evaluation is repeated
//! for as long as the match keeps getting longer.
//!
//! When the recursion goes through other memoized rules (`A -> B -> A`), the outermost rule is
//! the *head* of the recursion and the rules in between are *involved* in it. Only the head
//! grows its seed; involved rules are re-evaluated on every growth iteration instead of being
//! served from the memo table.
//!
//! [`Scanner`]: ../struct.Scanner.html

use std::any::Any;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::result::{NoMatch, ParseResult};
use crate::rule::{Rule, RuleId};
use crate::scanner::Scanner;

/// Counters describing the use of a memo table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MemoStats {
    /// Lookups answered from the table
    pub hits: usize,
    /// Lookups that had to evaluate the rule
    pub misses: usize,
    /// Left-recursion growth iterations that extended a match
    pub growths: usize,
}

struct Entry {
    // A `ParseResult<T>` of the rule owning the entry.
    result: Box<dyn Any>,
    end: usize,
    // Set while the rule is being evaluated at this offset; `result` then holds its seed.
    in_progress: Option<usize>,
}

#[derive(Debug)]
struct Invocation {
    rule: RuleId,
    head: Option<usize>,
}

#[derive(Debug)]
struct Head {
    rule: RuleId,
    involved: HashSet<RuleId>,
    eval: HashSet<RuleId>,
}

/// Memo entries and left-recursion bookkeeping of one parse session.
#[derive(Default)]
pub(crate) struct MemoTable {
    entries: HashMap<(RuleId, usize), Entry>,
    invocations: Vec<Invocation>,
    // Indices into `invocations` of memoized rules currently being evaluated, innermost last.
    active: Vec<usize>,
    heads: Vec<Head>,
    // Heads currently growing, by offset.
    growing: HashMap<usize, usize>,
    stats: MemoStats,
}

impl MemoTable {
    pub(crate) fn stats(&self) -> MemoStats {
        self.stats
    }

    fn lookup<T: Clone + 'static>(
        &self,
        rule: RuleId,
        offset: usize,
    ) -> Option<(ParseResult<T>, usize, Option<usize>)> {
        self.entries.get(&(rule, offset)).map(|entry| {
            let result = entry
                .result
                .downcast_ref::<ParseResult<T>>()
                .unwrap_or_else(|| unreachable!("memo entries are keyed by their rule's id"))
                .clone();
            (result, entry.end, entry.in_progress)
        })
    }

    fn store<T: 'static>(
        &mut self,
        rule: RuleId,
        offset: usize,
        result: ParseResult<T>,
        end: usize,
        in_progress: Option<usize>,
    ) {
        self.entries.insert(
            (rule, offset),
            Entry {
                result: Box::new(result),
                end,
                in_progress,
            },
        );
    }

    fn begin(&mut self, rule: RuleId) -> usize {
        let invocation = self.invocations.len();
        self.invocations.push(Invocation { rule, head: None });
        self.active.push(invocation);
        invocation
    }

    fn finish(&mut self) {
        self.active.pop();
    }

    // A rule re-entered itself through `invocation`. Makes the rule the head of the recursion,
    // unless it already is, and marks every rule evaluated since as involved in it.
    //
    // Returns `false` if `invocation` has already finished, in which case the entry's seed is
    // simply its final result.
    fn setup_left_recursion(&mut self, invocation: usize) -> bool {
        if !self.active.contains(&invocation) {
            return false;
        }

        let head = match self.invocations[invocation].head {
            Some(head) => head,
            None => {
                let head = self.heads.len();
                self.heads.push(Head {
                    rule: self.invocations[invocation].rule,
                    involved: HashSet::new(),
                    eval: HashSet::new(),
                });
                self.invocations[invocation].head = Some(head);
                head
            }
        };

        for &active in self.active.iter().rev() {
            if self.invocations[active].head == Some(head) {
                break;
            }
            self.invocations[active].head = Some(head);
            let rule = self.invocations[active].rule;
            self.heads[head].involved.insert(rule);
        }

        true
    }

    fn growing_head(&self, offset: usize) -> Option<usize> {
        self.growing.get(&offset).copied()
    }

    // Whether `rule` is reached at an offset where a head is growing without taking part in its
    // recursion. Its result may depend on the head's current seed, so it is not kept.
    fn is_bystander(&self, rule: RuleId, offset: usize) -> bool {
        self.growing_head(offset).map_or(false, |head| {
            let head = &self.heads[head];
            head.rule != rule && !head.involved.contains(&rule)
        })
    }
}

/// Caches the results of `rule` per offset and resolves left recursion through it.
///
/// Every rule that takes part in left recursion must be memoized. Elsewhere memoization only
/// saves re-evaluating a rule at an offset it has already been tried at.
///
/// # Examples
///
/// ```
/// # use spindle::{character, memoize, pattern, recursive};
/// // expr = expr "-" num | num
/// let num = pattern("[0-9]+").unwrap().map(|n| n.parse::<i64>().unwrap());
/// let expr = recursive("expr", |expr| {
///     memoize(
///         expr.then_ignore(character('-'))
///             .then(num.clone())
///             .map(|(l, r)| l - r)
///             .or(num.clone()),
///     )
/// });
///
/// assert_eq!(expr.run("10-2-3").unwrap().into_value(), 5);
/// ```
pub fn memoize<T>(rule: Rule<T>) -> Rule<T>
where
    T: Clone + 'static,
{
    let id = RuleId::fresh();
    let name = rule.name().map(str::to_owned);

    Rule::from_parts(id, name.as_deref(), move |s| apply(id, &rule, s))
}

fn apply<T>(id: RuleId, body: &Rule<T>, s: &mut Scanner<'_>) -> ParseResult<T>
where
    T: Clone + 'static,
{
    let start = s.position();

    if let Some(result) = recall(id, body, s, start) {
        return result;
    }

    if s.memo.is_bystander(id, start) {
        let result = evaluate(id, body, s, start);
        s.memo.entries.remove(&(id, start));
        trace!(rule = %body.describe(), offset = start, "evaluated beside a growing seed");
        return result;
    }

    evaluate(id, body, s, start)
}

fn evaluate<T>(id: RuleId, body: &Rule<T>, s: &mut Scanner<'_>, start: usize) -> ParseResult<T>
where
    T: Clone + 'static,
{
    s.memo.stats.misses += 1;
    let invocation = s.memo.begin(id);
    s.memo
        .store::<T>(id, start, Err(NoMatch::silent(start)), start, Some(invocation));

    let result = body.scan(s);
    let end = s.position();
    s.memo.finish();

    let head = match s.memo.invocations[invocation].head {
        Some(head) => head,
        None => {
            s.memo.store(id, start, result.clone(), end, None);
            return result;
        }
    };

    if s.memo.heads[head].rule != id {
        // Involved in a recursion headed further out: the head re-evaluates this rule while
        // growing, so the entry stays a seed.
        s.memo
            .store(id, start, result.clone(), end, Some(invocation));
        return result;
    }

    s.memo.store(id, start, result.clone(), end, None);
    match result {
        Ok(_) => {
            debug!(rule = %body.describe(), offset = start, end, "left recursion detected");
            grow(id, body, s, start, head)
        }
        Err(_) => result,
    }
}

fn recall<T>(id: RuleId, body: &Rule<T>, s: &mut Scanner<'_>, start: usize) -> Option<ParseResult<T>>
where
    T: Clone + 'static,
{
    if let Some(head) = s.memo.growing_head(start) {
        if s.memo.heads[head].eval.remove(&id) {
            let result = body.scan(s);
            let end = s.position();
            s.memo.store(id, start, result.clone(), end, None);
            return Some(result);
        }
    }

    let (result, end, in_progress) = s.memo.lookup::<T>(id, start)?;
    s.memo.stats.hits += 1;

    if let Some(invocation) = in_progress {
        if s.memo.setup_left_recursion(invocation) {
            trace!(rule = %body.describe(), offset = start, "left-recursive call answered by seed");
        } else {
            s.memo.store(id, start, result.clone(), end, None);
        }
    } else {
        trace!(rule = %body.describe(), offset = start, "memo hit");
    }

    if result.is_ok() {
        s.jump(end);
    }
    Some(result)
}

fn grow<T>(id: RuleId, body: &Rule<T>, s: &mut Scanner<'_>, start: usize, head: usize) -> ParseResult<T>
where
    T: Clone + 'static,
{
    let previous = s.memo.growing.insert(start, head);

    loop {
        s.jump(start);
        s.memo.heads[head].eval = s.memo.heads[head].involved.clone();

        let result = body.scan(s);
        let end = s.position();
        let best = s
            .memo
            .entries
            .get(&(id, start))
            .map_or(start, |entry| entry.end);

        match result {
            Ok(_) if end > best => {
                s.memo.stats.growths += 1;
                debug!(rule = %body.describe(), offset = start, end, "seed grown");
                s.memo.store(id, start, result, end, None);
            }
            _ => {
                debug!(rule = %body.describe(), offset = start, end = best, "seed stopped growing");
                break;
            }
        }
    }

    match previous {
        Some(previous) => s.memo.growing.insert(start, previous),
        None => s.memo.growing.remove(&start),
    };

    let (result, end, _) = s
        .memo
        .lookup::<T>(id, start)
        .unwrap_or_else(|| unreachable!("the grown seed was stored before growing"));
    s.jump(if result.is_ok() { end } else { start });
    result
}
