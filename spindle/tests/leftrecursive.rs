// spindle. Packrat parser combinators
// Copyright (c) The spindle developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

#[macro_use]
extern crate spindle;

use pretty_assertions::assert_eq;
use spindle::{
    char_matching, character, if_preceded_by, memoize, one_or_more, optional, pattern, recursive,
    separated_by, Ref, Rule, Scanner,
};

fn number() -> Rule<f64> {
    pattern(r"[0-9]+(\.[0-9]+)?")
        .unwrap()
        .map(|text| text.parse::<f64>().unwrap())
}

fn subtract(left: Rule<f64>) -> Rule<f64> {
    left.then_ignore(character('-'))
        .then(number())
        .map(|(left, right)| left - right)
}

/// difference = difference "-" number | number
fn direct() -> Rule<f64> {
    recursive("difference", |difference| {
        memoize(choice![subtract(difference), number()])
    })
}

/// difference = operand "-" number | number
/// operand    = difference
fn indirect() -> Rule<f64> {
    let difference: Ref<f64> = Ref::declare("difference");
    let operand = memoize(difference.rule()).label("operand");

    difference.define(memoize(choice![subtract(operand), number()]))
}

fn assert_fails_unmoved(rule: &Rule<f64>, input: &str) {
    let mut scanner = Scanner::new(input);

    assert!(rule.scan(&mut scanner).is_err());
    assert_eq!(scanner.position(), 0);
}

#[test]
fn direct_is_left_associative() {
    parses_to! {
        rule: direct(),
        input: "1-2-3",
        value: -4.0,
        consumed: 5
    };
}

#[test]
fn direct_stops_at_unknown_operator() {
    parses_to! {
        rule: direct(),
        input: "1+2-3",
        value: 1.0,
        consumed: 1
    };
}

#[test]
fn direct_without_number() {
    assert_fails_unmoved(&direct(), "a-b-c");
}

#[test]
fn indirect_is_left_associative() {
    parses_to! {
        rule: indirect(),
        input: "1-2-3",
        value: -4.0,
        consumed: 5
    };
}

#[test]
fn indirect_stops_at_unknown_operator() {
    parses_to! {
        rule: indirect(),
        input: "1+2-3",
        value: 1.0,
        consumed: 1
    };
}

#[test]
fn indirect_without_number() {
    assert_fails_unmoved(&indirect(), "a-b-c");
}

#[test]
fn indirect_through_its_intermediate() {
    // Entering the cycle through the delegating rule grows the same way.
    let difference: Ref<f64> = Ref::declare("difference");
    let operand = memoize(difference.rule());
    let _difference = difference.define(memoize(choice![subtract(operand.clone()), number()]));

    parses_to! {
        rule: operand,
        input: "10-2.5-0.5",
        value: 7.0,
        consumed: 10
    };
}

/// difference = difference "-" (?<= operator) number | number
fn guarded(operator: Rule<String>) -> Rule<f64> {
    recursive("difference", move |difference| {
        memoize(choice![
            difference
                .then_ignore(character('-'))
                .then(if_preceded_by(number(), operator))
                .map(|(left, right)| left - right),
            number(),
        ])
    })
}

#[test]
fn lookbehind_inside_growing_seed() {
    parses_to! {
        rule: guarded(pattern("[0-9]-").unwrap()),
        input: "1-2-3",
        value: -4.0,
        consumed: 5
    };
}

#[test]
fn memoized_lookbehind_inside_growing_seed() {
    // The condition is first tried at offset 0 while the seed there is growing.
    parses_to! {
        rule: guarded(memoize(pattern("[0-9]-").unwrap())),
        input: "1-2-3",
        value: -4.0,
        consumed: 5
    };
}

#[test]
fn decimals_and_trailing_operator() {
    let rule = direct();
    let m = rule.run("7.5-0.5-").unwrap();

    assert_eq!(m.length(), 7);
    assert_eq!(m.into_value(), 7.0);
}

#[test]
fn rules_are_reusable_across_sessions() {
    let rule = direct();

    assert_eq!(rule.parse("9-1").unwrap(), 8.0);
    assert_eq!(rule.parse("9-1-1-1").unwrap(), 6.0);
    assert!(rule.parse("9-").is_err());
}

#[derive(Clone, Debug, PartialEq)]
enum Expression {
    Variable(String),
    Symbol(String),
    Call(Box<Expression>, Vec<Expression>),
}

fn symbol() -> Rule<String> {
    one_or_more(char_matching("letter", |c| c.is_ascii_alphabetic())).recognize()
}

fn variable() -> Rule<Expression> {
    character('$')
        .ignore_then(symbol())
        .map(Expression::Variable)
}

/// expression    = variable | function_call
/// argument_list = "(" (expression ("," expression)*)? ")"
/// function_call = callable      argument_list
/// callable      = function_call | variable | symbol
fn expression() -> Rule<Expression> {
    let expression: Ref<Expression> = Ref::declare("expression");
    let function_call: Ref<Expression> = Ref::declare("function_call");

    let argument_list = character('(')
        .ignore_then(optional(separated_by(expression.rule(), character(','))))
        .then_ignore(character(')'))
        .map(Option::unwrap_or_default);
    let callable = memoize(choice![
        function_call.rule(),
        variable(),
        symbol().map(Expression::Symbol),
    ]);
    let function_call = function_call.define(memoize(
        callable
            .then(argument_list)
            .map(|(callee, arguments)| Expression::Call(Box::new(callee), arguments)),
    ));

    expression.define(choice![variable(), function_call])
}

fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::Call(Box::new(callee), arguments)
}

fn var(name: &str) -> Expression {
    Expression::Variable(name.to_owned())
}

fn sym(name: &str) -> Expression {
    Expression::Symbol(name.to_owned())
}

#[test]
fn variable_expression() {
    parses_to! {
        rule: expression(),
        input: "$variable",
        value: var("variable"),
        consumed: 9
    };
}

#[test]
fn function_call() {
    parses_to! {
        rule: expression(),
        input: "func($arga)",
        value: call(sym("func"), vec![var("arga")]),
        consumed: 11
    };
}

#[test]
fn function_call_arguments() {
    parses_to! {
        rule: expression(),
        input: "f($a,g($b))",
        value: call(sym("f"), vec![var("a"), call(sym("g"), vec![var("b")])]),
        consumed: 11
    };
}

#[test]
fn recursive_function_call() {
    parses_to! {
        rule: expression(),
        input: "func()($arga)",
        value: call(call(sym("func"), vec![]), vec![var("arga")]),
        consumed: 13
    };
}

#[test]
fn unclosed_call() {
    fails_with! {
        rule: expression(),
        input: "func($arga",
        offset: 10
    };
}
