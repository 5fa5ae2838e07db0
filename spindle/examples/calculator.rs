extern crate spindle;

use std::io::{self, BufRead, Write};

use spindle::{
    character, end_of_input, island, memoize, one_of, pattern, recursive, Ref, Rule,
};

fn skip() -> Rule<String> {
    pattern("[ \t]*").unwrap()
}

fn token<T: 'static>(rule: Rule<T>) -> Rule<T> {
    rule.then_ignore(skip())
}

fn apply(((left, op), right): ((f64, char), f64)) -> f64 {
    match op {
        '+' => left + right,
        '-' => left - right,
        '*' => left * right,
        '/' => left / right,
        _ => left.powf(right),
    }
}

/// sum     = sum ("+" | "-") product | product
/// product = product ("*" | "/") power | power
/// power   = primary "^" power | primary
/// primary = number | "(" sum ")"
fn calculator() -> Rule<f64> {
    let sum: Ref<f64> = Ref::declare("sum");

    let number = token(pattern(r"[0-9]+(\.[0-9]+)?").unwrap())
        .map(|text| text.parse::<f64>().unwrap())
        .label("number");
    let primary = number.or(island(
        token(character('(')),
        sum.rule(),
        token(character(')')),
    ));
    let power = recursive("power", |power| {
        primary
            .clone()
            .then(token(character('^')))
            .then(power)
            .map(apply)
            .or(primary)
    });
    let product = recursive("product", |product| {
        memoize(
            product
                .then(token(one_of("*/")))
                .then(power.clone())
                .map(apply)
                .or(power),
        )
    });
    let left = sum.rule();
    let sum = sum.define(memoize(
        left.then(token(one_of("+-")))
            .then(product.clone())
            .map(apply)
            .or(product),
    ));

    skip().ignore_then(sum).then_ignore(end_of_input())
}

fn main() {
    tracing_subscriber::fmt::init();

    let calculator = calculator();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap() == 0 {
            break;
        }

        match calculator.parse(line.trim_end()) {
            Ok(value) => println!("{}", value),
            Err(e) => println!("\n{}\n", e),
        };
    }
}
