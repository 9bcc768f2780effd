//! Arithmetic expressions over named variables.
//!
//! Grammar: `+ -`, then `* /`, then right-associative `^`, with
//! parentheses. Numbers lex as `[0-9.]+`, identifiers as
//! `[A-Za-z_][A-Za-z0-9_]*`, whitespace is insignificant, and any other
//! character fails the parse.
//!
//! The public evaluation API never fails. Anything that prevents producing
//! a finite number — a malformed input, a missing variable, division by
//! zero — collapses to `None`, the "unresolved" outcome. Constraint
//! residuals treat an unresolved target as zero, which is what keeps a
//! partially specified system solvable while the user is still typing.

mod parser;

use std::str::FromStr;

use indexmap::IndexMap;
use winnow::Parser;

/// Values bound to variable names during evaluation.
pub type Bindings = IndexMap<String, f64>;

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

/// Why an expression string failed to parse.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// Bad token, unbalanced parenthesis, or trailing garbage.
    #[error("invalid expression: {0}")]
    Invalid(String),
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::expression
            .parse(s)
            .map_err(|e| ParseError::Invalid(e.to_string()))
    }
}

impl Expr {
    /// Evaluate against `vars`. `None` is the unresolved outcome: a
    /// referenced variable is absent, a division by exactly zero occurred,
    /// or the result is not finite.
    pub fn evaluate(&self, vars: &Bindings) -> Option<f64> {
        let value = match self {
            Expr::Num(n) => *n,
            Expr::Var(name) => *vars.get(name)?,
            Expr::Add(a, b) => a.evaluate(vars)? + b.evaluate(vars)?,
            Expr::Sub(a, b) => a.evaluate(vars)? - b.evaluate(vars)?,
            Expr::Mul(a, b) => a.evaluate(vars)? * b.evaluate(vars)?,
            Expr::Div(a, b) => {
                let divisor = b.evaluate(vars)?;
                if divisor == 0.0 {
                    return None;
                }
                a.evaluate(vars)? / divisor
            }
            Expr::Pow(a, b) => libm::pow(a.evaluate(vars)?, b.evaluate(vars)?),
        };
        value.is_finite().then_some(value)
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(name) => out.push(name.clone()),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
        }
    }
}

/// True iff `input` parses to end of input.
pub fn validate(input: &str) -> bool {
    Expr::from_str(input).is_ok()
}

/// Evaluate `input` against `vars`. A plain numeric literal evaluates to
/// itself; `None` is the unresolved outcome (see module docs).
pub fn evaluate(input: &str, vars: &Bindings) -> Option<f64> {
    Expr::from_str(input).ok()?.evaluate(vars)
}

/// Variable names referenced by `input`, in order of appearance with
/// duplicates preserved. Empty if the input does not parse.
pub fn variable_names(input: &str) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(expr) = Expr::from_str(input) {
        expr.collect_variables(&mut names);
    }
    names
}
