use winnow::{
    Result as WResult,
    ascii::space0,
    combinator::{alt, delimited, opt, preceded},
    prelude::*,
    token::{one_of, take_while},
};

use super::Expr;

/// A whole expression, including trailing whitespace. Callers use
/// [`Parser::parse`] on this, which also demands end-of-input.
pub(super) fn expression(i: &mut &str) -> WResult<Expr> {
    let expr = add.parse_next(i)?;
    let _ = space0.parse_next(i)?;
    Ok(expr)
}

fn add(i: &mut &str) -> WResult<Expr> {
    let mut lhs = mul.parse_next(i)?;
    while let Some(op) = opt(preceded(space0, one_of(['+', '-']))).parse_next(i)? {
        let rhs = mul.parse_next(i)?;
        lhs = match op {
            '+' => Expr::Add(Box::new(lhs), Box::new(rhs)),
            _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
        };
    }
    Ok(lhs)
}

fn mul(i: &mut &str) -> WResult<Expr> {
    let mut lhs = pow.parse_next(i)?;
    while let Some(op) = opt(preceded(space0, one_of(['*', '/']))).parse_next(i)? {
        let rhs = pow.parse_next(i)?;
        lhs = match op {
            '*' => Expr::Mul(Box::new(lhs), Box::new(rhs)),
            _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
        };
    }
    Ok(lhs)
}

// Exponentiation binds tightest and associates to the right: 2^3^2 is
// 2^(3^2).
fn pow(i: &mut &str) -> WResult<Expr> {
    let base = prim.parse_next(i)?;
    if opt(preceded(space0, '^')).parse_next(i)?.is_some() {
        let exponent = pow.parse_next(i)?;
        return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
    }
    Ok(base)
}

fn prim(i: &mut &str) -> WResult<Expr> {
    let _ = space0.parse_next(i)?;
    alt((number, identifier, parens)).parse_next(i)
}

fn parens(i: &mut &str) -> WResult<Expr> {
    delimited('(', add, (space0, ')')).parse_next(i)
}

/// Numbers lex as `[0-9.]+`; whatever `f64` then rejects (a lone `.`,
/// `1.2.3`) fails the parse.
fn number(i: &mut &str) -> WResult<Expr> {
    take_while(1.., |c: char| c.is_ascii_digit() || c == '.')
        .verify_map(|s: &str| s.parse::<f64>().ok())
        .map(Expr::Num)
        .parse_next(i)
}

fn identifier(i: &mut &str) -> WResult<Expr> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(|s: &str| Expr::Var(s.to_owned()))
        .parse_next(i)
}
