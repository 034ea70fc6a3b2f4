//! Restricted replacement expressions for `eval`-type custom rules.
//!
//! User-authored replacements are not arbitrary code; they are parsed into a
//! small expression tree over the regex match and evaluated per occurrence:
//!
//! ```text
//! expr    := term ('+' term)*
//! term    := literal | '$' digits | func '(' expr ')' | 'group(' digits ')'
//! func    := 'upper' | 'lower' | 'trim'
//! literal := '...' | "..."
//! ```
//!
//! `upper('[' + $1 + ']')` turns each first capture into an upper-cased,
//! bracketed copy. Failures are ordinary errors the executor isolates.

use regex::Captures;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
  #[error("unexpected end of expression")]
  UnexpectedEnd,
  #[error("unexpected character {0:?} at offset {1}")]
  UnexpectedChar(char, usize),
  #[error("unterminated string literal")]
  UnterminatedLiteral,
  #[error("unknown function {0:?}")]
  UnknownFunction(String),
  #[error("no capture group {0} in match")]
  UnknownGroup(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Literal(String),
  Group(usize),
  Upper(Box<Expr>),
  Lower(Box<Expr>),
  Trim(Box<Expr>),
  Concat(Vec<Expr>),
}

impl Expr {
  pub fn parse(input: &str) -> Result<Self, ExprError> {
    let mut parser = Parser::new(input);
    let expr = parser.expr()?;
    parser.skip_whitespace();
    match parser.peek() {
      None => Ok(expr),
      Some((pos, c)) => Err(ExprError::UnexpectedChar(c, pos)),
    }
  }

  /// Evaluate against one match. Group references beyond the pattern's
  /// capture count are an error; groups that simply did not participate in
  /// the match evaluate to the empty string.
  pub fn eval(&self, caps: &Captures) -> Result<String, ExprError> {
    match self {
      Self::Literal(text) => Ok(text.clone()),
      Self::Group(index) => {
        if *index >= caps.len() {
          return Err(ExprError::UnknownGroup(*index));
        }
        Ok(caps.get(*index).map_or_else(String::new, |m| m.as_str().to_owned()))
      },
      Self::Upper(inner) => Ok(inner.eval(caps)?.to_uppercase()),
      Self::Lower(inner) => Ok(inner.eval(caps)?.to_lowercase()),
      Self::Trim(inner) => Ok(inner.eval(caps)?.trim().to_owned()),
      Self::Concat(parts) => parts.iter().map(|part| part.eval(caps)).collect(),
    }
  }
}

struct Parser<'a> {
  chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
  fn new(input: &'a str) -> Self {
    Self {
      chars: input.char_indices().peekable(),
    }
  }

  fn peek(&mut self) -> Option<(usize, char)> {
    self.chars.peek().copied()
  }

  fn skip_whitespace(&mut self) {
    while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
      self.chars.next();
    }
  }

  fn expect(&mut self, wanted: char) -> Result<(), ExprError> {
    self.skip_whitespace();
    match self.chars.next() {
      Some((_, c)) if c == wanted => Ok(()),
      Some((pos, c)) => Err(ExprError::UnexpectedChar(c, pos)),
      None => Err(ExprError::UnexpectedEnd),
    }
  }

  fn expr(&mut self) -> Result<Expr, ExprError> {
    let mut parts = vec![self.term()?];
    loop {
      self.skip_whitespace();
      match self.peek() {
        Some((_, '+')) => {
          self.chars.next();
          parts.push(self.term()?);
        },
        _ => break,
      }
    }
    if parts.len() == 1 {
      Ok(parts.remove(0))
    } else {
      Ok(Expr::Concat(parts))
    }
  }

  fn term(&mut self) -> Result<Expr, ExprError> {
    self.skip_whitespace();
    match self.peek() {
      None => Err(ExprError::UnexpectedEnd),
      Some((_, quote @ ('\'' | '"'))) => {
        self.chars.next();
        self.literal(quote)
      },
      Some((_, '$')) => {
        self.chars.next();
        self.group_index().map(Expr::Group)
      },
      Some((_, c)) if c.is_ascii_alphabetic() => self.call(),
      Some((pos, c)) => Err(ExprError::UnexpectedChar(c, pos)),
    }
  }

  fn literal(&mut self, quote: char) -> Result<Expr, ExprError> {
    let mut text = String::new();
    for (_, c) in self.chars.by_ref() {
      if c == quote {
        return Ok(Expr::Literal(text));
      }
      text.push(c);
    }
    Err(ExprError::UnterminatedLiteral)
  }

  fn group_index(&mut self) -> Result<usize, ExprError> {
    let mut digits = String::new();
    while let Some((_, c)) = self.peek() {
      if !c.is_ascii_digit() {
        break;
      }
      digits.push(c);
      self.chars.next();
    }
    match (digits.is_empty(), self.peek()) {
      (false, _) => digits.parse().map_err(|_| ExprError::UnexpectedEnd),
      (true, Some((pos, c))) => Err(ExprError::UnexpectedChar(c, pos)),
      (true, None) => Err(ExprError::UnexpectedEnd),
    }
  }

  fn call(&mut self) -> Result<Expr, ExprError> {
    let mut name = String::new();
    while matches!(self.peek(), Some((_, c)) if c.is_ascii_alphanumeric() || c == '_') {
      if let Some((_, c)) = self.chars.next() {
        name.push(c);
      }
    }

    self.expect('(')?;
    if name == "group" {
      self.skip_whitespace();
      let index = self.group_index()?;
      self.expect(')')?;
      return Ok(Expr::Group(index));
    }

    let inner = Box::new(self.expr()?);
    self.expect(')')?;
    match name.as_str() {
      "upper" => Ok(Expr::Upper(inner)),
      "lower" => Ok(Expr::Lower(inner)),
      "trim" => Ok(Expr::Trim(inner)),
      _ => Err(ExprError::UnknownFunction(name)),
    }
  }
}
