//! Arithmetic over previously emitted column groups.
//!
//! A formula may only contain `A`, `B`, `C`, decimal numbers, parentheses,
//! whitespace and `+ - * /`. It is parsed into an [`Expr`] and evaluated
//! numerically; nothing is ever handed to a general interpreter.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ABC0-9+\-*/().\s]+$").expect("formula grammar pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("formula `{0}` contains characters other than A, B, C, digits, parentheses and + - * /")]
    Grammar(String),
    #[error("invalid number `{0}`")]
    Number(String),
    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of formula")]
    UnexpectedEnd,
}

/// Column group referenced by a letter: `A` is the first emitted group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
    C,
}

impl Operand {
    pub fn index(self) -> usize {
        match self {
            Operand::A => 0,
            Operand::B => 1,
            Operand::C => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Operand(Operand),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// `None` on division by zero.
    pub fn eval(&self, operands: &[f64; 3]) -> Option<f64> {
        match self {
            Expr::Number(v) => Some(*v),
            Expr::Operand(op) => Some(operands[op.index()]),
            Expr::Neg(inner) => inner.eval(operands).map(|v| -v),
            Expr::Binary(op, lhs, rhs) => {
                let l = lhs.eval(operands)?;
                let r = rhs.eval(operands)?;
                match op {
                    BinaryOp::Add => Some(l + r),
                    BinaryOp::Sub => Some(l - r),
                    BinaryOp::Mul => Some(l * r),
                    BinaryOp::Div if r == 0.0 => None,
                    BinaryOp::Div => Some(l / r),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Operand(Operand),
    Op(BinaryOp),
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            'A' => Token::Operand(Operand::A),
            'B' => Token::Operand(Operand::B),
            'C' => Token::Operand(Operand::C),
            '+' => Token::Op(BinaryOp::Add),
            '-' => Token::Op(BinaryOp::Sub),
            '*' => Token::Op(BinaryOp::Mul),
            '/' => Token::Op(BinaryOp::Div),
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = offset + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !(next.is_ascii_digit() || next == '.') {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let literal = &source[offset..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::Number(literal.to_string()))?;
                Token::Number(value)
            }
            other => {
                return Err(FormulaError::UnexpectedToken {
                    found: other.to_string(),
                    offset,
                });
            }
        };
        tokens.push((offset, token));
    }
    Ok(tokens)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(_, t)| t)
    }

    fn unexpected(&self) -> FormulaError {
        match self.tokens.get(self.pos) {
            Some(&(offset, _)) => FormulaError::UnexpectedToken {
                found: self.source[offset..].chars().take(1).collect(),
                offset,
            },
            None => FormulaError::UnexpectedEnd,
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.factor()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // factor := ('+' | '-') factor | number | operand | '(' expr ')'
    fn factor(&mut self) -> Result<Expr, FormulaError> {
        let token = self.peek().ok_or(FormulaError::UnexpectedEnd)?;
        match token {
            Token::Op(BinaryOp::Sub) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.factor()?)))
            }
            Token::Op(BinaryOp::Add) => {
                self.pos += 1;
                self.factor()
            }
            Token::Number(v) => {
                self.pos += 1;
                Ok(Expr::Number(v))
            }
            Token::Operand(op) => {
                self.pos += 1;
                Ok(Expr::Operand(op))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(Token::RParen) {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(inner)
            }
            Token::Op(_) | Token::RParen => Err(self.unexpected()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        if source.trim().is_empty() {
            return Err(FormulaError::Empty);
        }
        if !GRAMMAR.is_match(source) {
            return Err(FormulaError::Grammar(source.to_string()));
        }

        let mut parser = Parser {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        };
        let expr = parser.expr()?;
        if parser.pos < parser.tokens.len() {
            return Err(parser.unexpected());
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Missing operands count as 0. Division by zero and non-finite results
    /// give `None`.
    pub fn evaluate(&self, operands: &[Option<f64>]) -> Option<f64> {
        let mut values = [0.0; 3];
        for (slot, value) in values.iter_mut().zip(operands) {
            *slot = value.unwrap_or(0.0);
        }
        self.expr.eval(&values).filter(|v| v.is_finite())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/formula.rs"]
mod tests;
