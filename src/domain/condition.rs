//! Closed boolean expression language for rule conditions.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! or         := and ("or" and)*
//! and        := not ("and" not)*
//! not        := "not" not | comparison
//! comparison := primary (op primary)*        op: = == != ≠ < <= ≤ > >= ≥
//! primary    := number | string | true | false | "(" or ")"
//! ```
//!
//! Comparisons chain: `1 < 2 < 3` holds only if every adjacent pair holds.
//! Identifiers, arithmetic and calls are rejected.

use std::cmp::Ordering;
use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "'{s}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::NotEq => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::LtE => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::GtE => ordering != Ordering::Less,
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::NotEq)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOp, Expr)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Value(Value),
    Op(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Lexeme>, String> {
    let mut lexemes = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                lexemes.push(Lexeme::LParen);
            }
            ')' => {
                chars.next();
                lexemes.push(Lexeme::RParen);
            }
            '≠' => {
                chars.next();
                lexemes.push(Lexeme::Op(CompareOp::NotEq));
            }
            '≤' => {
                chars.next();
                lexemes.push(Lexeme::Op(CompareOp::LtE));
            }
            '≥' => {
                chars.next();
                lexemes.push(Lexeme::Op(CompareOp::GtE));
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
                if followed_by_eq {
                    chars.next();
                }
                let op = match (c, followed_by_eq) {
                    ('=', _) => CompareOp::Eq,
                    ('!', true) => CompareOp::NotEq,
                    ('<', false) => CompareOp::Lt,
                    ('<', true) => CompareOp::LtE,
                    ('>', false) => CompareOp::Gt,
                    ('>', true) => CompareOp::GtE,
                    _ => return Err(format!("unsupported operator '!' at offset {start}")),
                };
                lexemes.push(Lexeme::Op(op));
            }
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                text.push(escaped);
                            }
                        }
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => text.push(ch),
                    }
                }
                if !closed {
                    return Err(format!("unterminated string starting at offset {start}"));
                }
                lexemes.push(Lexeme::Value(Value::Str(text)));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut literal = String::new();
                literal.push(c);
                chars.next();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' || ch == '_' {
                        literal.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                lexemes.push(Lexeme::Value(parse_number(&literal)?));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        word.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let lexeme = match word.as_str() {
                    "and" => Lexeme::And,
                    "or" => Lexeme::Or,
                    "not" => Lexeme::Not,
                    "true" | "True" => Lexeme::Value(Value::Bool(true)),
                    "false" | "False" => Lexeme::Value(Value::Bool(false)),
                    other => return Err(format!("unsupported name '{other}'")),
                };
                lexemes.push(lexeme);
            }
            other => return Err(format!("unexpected character '{other}' at offset {start}")),
        }
    }

    Ok(lexemes)
}

fn parse_number(literal: &str) -> Result<Value, String> {
    let cleaned = literal.replace('_', "");
    if cleaned.contains('.') {
        cleaned
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("invalid number '{literal}'"))
    } else {
        cleaned
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("invalid number '{literal}'"))
    }
}

struct Parser {
    lexemes: Vec<Lexeme>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.cursor)
    }

    fn consume(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.cursor).cloned();
        if lexeme.is_some() {
            self.cursor += 1;
        }
        lexeme
    }

    fn parse(mut self) -> Result<Expr, String> {
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(t) => Err(format!("unexpected {t:?} after expression")),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut operands = vec![self.parse_and()?];
        while let Some(Lexeme::Or) = self.peek() {
            self.consume();
            operands.push(self.parse_and()?);
        }
        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Expr::Or(operands)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut operands = vec![self.parse_not()?];
        while let Some(Lexeme::And) = self.peek() {
            self.consume();
            operands.push(self.parse_not()?);
        }
        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Expr::And(operands)
        })
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if let Some(Lexeme::Not) = self.peek() {
            self.consume();
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let first = self.parse_primary()?;
        let mut rest = Vec::new();
        while let Some(&Lexeme::Op(op)) = self.peek() {
            self.consume();
            rest.push((op, self.parse_primary()?));
        }
        Ok(if rest.is_empty() {
            first
        } else {
            Expr::Compare {
                first: Box::new(first),
                rest,
            }
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.consume() {
            Some(Lexeme::Value(v)) => Ok(Expr::Literal(v)),
            Some(Lexeme::LParen) => {
                let expr = self.parse_or()?;
                match self.consume() {
                    Some(Lexeme::RParen) => Ok(expr),
                    Some(t) => Err(format!("expected ')', got {t:?}")),
                    None => Err("expected ')', got end of expression".to_string()),
                }
            }
            Some(t) => Err(format!("expected a literal, got {t:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// A parsed condition, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    pub fn parse(source: &str) -> DomainResult<Self> {
        let lexemes = tokenize(source).map_err(|e| DomainError::condition(source, e))?;
        let expr = Parser { lexemes, cursor: 0 }
            .parse()
            .map_err(|e| DomainError::condition(source, e))?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self) -> DomainResult<bool> {
        eval(&self.expr)
            .map(|v| v.is_truthy())
            .map_err(|e| DomainError::condition(&self.source, e))
    }
}

/// Parse and evaluate a condition in one step.
pub fn evaluate(source: &str) -> DomainResult<bool> {
    Condition::parse(source)?.evaluate()
}

fn eval(expr: &Expr) -> Result<Value, String> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner)?.is_truthy())),
        Expr::And(operands) => {
            let mut last = Value::Bool(true);
            for operand in operands {
                last = eval(operand)?;
                if !last.is_truthy() {
                    break;
                }
            }
            Ok(last)
        }
        Expr::Or(operands) => {
            let mut last = Value::Bool(false);
            for operand in operands {
                last = eval(operand)?;
                if last.is_truthy() {
                    break;
                }
            }
            Ok(last)
        }
        Expr::Compare { first, rest } => {
            let mut left = eval(first)?;
            for (op, operand) in rest {
                let right = eval(operand)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, String> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    match ordering {
        Some(ordering) => Ok(op.holds(ordering)),
        None if op.is_equality() => Ok(op == CompareOp::NotEq),
        None => Err(format!(
            "cannot order {} and {}",
            left.type_name(),
            right.type_name()
        )),
    }
}
