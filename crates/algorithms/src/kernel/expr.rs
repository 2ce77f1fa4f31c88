//! Decay-expression parsing and evaluation
//!
//! Kernels are shaped by a small textual arithmetic language over exactly
//! three free variables: `x` (physical distance), `r` (radius) and `o`
//! (shape exponent). Hand-written lexer plus precedence-climbing parser;
//! expressions are parsed once into an AST and evaluated per kernel cell.
//!
//! Grammar (precedence low to high):
//!
//! 1. `+`, `-` — left associative
//! 2. `*`, `/` — left associative
//! 3. `^` / `**` — right associative
//! 4. unary `-`
//! 5. literals, variables, parentheses
//!
//! Unknown identifiers and malformed syntax fail at parse time with
//! [`Error::InvalidKernelExpression`]; evaluation itself cannot fail.

use proxfield_core::{Error, Result};

/// Default decay expression: linear falloff raised to the shape exponent.
pub const DEFAULT_DECAY_EXPR: &str = "1 - (x/r)^o";

/// The three free variables of a decay expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Var {
    /// Physical distance from the kernel center
    X,
    /// Kernel radius
    R,
    /// Shape exponent
    O,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Var(Var),
    Neg(Box<Node>),
    Bin(BinOp, Box<Node>, Box<Node>),
}

impl Node {
    fn eval(&self, x: f64, r: f64, o: f64) -> f64 {
        match self {
            Node::Num(v) => *v,
            Node::Var(Var::X) => x,
            Node::Var(Var::R) => r,
            Node::Var(Var::O) => o,
            Node::Neg(inner) => -inner.eval(x, r, o),
            Node::Bin(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(x, r, o), rhs.eval(x, r, o));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
        }
    }
}

/// A parsed decay expression in `x`, `r`, `o`.
///
/// Parse once with [`DecayExpr::parse`], then evaluate elementwise over the
/// distance grid. Evaluation never fails; out-of-range results are clipped
/// by the kernel builder.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayExpr {
    source: String,
    root: Node,
}

impl DecayExpr {
    /// Parse an expression, validating syntax and the symbol set.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = lex(source)?;
        let mut parser = Parser {
            source,
            tokens,
            pos: 0,
        };
        let root = parser.parse_expr(0)?;
        match parser.peek() {
            Token::Eof => Ok(Self {
                source: source.to_string(),
                root,
            }),
            tok => Err(parser.unexpected(tok)),
        }
    }

    /// The default expression `1 - (x/r)^o`.
    pub fn default_expr() -> Self {
        // The default is a constant of this crate and always parses.
        Self::parse(DEFAULT_DECAY_EXPR).expect("default decay expression parses")
    }

    /// Evaluate at distance `x`, radius `r` and shape exponent `o`.
    pub fn eval(&self, x: f64, r: f64, o: f64) -> f64 {
        self.root.eval(x, r, o)
    }

    /// The original textual form.
    pub fn source(&self) -> &str {
        &self.source
    }
}

// ─── Lexer ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Var(Var),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Eof,
}

fn lex(source: &str) -> Result<Vec<Token>> {
    let err = |reason: String| Error::InvalidKernelExpression {
        expr: source.to_string(),
        reason,
    };

    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                // `**` is accepted as an exponentiation alias
                if bytes.get(i + 1) == Some(&b'*') {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                // Exponent suffix (1e-3)
                if i < bytes.len() && matches!(bytes[i] as char, 'e' | 'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && matches!(bytes[j] as char, '+' | '-') {
                        j += 1;
                    }
                    if j < bytes.len() && (bytes[j] as char).is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text = &source[start..i];
                let value: f64 = text
                    .parse()
                    .map_err(|_| err(format!("invalid number `{}`", text)))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                let ident = &source[start..i];
                let var = match ident {
                    "x" => Var::X,
                    "r" => Var::R,
                    "o" => Var::O,
                    _ => {
                        return Err(err(format!(
                            "unknown symbol `{}` (allowed: x, r, o)",
                            ident
                        )))
                    }
                };
                tokens.push(Token::Var(var));
            }
            other => return Err(err(format!("unexpected character `{}`", other))),
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

// ─── Parser (precedence climbing) ───────────────────────────────────────

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, tok: Token) -> Error {
        let what = match tok {
            Token::Eof => "unexpected end of expression".to_string(),
            other => format!("unexpected token {:?}", other),
        };
        Error::InvalidKernelExpression {
            expr: self.source.to_string(),
            reason: what,
        }
    }

    /// Binding power of a binary operator, `None` for non-operators.
    fn binding_power(tok: Token) -> Option<(BinOp, u8, u8)> {
        // (op, left bp, right bp); right > left makes the operator
        // left-associative, the reverse makes `^` right-associative.
        match tok {
            Token::Plus => Some((BinOp::Add, 1, 2)),
            Token::Minus => Some((BinOp::Sub, 1, 2)),
            Token::Star => Some((BinOp::Mul, 3, 4)),
            Token::Slash => Some((BinOp::Div, 3, 4)),
            Token::Caret => Some((BinOp::Pow, 6, 5)),
            _ => None,
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Node> {
        let mut lhs = self.parse_prefix()?;

        while let Some((op, left_bp, right_bp)) = Self::binding_power(self.peek()) {
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(right_bp)?;
            lhs = Node::Bin(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Node> {
        match self.advance() {
            Token::Minus => {
                // Unary minus binds tighter than * and / but looser than ^,
                // so -x^2 parses as -(x^2).
                let operand = self.parse_expr(5)?;
                Ok(Node::Neg(Box::new(operand)))
            }
            Token::Num(v) => Ok(Node::Num(v)),
            Token::Var(var) => Ok(Node::Var(var)),
            Token::LParen => {
                let inner = self.parse_expr(0)?;
                match self.advance() {
                    Token::RParen => Ok(inner),
                    tok => Err(self.unexpected(tok)),
                }
            }
            tok => Err(self.unexpected(tok)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_expression() {
        let expr = DecayExpr::default_expr();
        // Center of the kernel: full weight.
        assert_relative_eq!(expr.eval(0.0, 20.0, 1.0), 1.0);
        // At the radius: zero.
        assert_relative_eq!(expr.eval(20.0, 20.0, 1.0), 0.0);
        // Halfway with o=1: linear.
        assert_relative_eq!(expr.eval(10.0, 20.0, 1.0), 0.5);
        // o=2 bends the falloff.
        assert_relative_eq!(expr.eval(10.0, 20.0, 2.0), 0.75);
    }

    #[test]
    fn test_python_style_exponent() {
        let a = DecayExpr::parse("1-(x/r)**o").unwrap();
        let b = DecayExpr::parse("1-(x/r)^o").unwrap();
        assert_relative_eq!(a.eval(7.0, 20.0, 2.0), b.eval(7.0, 20.0, 2.0));
    }

    #[test]
    fn test_precedence_and_associativity() {
        let expr = DecayExpr::parse("2 + 3 * 4").unwrap();
        assert_relative_eq!(expr.eval(0.0, 0.0, 0.0), 14.0);

        // Right-associative power: 2^3^2 = 2^9 = 512.
        let expr = DecayExpr::parse("2^3^2").unwrap();
        assert_relative_eq!(expr.eval(0.0, 0.0, 0.0), 512.0);

        // Left-associative subtraction: 10 - 4 - 3 = 3.
        let expr = DecayExpr::parse("10 - 4 - 3").unwrap();
        assert_relative_eq!(expr.eval(0.0, 0.0, 0.0), 3.0);
    }

    #[test]
    fn test_unary_minus() {
        let expr = DecayExpr::parse("-x^2").unwrap();
        assert_relative_eq!(expr.eval(3.0, 0.0, 0.0), -9.0);

        let expr = DecayExpr::parse("(-x)^2").unwrap();
        assert_relative_eq!(expr.eval(3.0, 0.0, 0.0), 9.0);
    }

    #[test]
    fn test_scientific_literals() {
        let expr = DecayExpr::parse("1e2 + 2.5e-1").unwrap();
        assert_relative_eq!(expr.eval(0.0, 0.0, 0.0), 100.25);
    }

    #[test]
    fn test_unknown_symbol_fails_at_parse() {
        let err = DecayExpr::parse("1 - (x/radius)^o").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKernelExpression { .. }
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        for bad in ["", "1 +", "(x", "x )", "x y", "1..2", "x $ r"] {
            assert!(
                DecayExpr::parse(bad).is_err(),
                "`{}` should fail to parse",
                bad
            );
        }
    }

    #[test]
    fn test_division_by_zero_evaluates() {
        // Evaluation never raises; IEEE semantics apply and the kernel
        // builder clips the result.
        let expr = DecayExpr::parse("x / r").unwrap();
        assert!(expr.eval(1.0, 0.0, 1.0).is_infinite());
    }
}
