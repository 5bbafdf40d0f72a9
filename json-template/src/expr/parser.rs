//! Recursive descent parser for default-value expressions

use super::ast::*;
use crate::value::Value;

/// Deepest allowed nesting of parentheses, ternaries and unary operators
const MAX_DEPTH: usize = 64;

/// Most binary operators allowed in one expression
const MAX_OPERATORS: usize = 1024;

/// Parse error with position information
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    pub context: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse an expression string into an AST
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}

/// Token types for the expression lexer
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Ident(String),
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Question,
    Colon,
    DoubleQuestion, // ??
    AndAnd,
    OrOr,
    Bang,
    Dot,
    LBracket,
    RBracket,
    LParen,
    RParen,

    // End of input
    Eof,
}

/// Lexer for expression tokens
struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn current_pos(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
    }

    fn error(&self, message: impl Into<String>, pos: usize) -> ParseError {
        ParseError {
            message: message.into(),
            position: pos,
            context: self.input[pos..].chars().take(10).collect(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    /// Consume the next char if it equals `expected`
    fn eat(&mut self, expected: char) -> bool {
        if let Some(&(_, c)) = self.chars.peek() {
            if c == expected {
                self.chars.next();
                return true;
            }
        }
        false
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let Some(&(pos, ch)) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        // Single-char tokens
        let single = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            '.' => Some(Token::Dot),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ':' => Some(Token::Colon),
            _ => None,
        };
        if let Some(token) = single {
            self.chars.next();
            return Ok(token);
        }

        // Two-char tokens
        match ch {
            '?' => {
                self.chars.next();
                return Ok(if self.eat('?') {
                    Token::DoubleQuestion
                } else {
                    Token::Question
                });
            }
            '=' => {
                self.chars.next();
                if self.eat('=') {
                    return Ok(Token::Eq);
                }
                return Err(self.error("expected '==' for equality comparison", pos));
            }
            '!' => {
                self.chars.next();
                return Ok(if self.eat('=') { Token::Ne } else { Token::Bang });
            }
            '<' => {
                self.chars.next();
                return Ok(if self.eat('=') { Token::Le } else { Token::Lt });
            }
            '>' => {
                self.chars.next();
                return Ok(if self.eat('=') { Token::Ge } else { Token::Gt });
            }
            '&' => {
                self.chars.next();
                if self.eat('&') {
                    return Ok(Token::AndAnd);
                }
                return Err(self.error("expected '&&'", pos));
            }
            '|' => {
                self.chars.next();
                if self.eat('|') {
                    return Ok(Token::OrOr);
                }
                return Err(self.error("expected '||'", pos));
            }
            _ => {}
        }

        // String literal
        if ch == '\'' || ch == '"' {
            let quote = ch;
            self.chars.next(); // consume opening quote
            let mut s = String::new();
            loop {
                match self.chars.next() {
                    Some((_, c)) if c == quote => break,
                    Some((_, '\\')) => match self.chars.next() {
                        Some((_, 'n')) => s.push('\n'),
                        Some((_, 't')) => s.push('\t'),
                        Some((_, c)) => s.push(c),
                        None => return Err(self.error("unclosed string literal", pos)),
                    },
                    Some((_, c)) => s.push(c),
                    None => return Err(self.error("unclosed string literal", pos)),
                }
            }
            return Ok(Token::String(s));
        }

        // Number
        if ch.is_ascii_digit() {
            let start = pos;
            let mut has_dot = false;

            while let Some(&(i, c)) = self.chars.peek() {
                if c.is_ascii_digit() {
                    self.chars.next();
                } else if c == '.' && !has_dot {
                    // Look ahead to see if this is a decimal point or path separator
                    let next = self.input[i + 1..].chars().next();
                    if next.is_some_and(|c| c.is_ascii_digit()) {
                        has_dot = true;
                        self.chars.next();
                    } else {
                        break;
                    }
                } else {
                    break;
                }
            }

            let end = self.current_pos();
            let num_str = &self.input[start..end];

            return if has_dot {
                num_str
                    .parse::<f64>()
                    .map(Token::Float)
                    .map_err(|_| self.error(format!("invalid float: {}", num_str), start))
            } else {
                num_str
                    .parse::<i64>()
                    .map(Token::Int)
                    .map_err(|_| self.error(format!("invalid integer: {}", num_str), start))
            };
        }

        // Identifier or keyword
        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let start = pos;
            while let Some(&(_, c)) = self.chars.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    self.chars.next();
                } else {
                    break;
                }
            }
            let end = self.current_pos();
            let ident = &self.input[start..end];

            return Ok(match ident {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                "null" => Token::Null,
                _ => Token::Ident(ident.to_string()),
            });
        }

        Err(self.error(format!("unexpected character: '{}'", ch), pos))
    }
}

/// Expression parser
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
    operators: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
            operators: 0,
        })
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Count a binary operator; long chains nest the tree on the left
    fn count_operator(&mut self) -> Result<(), ParseError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(self.error("expression has too many operators"));
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&mut self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.lexer.current_pos(),
            context: String::new(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current == expected {
            self.advance()
        } else {
            let message = format!("expected {:?}, found {:?}", expected, self.current);
            Err(self.error(message))
        }
    }

    /// Parse the full expression
    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_ternary()?;

        if self.current != Token::Eof {
            let message = format!("unexpected token after expression: {:?}", self.current);
            return Err(self.error(message));
        }

        Ok(expr)
    }

    /// ternary = or ("?" ternary ":" ternary)?
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_ternary_inner)
    }

    fn parse_ternary_inner(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;

        if self.current == Token::Question {
            self.advance()?;
            let then_expr = self.parse_ternary()?; // Right-associative
            self.expect(Token::Colon)?;
            let else_expr = self.parse_ternary()?;

            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }

        Ok(condition)
    }

    /// or = and ("||" and)*
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.current == Token::OrOr {
            self.advance()?;
            let right = self.parse_and()?;
            self.count_operator()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// and = coalesce ("&&" coalesce)*
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_coalesce()?;
        while self.current == Token::AndAnd {
            self.advance()?;
            let right = self.parse_coalesce()?;
            self.count_operator()?;
            left = Expr::Logical {
                left: Box::new(left),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// coalesce = comparison ("??" comparison)*
    fn parse_coalesce(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_comparison()?;

        if self.current == Token::DoubleQuestion {
            let mut exprs = vec![expr];
            while self.current == Token::DoubleQuestion {
                self.advance()?;
                exprs.push(self.parse_comparison()?);
                self.count_operator()?;
            }
            expr = Expr::Coalesce { exprs };
        }

        Ok(expr)
    }

    /// comparison = math (("==" | "!=" | "<" | "<=" | ">" | ">=") math)?
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_math()?;

        let op = match &self.current {
            Token::Eq => Some(CompareOp::Eq),
            Token::Ne => Some(CompareOp::Ne),
            Token::Lt => Some(CompareOp::Lt),
            Token::Le => Some(CompareOp::Le),
            Token::Gt => Some(CompareOp::Gt),
            Token::Ge => Some(CompareOp::Ge),
            _ => None,
        };

        if let Some(op) = op {
            self.advance()?;
            let right = self.parse_math()?;
            return Ok(Expr::Compare {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    /// math = term (("+"|"-") term)*
    fn parse_math(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;

        loop {
            let op = match &self.current {
                Token::Plus => MathOp::Add,
                Token::Minus => MathOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_term()?;
            self.count_operator()?;
            left = Expr::Math {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// term = unary (("*"|"/"|"%") unary)*
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current {
                Token::Star => MathOp::Mul,
                Token::Slash => MathOp::Div,
                Token::Percent => MathOp::Rem,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary()?;
            self.count_operator()?;
            left = Expr::Math {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// unary = ("-" | "!") unary | primary
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current {
            Token::Minus => {
                self.advance()?;
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::Negate(Box::new(operand)))
            }
            Token::Bang => {
                self.advance()?;
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::Not(Box::new(operand)))
            }
            _ => self.parse_primary(),
        }
    }

    /// primary = "(" ternary ")" | path | number | string | boolean | null
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let constant = match &self.current {
            Token::Int(n) => Some(Value::from(*n)),
            Token::Float(n) => Some(Value::from(*n)),
            Token::String(s) => Some(Value::String(s.clone())),
            Token::Bool(b) => Some(Value::Bool(*b)),
            Token::Null => Some(Value::Null),
            _ => None,
        };
        if let Some(value) = constant {
            self.advance()?;
            return Ok(Expr::Constant(value));
        }

        match &self.current {
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_ternary()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::Ident(name) => {
                let segments = vec![name.clone()];
                self.advance()?;
                self.parse_path(segments)
            }
            _ => {
                let message = format!("unexpected token: {:?}", self.current);
                Err(self.error(message))
            }
        }
    }

    /// path = ident ("." (ident | int) | "[" (int | string) "]")*
    fn parse_path(&mut self, mut segments: Vec<String>) -> Result<Expr, ParseError> {
        loop {
            match self.current {
                Token::Dot => {
                    self.advance()?;
                    let segment = match &self.current {
                        Token::Ident(name) => name.clone(),
                        Token::Int(n) => n.to_string(),
                        _ => return Err(self.error("expected field name after '.'")),
                    };
                    self.advance()?;
                    segments.push(segment);
                }
                Token::LBracket => {
                    self.advance()?;
                    let segment = match &self.current {
                        Token::Int(n) => n.to_string(),
                        Token::String(s) => s.clone(),
                        _ => return Err(self.error("expected index or quoted key after '['")),
                    };
                    self.advance()?;
                    self.expect(Token::RBracket)?;
                    segments.push(segment);
                }
                _ => return Ok(Expr::Path(segments)),
            }
        }
    }
}
