//! Expression tokenization and parsing.
//!
//! Tokens are parsed by a recursive descent parser into an [`Expr`] tree.
//! Function calls are bound to their library entry while parsing, which is
//! where unknown names and arity mismatches are rejected.

use crate::config::{CompilerConfig, RegexLimits};
use crate::error::CompileError;
use crate::expr::Value;
use crate::functions::{FunctionLibrary, HelperFunction};
use regex::Regex;
use std::sync::Arc;

/// Tokens in an expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Identifier(String),
    True,
    False,
    LeftParen,
    RightParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    RegexMatch,
    RegexNotMatch,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Str(s) => format!("string {s:?}"),
            Token::Identifier(name) => format!("identifier '{name}'"),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Not => "'!'".to_string(),
            Token::And => "'&&'".to_string(),
            Token::Or => "'||'".to_string(),
            Token::Eq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::RegexMatch => "'=~'".to_string(),
            Token::RegexNotMatch => "'!~'".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// Right-hand side of `=~` / `!~`.
#[derive(Debug, Clone)]
pub(crate) enum RegexOperand {
    /// String literal, compiled together with the expression.
    Static(Regex),
    /// Computed at evaluation time and compiled on every evaluation.
    Dynamic(Box<Expr>, RegexLimits),
}

/// Regex argument of a pattern helper call.
#[derive(Debug, Clone)]
pub(crate) enum CallPattern {
    /// String literal, compiled together with the expression.
    Static(Regex),
    /// Compiled from the evaluated argument on every call.
    Dynamic(RegexLimits),
}

/// Compiled expression tree.
#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Literal(Value),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Match {
        negated: bool,
        subject: Box<Expr>,
        pattern: RegexOperand,
    },
    Call {
        function: Arc<HelperFunction>,
        args: Vec<Expr>,
        /// Set for pattern helpers only.
        pattern: Option<CallPattern>,
    },
}

/// Recursive descent parser for expressions.
pub(crate) struct ExpressionParser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    library: &'a FunctionLibrary,
    config: &'a CompilerConfig,
}

impl<'a> ExpressionParser<'a> {
    pub(crate) fn new(
        source: &'a str,
        tokens: &'a [Token],
        library: &'a FunctionLibrary,
        config: &'a CompilerConfig,
    ) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
            library,
            config,
        }
    }

    fn error(&self, reason: impl Into<String>) -> CompileError {
        invalid(self.source, reason)
    }

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.current_token().cloned();
        self.position += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), CompileError> {
        match self.current_token() {
            Some(token) if *token == expected => {
                self.advance();
                Ok(())
            }
            Some(token) => Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                token.describe()
            ))),
            None => Err(self.error(format!(
                "expected {}, found end of expression",
                expected.describe()
            ))),
        }
    }

    /// Run `parse` one nesting level deeper, enforcing the configured limit.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        self.depth += 1;
        if self.depth > self.config.max_expression_depth {
            return Err(self.error(format!(
                "expression nesting exceeds {} levels",
                self.config.max_expression_depth
            )));
        }
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse a full expression and require every token to be consumed.
    pub(crate) fn parse(&mut self) -> Result<Expr, CompileError> {
        let expr = self.parse_or_expression()?;
        match self.current_token() {
            None => Ok(expr),
            Some(token) => Err(self.error(format!("unexpected {}", token.describe()))),
        }
    }

    /// Parse OR expressions (lowest precedence).
    fn parse_or_expression(&mut self) -> Result<Expr, CompileError> {
        self.nested(|parser| {
            let mut left = parser.parse_and_expression()?;

            while let Some(Token::Or) = parser.current_token() {
                parser.advance();
                let right = parser.parse_and_expression()?;
                left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
            }

            Ok(left)
        })
    }

    fn parse_and_expression(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_comparison()?;

        while let Some(Token::And) = self.current_token() {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::LtEq) => BinaryOp::LtEq,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::GtEq) => BinaryOp::GtEq,
                Some(Token::RegexMatch) | Some(Token::RegexNotMatch) => {
                    let negated = matches!(self.advance(), Some(Token::RegexNotMatch));
                    let right = self.parse_additive()?;
                    left = Expr::Match {
                        negated,
                        subject: Box::new(left),
                        pattern: self.regex_operand(right)?,
                    };
                    continue;
                }
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn regex_operand(&self, expr: Expr) -> Result<RegexOperand, CompileError> {
        match expr {
            Expr::Literal(Value::String(pattern)) => {
                self.static_regex(&pattern).map(RegexOperand::Static)
            }
            other => Ok(RegexOperand::Dynamic(
                Box::new(other),
                self.config.regex_limits(),
            )),
        }
    }

    fn call_pattern(&self, arg: Option<&Expr>) -> Result<CallPattern, CompileError> {
        match arg {
            Some(Expr::Literal(Value::String(pattern))) => {
                self.static_regex(pattern).map(CallPattern::Static)
            }
            _ => Ok(CallPattern::Dynamic(self.config.regex_limits())),
        }
    }

    fn static_regex(&self, pattern: &str) -> Result<Regex, CompileError> {
        self.config
            .build_regex(pattern)
            .map_err(|e| self.error(format!("invalid regex literal {pattern:?}: {e}")))
    }

    fn parse_additive(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.current_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse unary expressions (highest precedence).
    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        let op = match self.current_token() {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Negate,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.nested(|parser| parser.parse_unary())?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(Value::Number(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
            Some(Token::LeftParen) => {
                let expr = self.parse_or_expression()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }
            Some(Token::Identifier(name)) => {
                if let Some(Token::LeftParen) = self.current_token() {
                    self.advance();
                    self.parse_call(name)
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(token) => Err(self.error(format!("unexpected {}", token.describe()))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    /// Parse call arguments after `name(` and bind the call to the library.
    fn parse_call(&mut self, name: String) -> Result<Expr, CompileError> {
        let function = self
            .library
            .get(&name)
            .cloned()
            .ok_or_else(|| self.error(format!("unknown function: {name}")))?;

        let mut args = Vec::new();
        if let Some(Token::RightParen) = self.current_token() {
            self.advance();
        } else {
            loop {
                args.push(self.parse_or_expression()?);
                match self.advance() {
                    Some(Token::Comma) => continue,
                    Some(Token::RightParen) => break,
                    Some(token) => {
                        return Err(self.error(format!(
                            "expected ',' or ')' in call to {name}, found {}",
                            token.describe()
                        )))
                    }
                    None => {
                        return Err(self.error(format!("unclosed call to {name}")));
                    }
                }
            }
        }

        if args.len() != function.arity() {
            return Err(self.error(format!(
                "function {name} expects {} arguments, found {}",
                function.arity(),
                args.len()
            )));
        }

        let pattern = match function.pattern_position() {
            Some(position) => Some(self.call_pattern(args.get(position))?),
            None => None,
        };

        Ok(Expr::Call {
            function,
            args,
            pattern,
        })
    }
}

fn invalid(source: &str, reason: impl Into<String>) -> CompileError {
    CompileError::InvalidExpression {
        expression: source.to_string(),
        reason: reason.into(),
    }
}

/// Tokenize an expression string.
pub(crate) fn tokenize_expression(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' | ')' | ',' | '+' | '-' | '*' | '/' | '%' => {
                chars.next();
                tokens.push(match ch {
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    ',' => Token::Comma,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    _ => Token::Percent,
                });
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if_eq(&ch).is_none() {
                    return Err(invalid(
                        source,
                        format!("unexpected character '{ch}', expected '{ch}{ch}'"),
                    ));
                }
                tokens.push(if ch == '&' { Token::And } else { Token::Or });
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Eq);
                } else if chars.next_if_eq(&'~').is_some() {
                    tokens.push(Token::RegexMatch);
                } else {
                    return Err(invalid(source, "unexpected '=', expected '==' or '=~'"));
                }
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::NotEq);
                } else if chars.next_if_eq(&'~').is_some() {
                    tokens.push(Token::RegexNotMatch);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' | '>' => {
                chars.next();
                let or_equal = chars.next_if_eq(&'=').is_some();
                tokens.push(match (ch, or_equal) {
                    ('<', false) => Token::Lt,
                    ('<', true) => Token::LtEq,
                    ('>', false) => Token::Gt,
                    _ => Token::GtEq,
                });
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some('r') => value.push('\r'),
                            Some(escaped @ ('\\' | '"' | '\'')) => value.push(escaped),
                            // Unknown escapes stay literal so regex escapes survive
                            Some(other) => {
                                value.push('\\');
                                value.push(other);
                            }
                            None => break,
                        },
                        c if c == ch => {
                            closed = true;
                            break;
                        }
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(invalid(source, "unterminated string literal"));
                }
                tokens.push(Token::Str(value));
            }
            '0'..='9' | '.' => {
                let mut number_str = String::new();
                while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
                    number_str.push(c);
                }
                if let Some(e) = chars.next_if(|c| *c == 'e' || *c == 'E') {
                    number_str.push(e);
                    if let Some(sign) = chars.next_if(|c| *c == '+' || *c == '-') {
                        number_str.push(sign);
                    }
                    while let Some(c) = chars.next_if(char::is_ascii_digit) {
                        number_str.push(c);
                    }
                }
                // A number runs into letters only when it is malformed ("1e", "12ab")
                while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                    number_str.push(c);
                }
                let number = number_str
                    .parse::<f64>()
                    .map_err(|_| invalid(source, format!("invalid number literal: {number_str}")))?;
                tokens.push(Token::Number(number));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut identifier = String::new();
                while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.') {
                    identifier.push(c);
                }
                tokens.push(match identifier.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Identifier(identifier),
                });
            }
            _ => {
                return Err(invalid(
                    source,
                    format!("unexpected character in expression: '{ch}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Parse tokens into an expression tree.
pub(crate) fn parse_tokens(
    source: &str,
    tokens: &[Token],
    library: &FunctionLibrary,
    config: &CompilerConfig,
) -> Result<Expr, CompileError> {
    if tokens.is_empty() {
        return Err(invalid(source, "empty expression"));
    }

    let mut parser = ExpressionParser::new(source, tokens, library, config);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::default_library;

    fn parse(source: &str) -> Result<Expr, CompileError> {
        let tokens = tokenize_expression(source)?;
        parse_tokens(source, &tokens, &default_library(), &CompilerConfig::default())
    }

    fn reason(err: CompileError) -> String {
        match err {
            CompileError::InvalidExpression { reason, .. } => reason,
            other => panic!("Expected InvalidExpression, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize_expression("a == b != c <= d >= e < f > g =~ h !~ i").unwrap();
        let operators: Vec<_> = tokens
            .iter()
            .filter(|t| !matches!(t, Token::Identifier(_)))
            .cloned()
            .collect();
        assert_eq!(
            operators,
            vec![
                Token::Eq,
                Token::NotEq,
                Token::LtEq,
                Token::GtEq,
                Token::Lt,
                Token::Gt,
                Token::RegexMatch,
                Token::RegexNotMatch,
            ]
        );
    }

    #[test]
    fn test_tokenize_logical_and_not() {
        let tokens = tokenize_expression("!a && b || c").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Not,
                Token::Identifier("a".to_string()),
                Token::And,
                Token::Identifier("b".to_string()),
                Token::Or,
                Token::Identifier("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_literals() {
        let tokens = tokenize_expression(r#"12 3.5 "dq" 'sq' true false"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(12.0),
                Token::Number(3.5),
                Token::Str("dq".to_string()),
                Token::Str("sq".to_string()),
                Token::True,
                Token::False,
            ]
        );
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = tokenize_expression(r#""a\"b\n" '\d+'"#).unwrap();
        assert_eq!(
            tokens,
            vec![Token::Str("a\"b\n".to_string()), Token::Str("\\d+".to_string())]
        );
    }

    #[test]
    fn test_tokenize_dotted_identifier() {
        let tokens = tokenize_expression("response.body_1").unwrap();
        assert_eq!(tokens, vec![Token::Identifier("response.body_1".to_string())]);
    }

    #[test]
    fn test_tokenize_errors() {
        assert!(reason(tokenize_expression("a & b").unwrap_err()).contains("'&&'"));
        assert!(reason(tokenize_expression("a = b").unwrap_err()).contains("'=='"));
        assert!(reason(tokenize_expression("\"open").unwrap_err()).contains("unterminated"));
        assert!(reason(tokenize_expression("1.2.3").unwrap_err()).contains("invalid number"));
        assert!(reason(tokenize_expression("a # b").unwrap_err()).contains("unexpected character"));
    }

    #[test]
    fn test_parse_precedence() {
        // a || b && c parses as a || (b && c)
        match parse("a || b && c").unwrap() {
            Expr::Binary(BinaryOp::Or, _, right) => {
                assert!(matches!(*right, Expr::Binary(BinaryOp::And, _, _)));
            }
            other => panic!("Expected Or at top level, got {other:?}"),
        }

        // 1 + 2 * 3 parses as 1 + (2 * 3)
        match parse("1 + 2 * 3").unwrap() {
            Expr::Binary(BinaryOp::Add, _, right) => {
                assert!(matches!(*right, Expr::Binary(BinaryOp::Mul, _, _)));
            }
            other => panic!("Expected Add at top level, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_parentheses() {
        match parse("(1 + 2) * 3").unwrap() {
            Expr::Binary(BinaryOp::Mul, left, _) => {
                assert!(matches!(*left, Expr::Binary(BinaryOp::Add, _, _)));
            }
            other => panic!("Expected Mul at top level, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_call_binds_function() {
        match parse(r#"toupper("abc")"#).unwrap() {
            Expr::Call {
                function,
                args,
                pattern,
            } => {
                assert_eq!(function.name(), "toupper");
                assert_eq!(args.len(), 1);
                assert!(pattern.is_none());
            }
            other => panic!("Expected Call, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_static_regex_operand() {
        match parse(r#"body =~ "^HTTP/1\.[01]""#).unwrap() {
            Expr::Match {
                negated: false,
                pattern: RegexOperand::Static(re),
                ..
            } => assert!(re.is_match("HTTP/1.1 200 OK")),
            other => panic!("Expected static Match, got {other:?}"),
        }

        assert!(matches!(
            parse("body !~ pattern").unwrap(),
            Expr::Match {
                negated: true,
                pattern: RegexOperand::Dynamic(..),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_pattern_helper_literal_precompiled() {
        match parse(r#"regex("^HTTP/1\.[01]", body)"#).unwrap() {
            Expr::Call {
                pattern: Some(CallPattern::Static(re)),
                ..
            } => assert!(re.is_match("HTTP/1.0 404")),
            other => panic!("Expected static pattern call, got {other:?}"),
        }

        assert!(matches!(
            parse("regex(pattern, body)").unwrap(),
            Expr::Call {
                pattern: Some(CallPattern::Dynamic(_)),
                ..
            }
        ));

        assert!(reason(parse(r#"regex("(", body)"#).unwrap_err()).contains("invalid regex literal"));
    }

    #[test]
    fn test_regex_literals_use_configured_limits() {
        let config = CompilerConfig::default().with_regex_size_limit(16);
        let library = default_library();

        for source in [r#"body =~ "\w{100}""#, r#"regex("\w{100}", body)"#] {
            let tokens = tokenize_expression(source).unwrap();
            let err = parse_tokens(source, &tokens, &library, &config).unwrap_err();
            assert!(reason(err).contains("invalid regex literal"));
        }

        let source = "body =~ pattern";
        let tokens = tokenize_expression(source).unwrap();
        match parse_tokens(source, &tokens, &library, &config).unwrap() {
            Expr::Match {
                pattern: RegexOperand::Dynamic(_, limits),
                ..
            } => assert_eq!(limits, config.regex_limits()),
            other => panic!("Expected dynamic Match, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_exponent_numbers() {
        let tokens = tokenize_expression("1e3 2.5E-1 4e+2").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Number(1000.0), Token::Number(0.25), Token::Number(400.0)]
        );

        for source in ["1e", "1e+", "12ab", "3_000"] {
            let err = tokenize_expression(source).unwrap_err();
            assert!(
                reason(err).contains(&format!("invalid number literal: {source}")),
                "{source} should be rejected as a number"
            );
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(reason(parse("nosuch(body)").unwrap_err()).contains("unknown function: nosuch"));
        assert!(reason(parse("len(a, b)").unwrap_err()).contains("expects 1 arguments, found 2"));
        assert!(reason(parse("replace(a)").unwrap_err()).contains("expects 3 arguments"));
        assert!(reason(parse("len(a").unwrap_err()).contains("unclosed call to len"));
        assert!(reason(parse("(a == b").unwrap_err()).contains("expected ')'"));
        assert!(reason(parse("a b").unwrap_err()).contains("unexpected identifier 'b'"));
        assert!(reason(parse("a ==").unwrap_err()).contains("unexpected end of expression"));
        assert!(reason(parse(r#"a =~ "(""#).unwrap_err()).contains("invalid regex literal"));
        assert!(reason(parse("").unwrap_err()).contains("empty expression"));
    }

    #[test]
    fn test_parse_depth_limit() {
        let config = CompilerConfig::default().with_max_expression_depth(4);
        let library = default_library();

        let shallow = "((a))";
        let tokens = tokenize_expression(shallow).unwrap();
        assert!(parse_tokens(shallow, &tokens, &library, &config).is_ok());

        let deep = "((((((a))))))";
        let tokens = tokenize_expression(deep).unwrap();
        let err = parse_tokens(deep, &tokens, &library, &config).unwrap_err();
        assert!(reason(err).contains("nesting exceeds 4 levels"));

        let negations = "!!!!!!a";
        let tokens = tokenize_expression(negations).unwrap();
        assert!(parse_tokens(negations, &tokens, &library, &config).is_err());
    }
}
