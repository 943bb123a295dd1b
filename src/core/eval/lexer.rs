use super::fault::CompileFault;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Keywords
    Return,
    Raise,
    Await,
    Pass,
    True,
    False,
    None,
    And,
    Or,
    Not,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Assign,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,

    /// End of a statement: a newline outside brackets, or `;`.
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub line: usize,
}

fn keyword(ident: &str) -> Option<Token> {
    let token = match ident {
        "return" => Token::Return,
        "raise" => Token::Raise,
        "await" => Token::Await,
        "pass" => Token::Pass,
        "True" => Token::True,
        "False" => Token::False,
        "None" => Token::None,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        _ => return None,
    };
    Some(token)
}

/// Splits `source` into tokens. Newlines inside `(...)` or `[...]` are
/// joined, the way Python continues lines inside brackets.
pub fn tokenize(source: &str) -> Result<Vec<TokenSpan>, CompileFault> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut depth: usize = 0;

    while pos < chars.len() {
        let c = chars[pos];

        match c {
            ' ' | '\t' | '\r' => {
                pos += 1;
            }
            '\n' => {
                if depth == 0 {
                    tokens.push(TokenSpan {
                        token: Token::Newline,
                        line,
                    });
                }
                line += 1;
                pos += 1;
            }
            '#' => {
                while pos < chars.len() && chars[pos] != '\n' {
                    pos += 1;
                }
            }
            ';' => {
                tokens.push(TokenSpan {
                    token: Token::Newline,
                    line,
                });
                pos += 1;
            }
            '\'' | '"' => {
                let (value, next) = read_string(&chars, pos, line)?;
                tokens.push(TokenSpan {
                    token: Token::Str(value),
                    line,
                });
                pos = next;
            }
            c if c.is_ascii_digit() => {
                let (token, next) = read_number(&chars, pos, line)?;
                tokens.push(TokenSpan { token, line });
                pos = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                let ident: String = chars[start..pos].iter().collect();
                let token = keyword(&ident).unwrap_or(Token::Ident(ident));
                tokens.push(TokenSpan { token, line });
            }
            _ => {
                let next = chars.get(pos + 1).copied();
                let (token, width) = match (c, next) {
                    ('*', Some('*')) => (Token::StarStar, 2),
                    ('/', Some('/')) => (Token::SlashSlash, 2),
                    ('=', Some('=')) => (Token::EqEq, 2),
                    ('!', Some('=')) => (Token::NotEq, 2),
                    ('<', Some('=')) => (Token::LtEq, 2),
                    ('>', Some('=')) => (Token::GtEq, 2),
                    ('+', _) => (Token::Plus, 1),
                    ('-', _) => (Token::Minus, 1),
                    ('*', _) => (Token::Star, 1),
                    ('/', _) => (Token::Slash, 1),
                    ('%', _) => (Token::Percent, 1),
                    ('<', _) => (Token::Lt, 1),
                    ('>', _) => (Token::Gt, 1),
                    ('=', _) => (Token::Assign, 1),
                    ('(', _) => (Token::LParen, 1),
                    (')', _) => (Token::RParen, 1),
                    ('[', _) => (Token::LBracket, 1),
                    (']', _) => (Token::RBracket, 1),
                    (',', _) => (Token::Comma, 1),
                    ('.', _) => (Token::Dot, 1),
                    _ => {
                        return Err(CompileFault::syntax(
                            format!("invalid character '{}'", c),
                            line,
                        ))
                    }
                };

                match token {
                    Token::LParen | Token::LBracket => depth += 1,
                    Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                    _ => {}
                }

                tokens.push(TokenSpan { token, line });
                pos += width;
            }
        }
    }

    if depth > 0 {
        return Err(CompileFault::syntax("unexpected EOF while parsing", line));
    }

    tokens.push(TokenSpan {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

fn read_string(chars: &[char], start: usize, line: usize) -> Result<(String, usize), CompileFault> {
    let quote = chars[start];
    let mut pos = start + 1;
    let mut value = String::new();

    while pos < chars.len() {
        match chars[pos] {
            c if c == quote => return Ok((value, pos + 1)),
            '\n' => break,
            '\\' => {
                let escaped = chars.get(pos + 1).copied();
                match escaped {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some('"') => value.push('"'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                }
                pos += 2;
            }
            c => {
                value.push(c);
                pos += 1;
            }
        }
    }

    Err(CompileFault::syntax("unterminated string literal", line))
}

fn read_number(chars: &[char], start: usize, line: usize) -> Result<(Token, usize), CompileFault> {
    let mut pos = start;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }

    let is_float = chars.get(pos) == Some(&'.')
        && chars.get(pos + 1).map_or(false, |c| c.is_ascii_digit());
    if is_float {
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    let text: String = chars[start..pos].iter().collect();
    let token = if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| CompileFault::syntax("invalid decimal literal", line))?
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| CompileFault::syntax("integer literal too large", line))?
    };

    Ok((token, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|span| span.token)
            .collect()
    }

    #[test]
    fn test_simple_call() {
        assert_eq!(
            kinds("print(1+1)"),
            vec![
                Token::Ident("print".into()),
                Token::LParen,
                Token::Int(1),
                Token::Plus,
                Token::Int(1),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_two_char_operators() {
        assert_eq!(
            kinds("return not a ** 2 // 3 <= None"),
            vec![
                Token::Return,
                Token::Not,
                Token::Ident("a".into()),
                Token::StarStar,
                Token::Int(2),
                Token::SlashSlash,
                Token::Int(3),
                Token::LtEq,
                Token::None,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_newlines_inside_brackets_are_joined() {
        let tokens = kinds("x = [1,\n2]\ny");
        let newlines = tokens.iter().filter(|t| **t == Token::Newline).count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#"'a\'b' "c\nd""#),
            vec![
                Token::Str("a'b".into()),
                Token::Str("c\nd".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(kinds("# nothing\npass"), vec![Token::Newline, Token::Pass, Token::Eof]);
    }

    #[test]
    fn test_float_and_attribute_access() {
        assert_eq!(
            kinds("1.5 + x.y"),
            vec![
                Token::Float(1.5),
                Token::Plus,
                Token::Ident("x".into()),
                Token::Dot,
                Token::Ident("y".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lines_are_tracked() {
        let tokens = tokenize("a\n\nb").unwrap();
        let b = tokens
            .iter()
            .find(|span| span.token == Token::Ident("b".into()))
            .unwrap();
        assert_eq!(b.line, 3);
    }

    #[test]
    fn test_unterminated_string_is_a_compile_fault() {
        let fault = tokenize("print('oops)").unwrap_err();
        assert_eq!(fault.kind, "SyntaxError");
        assert_eq!(fault.message, "unterminated string literal");
    }

    #[test]
    fn test_unclosed_bracket_is_a_compile_fault() {
        let fault = tokenize("print(1").unwrap_err();
        assert_eq!(fault.message, "unexpected EOF while parsing");
    }

    #[test]
    fn test_invalid_character() {
        assert!(tokenize("a $ b").is_err());
    }
}
