use super::ast::{BinaryOp, Expr, Program, Stmt, StmtKind, UnaryOp};
use super::fault::CompileFault;
use super::lexer::{tokenize, Token, TokenSpan};

/// Recursive descents (parentheses, brackets, unary operators) allowed per expression.
const MAX_NESTING: usize = 100;
/// Depth of a compiled expression tree. The interpreter recurses once per level.
const MAX_DEPTH: usize = 100;

/// Compiles normalized source into a [`Program`].
pub fn parse_program(source: &str) -> Result<Program, CompileFault> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        nesting: 0,
    };
    let statements = parser.statements()?;

    Ok(Program {
        statements,
        source_lines: source.split('\n').map(str::to_string).collect(),
    })
}

struct Parser {
    tokens: Vec<TokenSpan>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].token
    }

    fn line(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), CompileFault> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileFault {
        CompileFault::syntax(message, self.line())
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, CompileFault>,
    ) -> Result<T, CompileFault> {
        if self.nesting >= MAX_NESTING {
            return Err(self.error("too many nested expressions"));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn statements(&mut self) -> Result<Vec<Stmt>, CompileFault> {
        let mut statements = Vec::new();

        loop {
            while self.eat(&Token::Newline) {}
            if *self.peek() == Token::Eof {
                break;
            }

            let line = self.line();
            let kind = self.statement()?;
            if kind.expression().map_or(0, expr_depth) > MAX_DEPTH {
                return Err(CompileFault::syntax("expression is too deeply nested", line));
            }
            statements.push(Stmt { kind, line });

            match self.peek() {
                Token::Newline => {
                    self.advance();
                }
                Token::Eof => break,
                _ => return Err(self.error("invalid syntax")),
            }
        }

        Ok(statements)
    }

    fn statement(&mut self) -> Result<StmtKind, CompileFault> {
        match self.peek() {
            Token::Pass => {
                self.advance();
                Ok(StmtKind::Pass)
            }
            Token::Return => {
                self.advance();
                if matches!(self.peek(), Token::Newline | Token::Eof) {
                    Ok(StmtKind::Return(None))
                } else {
                    Ok(StmtKind::Return(Some(self.expression()?)))
                }
            }
            Token::Raise => {
                self.advance();
                if matches!(self.peek(), Token::Newline | Token::Eof) {
                    return Err(self.error("raise needs an exception"));
                }
                Ok(StmtKind::Raise(self.expression()?))
            }
            Token::Ident(name) if *self.peek_at(1) == Token::Assign => {
                let name = name.clone();
                self.advance();
                self.advance();
                Ok(StmtKind::Assign(name, self.expression()?))
            }
            _ => {
                let expr = self.expression()?;
                if *self.peek() == Token::Assign {
                    return Err(self.error("cannot assign to expression"));
                }
                Ok(StmtKind::Expr(expr))
            }
        }
    }

    fn expression(&mut self) -> Result<Expr, CompileFault> {
        self.nested(Self::or_expr)
    }

    fn or_expr(&mut self) -> Result<Expr, CompileFault> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, CompileFault> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, CompileFault> {
        if self.eat(&Token::Not) {
            let operand = self.nested(Self::not_expr)?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, CompileFault> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::NotEq,
                Token::Lt => BinaryOp::Lt,
                Token::LtEq => BinaryOp::LtEq,
                Token::Gt => BinaryOp::Gt,
                Token::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.additive()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, CompileFault> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, CompileFault> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::SlashSlash => BinaryOp::FloorDiv,
                Token::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, CompileFault> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.nested(Self::unary)?)));
        }
        if self.eat(&Token::Plus) {
            return Ok(Expr::Unary(UnaryOp::Pos, Box::new(self.nested(Self::unary)?)));
        }
        self.power()
    }

    // `-2 ** 2` is `-(2 ** 2)` and `2 ** -1` is legal.
    fn power(&mut self) -> Result<Expr, CompileFault> {
        let base = self.await_expr()?;
        if self.eat(&Token::StarStar) {
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary(Box::new(base), BinaryOp::Pow, Box::new(exponent)));
        }
        Ok(base)
    }

    fn await_expr(&mut self) -> Result<Expr, CompileFault> {
        if self.eat(&Token::Await) {
            return Ok(Expr::Await(Box::new(self.nested(Self::await_expr)?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, CompileFault> {
        let mut expr = self.atom()?;
        loop {
            match self.peek() {
                Token::LParen => {
                    self.advance();
                    let args = self.comma_list(Token::RParen, "')'")?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                Token::Dot => {
                    self.advance();
                    match self.advance() {
                        Token::Ident(name) => expr = Expr::Attribute(Box::new(expr), name),
                        _ => return Err(self.error("expected attribute name")),
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(Token::RBracket, "']'")?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, CompileFault> {
        let expr = match self.advance() {
            Token::Int(value) => Expr::Int(value),
            Token::Float(value) => Expr::Float(value),
            Token::Str(value) => {
                // Adjacent literals concatenate.
                let mut value = value;
                while let Token::Str(next) = self.peek() {
                    value.push_str(next);
                    self.advance();
                }
                Expr::Str(value)
            }
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::None => Expr::None,
            Token::Ident(name) => Expr::Name(name),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "')'")?;
                inner
            }
            Token::LBracket => Expr::List(self.comma_list(Token::RBracket, "']'")?),
            Token::Eof | Token::Newline => {
                return Err(self.error("unexpected end of statement"))
            }
            _ => return Err(self.error("invalid syntax")),
        };
        Ok(expr)
    }

    /// Parses `a, b, c` up to `close`, allowing a trailing comma.
    fn comma_list(&mut self, close: Token, what: &str) -> Result<Vec<Expr>, CompileFault> {
        let mut items = Vec::new();
        loop {
            if self.eat(&close) {
                return Ok(items);
            }
            items.push(self.expression()?);
            if !self.eat(&Token::Comma) {
                self.expect(close, what)?;
                return Ok(items);
            }
        }
    }
}

/// Longest root-to-leaf path. Iterative, since left-deep chains such as
/// `1 + 1 + ...` are built in loops and can be deeper than the parser's stack.
fn expr_depth(root: &Expr) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(root, 1)];
    while let Some((expr, depth)) = pending.pop() {
        deepest = deepest.max(depth);
        match expr {
            Expr::Unary(_, inner) | Expr::Attribute(inner, _) | Expr::Await(inner) => {
                pending.push((inner.as_ref(), depth + 1));
            }
            Expr::Binary(left, _, right)
            | Expr::And(left, right)
            | Expr::Or(left, right)
            | Expr::Index(left, right) => {
                pending.push((left.as_ref(), depth + 1));
                pending.push((right.as_ref(), depth + 1));
            }
            Expr::Call(callee, args) => {
                pending.push((callee.as_ref(), depth + 1));
                pending.extend(args.iter().map(|arg| (arg, depth + 1)));
            }
            Expr::List(items) => pending.extend(items.iter().map(|item| (item, depth + 1))),
            Expr::None
            | Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Name(_) => {}
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> StmtKind {
        let program = parse_program(source).unwrap();
        assert_eq!(program.statements.len(), 1);
        program.statements[0].kind.clone()
    }

    #[test]
    fn test_precedence() {
        let kind = single("1 + 2 * 3");
        assert_eq!(
            kind,
            StmtKind::Expr(Expr::Binary(
                Box::new(Expr::Int(1)),
                BinaryOp::Add,
                Box::new(Expr::Binary(
                    Box::new(Expr::Int(2)),
                    BinaryOp::Mul,
                    Box::new(Expr::Int(3))
                ))
            ))
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let kind = single("-2 ** 2");
        assert_eq!(
            kind,
            StmtKind::Expr(Expr::Unary(
                UnaryOp::Neg,
                Box::new(Expr::Binary(
                    Box::new(Expr::Int(2)),
                    BinaryOp::Pow,
                    Box::new(Expr::Int(2))
                ))
            ))
        );
    }

    #[test]
    fn test_assignment_and_return() {
        let program = parse_program("x = 5\nreturn x").unwrap();
        assert_eq!(
            program.statements[0].kind,
            StmtKind::Assign("x".into(), Expr::Int(5))
        );
        assert_eq!(
            program.statements[1].kind,
            StmtKind::Return(Some(Expr::Name("x".into())))
        );
        assert_eq!(program.statements[1].line, 2);
    }

    #[test]
    fn test_bare_return() {
        assert_eq!(single("return"), StmtKind::Return(None));
    }

    #[test]
    fn test_await_method_call() {
        let kind = single("await channel.send('hi')");
        assert_eq!(
            kind,
            StmtKind::Expr(Expr::Await(Box::new(Expr::Call(
                Box::new(Expr::Attribute(
                    Box::new(Expr::Name("channel".into())),
                    "send".into()
                )),
                vec![Expr::Str("hi".into())]
            ))))
        );
    }

    #[test]
    fn test_raise() {
        let kind = single("raise ValueError(\"x\")");
        assert_eq!(
            kind,
            StmtKind::Raise(Expr::Call(
                Box::new(Expr::Name("ValueError".into())),
                vec![Expr::Str("x".into())]
            ))
        );
    }

    #[test]
    fn test_semicolons_and_blank_lines() {
        let program = parse_program("\n\na = 1; b = 2\n\n").unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_list_with_trailing_comma() {
        assert_eq!(
            single("[1, 2,]"),
            StmtKind::Expr(Expr::List(vec![Expr::Int(1), Expr::Int(2)]))
        );
    }

    #[test]
    fn test_missing_operand_is_a_syntax_error() {
        let fault = parse_program("x = 1 +").unwrap_err();
        assert_eq!(fault.kind, "SyntaxError");
        assert_eq!(fault.line, 1);
    }

    #[test]
    fn test_two_expressions_on_a_line() {
        let fault = parse_program("print(1) print(2)").unwrap_err();
        assert_eq!(fault.message, "invalid syntax");
    }

    #[test]
    fn test_assignment_to_call_is_rejected() {
        let fault = parse_program("f() = 1").unwrap_err();
        assert_eq!(fault.message, "cannot assign to expression");
    }

    #[test]
    fn test_deep_parentheses_are_a_syntax_error() {
        let source = format!("return {}1{}", "(".repeat(990), ")".repeat(990));
        let fault = parse_program(&source).unwrap_err();
        assert_eq!(fault.kind, "SyntaxError");
        assert_eq!(fault.message, "too many nested expressions");
    }

    #[test]
    fn test_deep_unary_operators_are_a_syntax_error() {
        for operator in ["-", "+", "not ", "await "] {
            let source = format!("return {}1", operator.repeat(1990 / operator.len()));
            let fault = parse_program(&source).unwrap_err();
            assert_eq!(fault.kind, "SyntaxError", "{}", operator.trim());
        }
        let fault = parse_program(&format!("return 2{}", "**2".repeat(600))).unwrap_err();
        assert_eq!(fault.kind, "SyntaxError");
    }

    #[test]
    fn test_long_operator_chain_is_a_syntax_error() {
        let source = format!("return 1{}", "+1".repeat(990));
        let fault = parse_program(&source).unwrap_err();
        assert_eq!(fault.message, "expression is too deeply nested");
        assert_eq!(fault.line, 1);

        let source = format!("x = a{}", ".b".repeat(500));
        assert!(parse_program(&source).is_err());
    }

    #[test]
    fn test_moderate_nesting_still_compiles() {
        let source = format!("return {}1{}", "(".repeat(30), ")".repeat(30));
        assert!(parse_program(&source).is_ok());
        let source = format!("return 1{}", "+1".repeat(60));
        assert!(parse_program(&source).is_ok());
        assert!(parse_program(&format!("return {}1", "-".repeat(40))).is_ok());
    }

    #[test]
    fn test_source_line_lookup() {
        let program = parse_program("a = 1\nraise ValueError('x')").unwrap();
        assert_eq!(program.source_line(2), "raise ValueError('x')");
        assert_eq!(program.source_line(0), "");
        assert_eq!(program.source_line(9), "");
    }
}
