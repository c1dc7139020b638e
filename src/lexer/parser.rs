//! Recursive descent parser with panic mode error recovery

use crate::ast::expr::*;
use crate::ast::stmt::*;
use crate::lexer::token::{Location, Token, TokenKind};
use std::iter::Peekable;
use std::rc::Rc;
use thiserror::Error;

type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("Unexpected end of input.")]
    UnexpectedEof,
    #[error("Expect {expected}.")]
    ExpectedToken {
        expected: &'static str,
        found: Token,
    },
    #[error("Expect expression.")]
    ExpectedExpression { found: Token },
    #[error("Invalid assignment target.")]
    NotAssignable { found: Token },
    #[error("Can't have more than 255 arguments.")]
    TooManyArgs { found: Token },
    #[error("Can't have more than 255 parameters.")]
    TooManyParams { found: Token },
}

impl ParseError {
    /// The token the error points at (`None` only when the token stream
    /// ran out, which a scanner-terminated stream never does)
    pub fn found(&self) -> Option<&Token> {
        match self {
            ParseError::UnexpectedEof => None,
            ParseError::ExpectedToken { found, .. } => Some(found),
            ParseError::ExpectedExpression { found } => Some(found),
            ParseError::NotAssignable { found } => Some(found),
            ParseError::TooManyArgs { found } => Some(found),
            ParseError::TooManyParams { found } => Some(found),
        }
    }
}

pub struct Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    tokens: Peekable<I>,
    /// Identity source for variable-use nodes. Borrowed so that a REPL
    /// session never reuses an ID across lines; closures created on
    /// earlier lines keep their resolution entries alive.
    counter: &'a mut VarUseIdCounter,
    /// Errors that do not abandon the statement being parsed
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a, std::slice::Iter<'a, Token>> {
    pub fn new(tokens: &'a [Token], counter: &'a mut VarUseIdCounter) -> Self {
        Parser {
            tokens: tokens.iter().peekable(),
            counter: counter,
            errors: Vec::new(),
        }
    }
}

/// Iterator methods around `Peekable<I>`
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    fn peek(&mut self) -> Option<&&'a Token> {
        self.tokens.peek()
    }

    fn next(&mut self) -> Option<&'a Token> {
        self.tokens.next()
    }

    fn advance(&mut self) -> bool {
        self.tokens.next().is_some()
    }

    fn try_peek(&mut self) -> Result<&&'a Token> {
        self.peek().ok_or(ParseError::UnexpectedEof)
    }

    fn try_next(&mut self) -> Result<&'a Token> {
        self.next().ok_or(ParseError::UnexpectedEof)
    }

    fn at_eof(&mut self) -> bool {
        match self.peek() {
            Some(s_token) => s_token.is_eof(),
            None => true,
        }
    }

    fn _any(s_token: &Token, expected: &[TokenKind]) -> bool {
        expected.iter().any(|kind| kind == &s_token.kind)
    }

    /// Consumes and clones the next token if its kind matches any of
    /// `expected`
    fn consume_any_of(&mut self, expected: &[TokenKind]) -> Option<Token> {
        let found = match self.peek() {
            Some(s_token) if Self::_any(s_token, expected) => (*s_token).clone(),
            _ => return None,
        };
        self.next();
        Some(found)
    }

    /// Consumes the next token if it matches the expected kind
    fn consume(&mut self, expected: &TokenKind) -> Option<&'a Token> {
        match self.peek() {
            Some(s_token) if s_token.kind == *expected => Some(self.next().unwrap()),
            _ => None,
        }
    }

    /// Consumes the expected token or fails; `what` names what was
    /// expected, e.g. `"';' after value"`
    fn try_consume(&mut self, expected: &TokenKind, what: &'static str) -> Result<&'a Token> {
        match self.peek() {
            Some(s_token) if s_token.kind == *expected => Ok(self.next().unwrap()),
            Some(s_token) => Err(ParseError::ExpectedToken {
                expected: what,
                found: (*s_token).clone(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn try_consume_identifier(&mut self, what: &'static str) -> Result<(String, Location)> {
        match self.peek() {
            Some(s_token) => {
                if let TokenKind::Ident(ref name) = s_token.kind {
                    let name = name.clone();
                    let pos = s_token.pos;
                    self.advance();
                    Ok((name, pos))
                } else {
                    Err(ParseError::ExpectedToken {
                        expected: what,
                        found: (*s_token).clone(),
                    })
                }
            }
            None => Err(ParseError::UnexpectedEof),
        }
    }
}

/// Statement / declaration parsing
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    /// program → declaration* EOF ;
    ///
    /// The entry point of the predictive parsing.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut stmts = Vec::<Stmt>::new();

        while !self.at_eof() {
            match self.decl() {
                Ok(stmt) => stmts.push(stmt),
                Err(why) => {
                    self.errors.push(why);
                    self.synchronize();
                }
            }
        }

        return (stmts, self.errors);
    }

    /// Enters "panic mode" and skips to the next statement boundary
    fn synchronize(&mut self) {
        while let Some(s_token) = self.peek() {
            if s_token.is_eof() {
                break;
            }
            let result = SyncPeekChecker::check_kind(&s_token.kind);
            if result.needs_advance {
                self.next();
            }
            if result.ends {
                break;
            }
        }
    }

    /// declaration → classDecl | funDecl | varDecl | statement ;
    fn decl(&mut self) -> Result<Stmt> {
        match self.try_peek()?.kind {
            TokenKind::Class => {
                self.advance();
                self.decl_class()
            }
            TokenKind::Fun => {
                self.advance();
                Ok(Stmt::Fn(Rc::new(self.function("function name")?)))
            }
            TokenKind::Var => {
                self.advance();
                self.decl_var()
            }
            _ => self.stmt(),
        }
    }

    /// classDecl → "class" IDENT ( "<" IDENT )? "{" function* "}" ;
    ///
    /// Call it after consuming `class`.
    fn decl_class(&mut self) -> Result<Stmt> {
        let (name, pos) = self.try_consume_identifier("class name")?;

        let superclass = if self.consume(&TokenKind::Less).is_some() {
            let (sup_name, sup_pos) = self.try_consume_identifier("superclass name")?;
            Some(VarUseData::new(&sup_name, self.counter.next(), sup_pos))
        } else {
            None
        };

        self.try_consume(&TokenKind::LeftBrace, "'{' before class body")?;
        let mut methods = Vec::new();
        loop {
            match self.try_peek()?.kind {
                TokenKind::RightBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::ExpectedToken {
                        expected: "'}' after class body",
                        found: (*self.try_peek()?).clone(),
                    });
                }
                _ => {
                    let method = self.function("method name")?;
                    methods.push(Rc::new(method));
                }
            }
        }

        Ok(Stmt::Class(Rc::new(ClassDeclData {
            name: name,
            superclass: superclass,
            methods: methods,
            pos: pos,
        })))
    }

    /// function → IDENT "(" params? ")" block ;
    fn function(&mut self, what: &'static str) -> Result<FnDeclData> {
        let (name, pos) = self.try_consume_identifier(what)?;

        self.try_consume(&TokenKind::LeftParen, "'(' after function name")?;
        let params = match self.try_peek()?.kind {
            TokenKind::RightParen => Vec::new(),
            _ => self.params()?,
        };
        self.try_consume(&TokenKind::RightParen, "')' after parameters")?;

        // we must first consume `{` to parse a block
        self.try_consume(&TokenKind::LeftBrace, "'{' before function body")?;
        let body = self.stmt_block()?.stmts;

        Ok(FnDeclData::new(name, params, body, pos))
    }

    /// params → IDENT ( "," IDENT )* ;
    ///
    /// More than 255 parameters is reported but parsing continues.
    fn params(&mut self) -> Result<Params> {
        let mut params = Vec::new();
        loop {
            if params.len() >= 255 {
                let found = (*self.try_peek()?).clone();
                self.errors.push(ParseError::TooManyParams { found: found });
            }
            let (name, pos) = self.try_consume_identifier("parameter name")?;
            params.push(Param::new(name, pos));
            if self.consume(&TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(params)
    }

    /// varDecl → "var" IDENT ( "=" expression )? ";" ;
    ///
    /// Call it after consuming `var`.
    fn decl_var(&mut self) -> Result<Stmt> {
        let (name, pos) = self.try_consume_identifier("variable name")?;
        let init = if self.consume(&TokenKind::Eq).is_some() {
            Some(self.expr()?)
        } else {
            None
        };
        self.try_consume(&TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Stmt::var_decl(name, init, pos))
    }

    /// statement → exprStmt | forStmt | ifStmt | printStmt | returnStmt
    ///           | whileStmt | breakStmt | block ;
    ///
    /// The root of predictive statement parsing. Sub rules are named as
    /// `stmt_xxx` and don't consume unexpected tokens.
    pub fn stmt(&mut self) -> Result<Stmt> {
        use TokenKind::*;
        match self.try_peek()?.kind {
            Print => {
                self.next();
                self.stmt_print()
            }
            LeftBrace => {
                self.next();
                Ok(self.stmt_block()?.into_stmt())
            }
            If => {
                self.next();
                self.stmt_if()
            }
            Return => {
                let pos = self.next().unwrap().pos;
                self.stmt_return(pos)
            }
            While => {
                self.next();
                self.stmt_while()
            }
            For => {
                self.next();
                self.stmt_for()
            }
            Break => {
                let pos = self.next().unwrap().pos;
                self.stmt_break(pos)
            }
            _ => self.stmt_expr(),
        }
    }

    /// printStmt → "print" expression ";" ;
    fn stmt_print(&mut self) -> Result<Stmt> {
        let expr = self.expr()?;
        self.try_consume(&TokenKind::Semicolon, "';' after value")?;
        Ok(Stmt::print(expr))
    }

    /// block → "{" declaration* "}" ;
    ///
    /// Left brace `{` must be consumed before calling this.
    pub fn stmt_block(&mut self) -> Result<BlockData> {
        let mut stmts = Vec::new();
        loop {
            match self.try_peek()?.kind {
                TokenKind::RightBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::ExpectedToken {
                        expected: "'}' after block",
                        found: (*self.try_peek()?).clone(),
                    });
                }
                _ => {
                    let stmt = self.decl()?;
                    stmts.push(stmt);
                }
            };
        }
        Ok(BlockData { stmts: stmts })
    }

    /// ifStmt → "if" "(" expression ")" statement ( "else" statement )? ;
    pub fn stmt_if(&mut self) -> Result<Stmt> {
        self.try_consume(&TokenKind::LeftParen, "'(' after 'if'")?;
        let condition = self.expr()?;
        self.try_consume(&TokenKind::RightParen, "')' after if condition")?;

        let if_true = self.stmt()?;
        let if_false = if self.consume(&TokenKind::Else).is_some() {
            Some(self.stmt()?)
        } else {
            None
        };
        Ok(Stmt::if_then_else(condition, if_true, if_false))
    }

    /// returnStmt → "return" expression? ";" ;
    pub fn stmt_return(&mut self, pos: Location) -> Result<Stmt> {
        let value = match self.try_peek()?.kind {
            TokenKind::Semicolon => None,
            _ => Some(self.expr()?),
        };
        self.try_consume(&TokenKind::Semicolon, "';' after return value")?;
        Ok(Stmt::return_(value, pos))
    }

    /// whileStmt → "while" "(" expression ")" statement ;
    pub fn stmt_while(&mut self) -> Result<Stmt> {
        self.try_consume(&TokenKind::LeftParen, "'(' after 'while'")?;
        let condition = self.expr()?;
        self.try_consume(&TokenKind::RightParen, "')' after condition")?;
        let body = self.stmt()?;
        Ok(Stmt::while_(condition, body))
    }

    /// forStmt → "for" "(" (varDecl | exprStmt | ";") expression? ";"
    ///           expression? ")" statement ;
    ///
    /// There is no `For` AST node; the loop is lowered to a `While` in
    /// a `Block` here.
    pub fn stmt_for(&mut self) -> Result<Stmt> {
        self.try_consume(&TokenKind::LeftParen, "'(' after 'for'")?;

        let init = match self.try_peek()?.kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => {
                self.advance();
                Some(self.decl_var()?)
            }
            _ => Some(self.stmt_expr()?),
        };

        let condition = match self.try_peek()?.kind {
            TokenKind::Semicolon => None,
            _ => Some(self.expr()?),
        };
        self.try_consume(&TokenKind::Semicolon, "';' after loop condition")?;

        let increment = match self.try_peek()?.kind {
            TokenKind::RightParen => None,
            _ => Some(self.expr()?),
        };
        self.try_consume(&TokenKind::RightParen, "')' after for clauses")?;

        let mut body = self.stmt()?;
        if let Some(incr) = increment {
            body = Stmt::block(vec![body, Stmt::expr(incr)]);
        }
        let condition = condition.unwrap_or(Expr::literal(LiteralData::Bool(true)));
        body = Stmt::while_(condition, body);
        if let Some(init) = init {
            body = Stmt::block(vec![init, body]);
        }

        Ok(body)
    }

    /// breakStmt → "break" ";" ;
    pub fn stmt_break(&mut self, pos: Location) -> Result<Stmt> {
        self.try_consume(&TokenKind::Semicolon, "';' after 'break'")?;
        Ok(Stmt::break_(pos))
    }

    /// exprStmt → expression ";" ;
    fn stmt_expr(&mut self) -> Result<Stmt> {
        let expr = self.expr()?;
        self.try_consume(&TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::expr(expr))
    }
}

/// Expression parsing
impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = &'a Token> + Sized,
{
    /// rrp → SubRule (Oper SubRule)*
    ///
    /// Abstracts right recursive parsing of left associative levels.
    #[inline]
    fn rrp<Oper, SubRule, Folder>(
        &mut self,
        sub_rule: SubRule,
        delimiters: &[TokenKind],
        folder: Folder,
    ) -> Result<Expr>
    where
        TokenKind: Into<Option<Oper>>,
        SubRule: Fn(&mut Self) -> Result<Expr>,
        Folder: Fn(Expr, Oper, Location, Expr) -> Expr,
    {
        let mut expr = sub_rule(self)?;
        while let Some(token) = self.consume_any_of(delimiters) {
            let right = sub_rule(self)?;
            let oper = token.kind.into().unwrap();
            expr = folder(expr, oper, token.pos, right);
        }
        Ok(expr)
    }

    /// expression → assignment ;
    pub fn expr(&mut self) -> Result<Expr> {
        self.assignment()
    }

    /// assignment → ( call "." )? IDENT "=" assignment | logic_or ;
    ///
    /// The LHS is parsed as an expression first and then re-checked:
    /// a variable becomes an `Assign` target, a property read becomes a
    /// `Set` target, and anything else is reported at the `=` while the
    /// malformed expression is kept so parsing can continue.
    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.expr_or()?;

        let eq = match self.consume(&TokenKind::Eq) {
            Some(s_token) => s_token.clone(),
            None => return Ok(expr),
        };
        let value = self.assignment()?;

        match expr {
            Expr::Variable(ref var) => {
                Ok(Expr::assign(&var.name, value, self.counter.next(), var.pos))
            }
            Expr::Get(get) => Ok(Expr::set(get.body, &get.name, value, get.pos)),
            expr => {
                self.errors.push(ParseError::NotAssignable { found: eq });
                Ok(expr)
            }
        }
    }

    /// logic_or → logic_and ( "or" logic_and )* ;
    fn expr_or(&mut self) -> Result<Expr> {
        self.rrp(&Self::expr_and, &[TokenKind::Or], &|left, oper, _pos, right| {
            Expr::logic(left, oper, right)
        })
    }

    /// logic_and → equality ( "and" equality )* ;
    fn expr_and(&mut self) -> Result<Expr> {
        self.rrp(&Self::expr_eq, &[TokenKind::And], &|left, oper, _pos, right| {
            Expr::logic(left, oper, right)
        })
    }

    /// equality → comparison ( ( "!=" | "==" ) comparison )* ;
    fn expr_eq(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(&Self::expr_cmp, &[EqEq, BangEq], &Expr::binary)
    }

    /// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
    fn expr_cmp(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(
            &Self::expr_add,
            &[Greater, GreaterEq, Less, LessEq],
            &Expr::binary,
        )
    }

    /// term → factor ( ( "-" | "+" ) factor )* ;
    fn expr_add(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(&Self::expr_mul, &[Plus, Minus], &Expr::binary)
    }

    /// factor → unary ( ( "/" | "*" ) unary )* ;
    fn expr_mul(&mut self) -> Result<Expr> {
        use TokenKind::*;
        self.rrp(&Self::expr_unary, &[Slash, Star], &Expr::binary)
    }

    /// unary → ( "!" | "-" ) unary | call ;
    fn expr_unary(&mut self) -> Result<Expr> {
        match self.try_peek()?.kind {
            TokenKind::Bang => {
                let pos = self.next().unwrap().pos;
                Ok(Expr::unary(UnaryOper::Not, self.expr_unary()?, pos))
            }
            TokenKind::Minus => {
                let pos = self.next().unwrap().pos;
                Ok(Expr::unary(UnaryOper::Minus, self.expr_unary()?, pos))
            }
            _ => self.expr_call(),
        }
    }

    /// call → primary ( "(" args? ")" | "." IDENT )* ;
    fn expr_call(&mut self) -> Result<Expr> {
        let mut expr = self.expr_prim()?;

        loop {
            if self.consume(&TokenKind::LeftParen).is_some() {
                expr = self.finish_call(expr)?;
            } else if self.consume(&TokenKind::Dot).is_some() {
                let (name, pos) = self.try_consume_identifier("property name after '.'")?;
                expr = Expr::get(expr, &name, pos);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// args → expression ( "," expression )* ;
    ///
    /// More than 255 arguments is reported but parsing continues.
    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut args = Args::new();
        if self.try_peek()?.kind != TokenKind::RightParen {
            loop {
                if args.len() >= 255 {
                    let found = (*self.try_peek()?).clone();
                    self.errors.push(ParseError::TooManyArgs { found: found });
                }
                args.push(self.expr()?);
                if self.consume(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let paren = self.try_consume(&TokenKind::RightParen, "')' after arguments")?;
        Ok(Expr::call(callee, args, paren.pos))
    }

    /// primary → "true" | "false" | "nil" | "this" | NUMBER | STRING
    ///         | IDENT | "(" expression ")" | "super" "." IDENT ;
    fn expr_prim(&mut self) -> Result<Expr> {
        let s_token = self.try_next()?;
        let pos = s_token.pos;

        if let Some(literal) = LiteralData::from_token(&s_token.kind) {
            return Ok(literal.into());
        }

        match s_token.kind {
            TokenKind::LeftParen => self.expr_group(),
            TokenKind::Ident(ref name) => Ok(Expr::var(name, self.counter.next(), pos)),
            TokenKind::This => Ok(Expr::this(self.counter.next(), pos)),
            TokenKind::Super => {
                self.try_consume(&TokenKind::Dot, "'.' after 'super'")?;
                let (method, _) = self.try_consume_identifier("superclass method name")?;
                Ok(Expr::super_(&method, self.counter.next(), pos))
            }
            _ => Err(ParseError::ExpectedExpression {
                found: s_token.clone(),
            }),
        }
    }

    /// group → "(" expression ")" ;
    ///
    /// To be called after consuming `(` (predictive parsing).
    fn expr_group(&mut self) -> Result<Expr> {
        let expr = self.expr()?;
        self.try_consume(&TokenKind::RightParen, "')' after expression")?;
        Ok(Expr::group(expr))
    }
}

/// This is for panic mode (synchronizing)
struct SyncPeekChecker {
    pub needs_advance: bool,
    pub ends: bool,
}

impl SyncPeekChecker {
    pub fn check_kind(kind: &TokenKind) -> Self {
        use TokenKind::*;
        match kind {
            Class | Fun | Var | For | If | While | Print | Return => Self {
                needs_advance: false,
                ends: true,
            },
            Semicolon => Self {
                needs_advance: true,
                ends: true,
            },
            _ => Self {
                needs_advance: true,
                ends: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::expr::VarUseIdCounter;
    use crate::ast::stmt::Stmt;
    use crate::ast::PrettyPrint;
    use crate::lexer::{
        parser::{ParseError, Parser},
        scanner::Scanner,
        token::TokenKind,
    };

    fn parse(src: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let (tks, scan_errs) = Scanner::new(src).scan();
        assert!(scan_errs.is_empty(), "scan errors: {:?}", scan_errs);
        let mut counter = VarUseIdCounter::new();
        Parser::new(&tks, &mut counter).parse()
    }

    fn parse_ok(src: &str) -> Vec<Stmt> {
        let (stmts, errs) = self::parse(src);
        assert!(errs.is_empty(), "parse errors: {:?}\nsrc: {}", errs, src);
        stmts
    }

    fn first_pretty(src: &str) -> String {
        self::parse_ok(src)[0].pretty_print()
    }

    #[test]
    fn binary_operator_precedence() {
        assert_eq!(self::first_pretty("1 + 2 * 3;"), "(eval (+ 1 (* 2 3)))");
        assert_eq!(
            self::first_pretty("(1 + 2) * 3;"),
            "(eval (* (group (+ 1 2)) 3))"
        );
        assert_eq!(
            self::first_pretty("1 < 2 == false;"),
            "(eval (== (< 1 2) false))"
        );
        assert_eq!(self::first_pretty("-1 - -2;"), "(eval (- (- 1) (- 2)))");
    }

    #[test]
    fn logic_operators_and_assignment() {
        assert_eq!(
            self::first_pretty("a = b or c and d;"),
            "(eval (= a (or b (and c d))))"
        );
        assert_eq!(
            self::first_pretty("a.b = 1;"),
            "(eval (set .b a 1))"
        );
    }

    #[test]
    fn calls_and_property_chains() {
        assert_eq!(
            self::first_pretty("f(1)(2).g.h(3);"),
            "(eval (call (.h (.g (call (call f 1) 2))) 3))"
        );
        assert_eq!(
            self::first_pretty("super.cook();"),
            "(eval (call (super cook)))"
        );
    }

    #[test]
    fn for_loops_desugar_to_while() {
        let stmts = self::parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        let outer = match &stmts[0] {
            Stmt::Block(block) => &block.stmts,
            stmt => panic!("expected block, got {:?}", stmt),
        };
        assert!(matches!(outer[0], Stmt::Var(_)));
        let while_ = match &outer[1] {
            Stmt::While(while_) => while_,
            stmt => panic!("expected while, got {:?}", stmt),
        };
        assert_eq!(while_.condition.pretty_print(), "(< i 3)");
        // body is the original statement followed by the increment
        match &while_.body {
            Stmt::Block(block) => {
                assert!(matches!(block.stmts[0], Stmt::Print(_)));
                assert!(matches!(block.stmts[1], Stmt::Expr(_)));
            }
            stmt => panic!("expected block body, got {:?}", stmt),
        }
    }

    #[test]
    fn for_loop_without_clauses_is_a_bare_while_true() {
        let stmts = self::parse_ok("for (;;) break;");
        let while_ = match &stmts[0] {
            Stmt::While(while_) => while_,
            stmt => panic!("expected while, got {:?}", stmt),
        };
        assert_eq!(while_.condition.pretty_print(), "true");
        assert!(matches!(while_.body, Stmt::Break(_)));
    }

    #[test]
    fn class_declarations() {
        let stmts = self::parse_ok("class B < A { init(n) { this.n = n; } cook() { return 1; } }");
        let class = match &stmts[0] {
            Stmt::Class(class) => class,
            stmt => panic!("expected class, got {:?}", stmt),
        };
        assert_eq!(class.name, "B");
        assert_eq!(class.superclass.as_ref().unwrap().name, "A");
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class.methods[0].name, "init");
        assert_eq!(class.methods[0].params.len(), 1);
    }

    #[test]
    fn invalid_assignment_target_is_reported_but_kept() {
        let (stmts, errs) = self::parse("(a) = 3;");
        assert_eq!(stmts.len(), 1);
        match errs.as_slice() {
            [ParseError::NotAssignable { found }] => {
                assert_eq!(found.kind, TokenKind::Eq);
            }
            e => panic!("expected an invalid assignment error, got {:?}", e),
        }
    }

    #[test]
    fn panic_mode_recovers_at_statement_boundaries() {
        let (stmts, errs) = self::parse("var = 1; print 2;");
        assert_eq!(errs.len(), 1);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Stmt::Print(_)));
    }

    #[test]
    fn missing_semicolon_points_at_the_end_of_input() {
        let (_, errs) = self::parse("print 1");
        match errs.as_slice() {
            [err] => assert!(err.found().unwrap().is_eof()),
            e => panic!("expected one error, got {:?}", e),
        }
    }
}
