//! Scanner, tokenizer or lexer

use crate::lexer::token::{Location, Token, TokenKind};
use std::str::Chars;
use thiserror::Error;

mod hidden {
    //! Hides fields of the character reader

    use crate::lexer::token::Location;
    use itertools::{multipeek, MultiPeek};
    use std::str::Chars;

    /// Trackable `char` reader
    pub struct CharReader<I>
    where
        I: Iterator<Item = char>,
    {
        src: MultiPeek<I>,
        pos: Location,
        lexeme: String,
    }

    impl<'a> CharReader<Chars<'a>> {
        pub fn new(s: &'a str) -> Self {
            CharReader {
                src: multipeek(s.chars()),
                pos: Location::initial(),
                lexeme: String::new(),
            }
        }
    }

    impl<I> Iterator for CharReader<I>
    where
        I: Iterator<Item = char>,
    {
        type Item = char;
        fn next(&mut self) -> Option<char> {
            let next = self.src.next();
            if let Some(c) = next {
                self.lexeme.push(c);
                match c {
                    '\n' => {
                        self.pos.inc_ln();
                        self.pos.init_col();
                    }
                    _ => {
                        self.pos.inc_col();
                    }
                };
            }
            next
        }
    }

    impl<I> CharReader<I>
    where
        I: Iterator<Item = char>,
    {
        pub fn pos(&self) -> Location {
            self.pos
        }

        pub fn lexeme(&self) -> &str {
            &self.lexeme
        }

        pub fn peek(&mut self) -> Option<&char> {
            self.src.reset_peek();
            self.src.peek()
        }

        /// One character of lookahead past `peek`
        pub fn peek_next(&mut self) -> Option<&char> {
            self.src.peek()
        }

        pub fn clear_lexeme(&mut self) {
            self.lexeme.clear();
        }

        /// Advances if the next character is `c`
        pub fn consume_char(&mut self, c: char) -> bool {
            if Some(&c) == self.peek() {
                self.next();
                true
            } else {
                false
            }
        }

        /// Advances while the peek matches `predicate`; peeks char by char
        pub fn advance_while<P>(&mut self, predicate: P)
        where
            P: Fn(char) -> bool,
        {
            while let Some(&c) = self.peek() {
                if !predicate(c) {
                    return;
                }
                self.next();
            }
        }

        /// Advances until finding; doesn't peek
        pub fn advance_until<P>(&mut self, predicate: P) -> bool
        where
            P: Fn(char) -> bool,
        {
            while let Some(c) = self.next() {
                if predicate(c) {
                    return true;
                }
            }
            return false;
        }
    }
}

mod char_ext {
    pub fn is_digit(c: char) -> bool {
        c >= '0' && c <= '9'
    }

    pub fn is_alpha(c: char) -> bool {
        (c >= 'a' && c <= 'z') || (c >= 'A' && c <= 'Z') || c == '_'
    }

    pub fn is_alphanumeric(c: char) -> bool {
        is_digit(c) || is_alpha(c)
    }
}

type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// Reported at the line the string started on
    #[error("Unterminated string.")]
    UnterminatedString(Location),
    #[error("Unterminated block comment.")]
    UnterminatedComment(Location),
    #[error("Unexpected character '{0}'.")]
    UnexpectedCharacter(char, Location),
}

impl ScanError {
    pub fn pos(&self) -> Location {
        match self {
            ScanError::UnterminatedString(pos) => *pos,
            ScanError::UnterminatedComment(pos) => *pos,
            ScanError::UnexpectedCharacter(_, pos) => *pos,
        }
    }
}

pub struct Scanner<'a> {
    chars: self::hidden::CharReader<Chars<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: self::hidden::CharReader::new(src),
        }
    }

    fn add_context(&mut self, kind: TokenKind, pos: Location) -> Token {
        Token::new(kind, pos, self.chars.lexeme().to_string())
    }

    /// Tokenizes a string. Scanning continues past errors; the stream is
    /// always terminated with an `Eof` token.
    pub fn scan(mut self) -> (Vec<Token>, Vec<ScanError>) {
        let mut tks = Vec::<Token>::new();
        let mut errs = Vec::<ScanError>::new();
        loop {
            match self.next_token() {
                Ok(Some((tk, pos))) => {
                    tks.push(self.add_context(tk, pos));
                }
                Ok(None) => {
                    let pos = self.chars.pos();
                    tks.push(Token::new(TokenKind::Eof, pos, "".to_string()));
                    break;
                }
                Err(why) => {
                    errs.push(why);
                }
            }
        }

        return (tks, errs);
    }

    fn next_token(&mut self) -> Result<Option<(TokenKind, Location)>> {
        loop {
            self.chars.clear_lexeme();
            let pos = self.chars.pos();

            let c = match self.chars.next() {
                None => return Ok(None),
                Some(x) => x,
            };

            use TokenKind::*;
            let kind = match c {
                // single character token
                '(' => LeftParen,
                ')' => RightParen,
                '{' => LeftBrace,
                '}' => RightBrace,
                ',' => Comma,
                '.' => Dot,
                '+' => Plus,
                '-' => Minus,
                ';' => Semicolon,
                '*' => Star,

                // comparison
                '!' => self.scan_cmp('=', BangEq, Bang),
                '=' => self.scan_cmp('=', EqEq, Eq),
                '<' => self.scan_cmp('=', LessEq, Less),
                '>' => self.scan_cmp('=', GreaterEq, Greater),

                // commenting or division
                '/' => match self.scan_slash(pos)? {
                    Some(kind) => kind,
                    None => continue,
                },

                // whitespace
                ' ' | '\r' | '\t' | '\n' => continue,

                // literals
                '"' => self.scan_string(pos)?,
                c if char_ext::is_digit(c) => self.scan_number(),
                c if char_ext::is_alpha(c) => self.scan_kwd_or_ident(),

                _ => return Err(ScanError::UnexpectedCharacter(c, pos)),
            };

            return Ok(Some((kind, pos)));
        }
    }

    fn scan_cmp(&mut self, expected: char, if_true: TokenKind, if_false: TokenKind) -> TokenKind {
        if self.chars.consume_char(expected) {
            if_true
        } else {
            if_false
        }
    }

    /// Slash (`Some(TokenKind::Slash)`) or a comment (`None`)
    fn scan_slash(&mut self, pos: Location) -> Result<Option<TokenKind>> {
        if self.chars.consume_char('/') {
            self.chars.advance_until(|c| c == '\n');
            Ok(None)
        } else if self.chars.consume_char('*') {
            self.scan_range_comment(pos).map(|_| None)
        } else {
            Ok(Some(TokenKind::Slash))
        }
    }

    /// Nestable `/* .. */` comment
    fn scan_range_comment(&mut self, start: Location) -> Result<()> {
        while let Some(c) = self.chars.next() {
            if c == '*' {
                if self.chars.consume_char('/') {
                    return Ok(());
                }
            }
            if c == '/' {
                if self.chars.consume_char('*') {
                    self.scan_range_comment(start)?;
                }
            }
        }
        Err(ScanError::UnterminatedComment(start))
    }

    /// Strings may span lines; no escape sequences are recognized
    fn scan_string(&mut self, start: Location) -> Result<TokenKind> {
        loop {
            match self.chars.next() {
                None => return Err(ScanError::UnterminatedString(start)),
                Some('"') => {
                    // strip the quotes
                    let lexeme = self.chars.lexeme();
                    return Ok(TokenKind::Str(lexeme[1..lexeme.len() - 1].to_string()));
                }
                _ => {}
            };
        }
    }

    /// A leading or trailing decimal point is not part of a number
    fn scan_number(&mut self) -> TokenKind {
        self.chars.advance_while(&char_ext::is_digit);
        if self.chars.peek() == Some(&'.') {
            match self.chars.peek_next() {
                Some(&c) if char_ext::is_digit(c) => {
                    self.chars.next();
                    self.chars.advance_while(&char_ext::is_digit);
                }
                _ => {}
            }
        }

        // the lexeme is digits and at most one inner dot, so it parses
        let n = self.chars.lexeme().parse().unwrap();
        TokenKind::Num(n)
    }

    /// Scans an identifier or a reserved word
    fn scan_kwd_or_ident(&mut self) -> TokenKind {
        self.chars.advance_while(&char_ext::is_alphanumeric);
        let name = self.chars.lexeme();
        match TokenKind::keyword(name) {
            Some(kwd) => kwd,
            None => TokenKind::Ident(name.to_string()),
        }
    }
}
