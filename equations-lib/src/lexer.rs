use utils::DiagnosticEmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier(pub usize);

#[derive(Clone, Debug, Copy, Eq, PartialEq, Hash)]
pub struct Location(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValue {
    /// Either a lattice value or the name of a key, the parser decides.
    Name(Identifier),

    // Operators
    Define,
    And,
    Or,
    Not,
    Unstable,

    // Separators
    Semicolon,

    EndOfFile,
}

use TokenValue::*;

fn from_char(c: char) -> Option<TokenValue> {
    match c {
        '=' => Some(Define),
        '&' => Some(And),
        '|' => Some(Or),
        '!' => Some(Not),
        '?' => Some(Unstable),
        ';' => Some(Semicolon),
        _ => None,
    }
}

impl core::fmt::Display for TokenValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Name(i) => write!(f, "name_{}", i.0),
            Define => write!(f, "="),
            And => write!(f, "&"),
            Or => write!(f, "|"),
            Not => write!(f, "!"),
            Unstable => write!(f, "?"),
            Semicolon => write!(f, ";"),
            EndOfFile => write!(f, "END_OF_FILE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub value: TokenValue,

    pub line_num: Location,
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierTable(pub Vec<String>);

impl IdentifierTable {
    pub fn lookup(&self, ident: &str) -> Option<Identifier> {
        self.0.iter().position(|str| str == ident).map(Identifier)
    }

    fn get_identifier(&mut self, ident: &str) -> Identifier {
        if let Some(id) = self.lookup(ident) {
            id
        } else {
            self.0.push(ident.to_owned());
            Identifier(self.0.len() - 1)
        }
    }

    pub fn get_name(&self, id: Identifier) -> &str {
        &self.0[id.0]
    }
}

pub struct Lexer<'src> {
    source: &'src str,
    start: usize,
    current: usize,
    line_num: u32,
    has_error: bool,
    diagnostic_emitter: &'src mut DiagnosticEmitter,
    identifiers: IdentifierTable,
}

#[derive(Debug, Clone, Default)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub identifiers: IdentifierTable,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, diagnostic_emitter: &'src mut DiagnosticEmitter) -> Self {
        Lexer {
            source,
            start: 0,
            current: 0,
            line_num: 1,
            has_error: false,
            diagnostic_emitter,
            identifiers: IdentifierTable::default(),
        }
    }

    /// Returns an empty token list after reporting the first error.
    pub fn lex_all(mut self) -> LexResult {
        if !self.source.is_ascii() {
            self.diagnostic_emitter
                .error(self.line_num, "Only ASCII input is supported.");
            return LexResult::default();
        }

        let mut tokens = Vec::new();
        while !self.is_at_end() {
            if let Some(tok) = self.lex() {
                tokens.push(tok);
            } else if self.has_error {
                return LexResult::default();
            }
        }

        tokens.push(Token {
            value: EndOfFile,
            line_num: Location(self.line_num),
        });

        LexResult {
            tokens,
            identifiers: self.identifiers,
        }
    }

    fn lex(&mut self) -> Option<Token> {
        loop {
            if self.is_at_end() {
                return None;
            }

            self.start = self.current;
            match self.advance() {
                // Unambiguous single character tokens.
                c @ ('=' | '&' | '|' | '!' | '?' | ';') => {
                    return from_char(c).map(|value| Token {
                        value,
                        line_num: Location(self.line_num),
                    });
                }

                // Whitespace
                '\n' => {
                    self.line_num += 1;
                    continue;
                }
                ' ' | '\t' | '\r' => continue,

                // Comments
                '#' => {
                    self.skip_line();
                    continue;
                }
                '/' => {
                    if self.match_char('/') {
                        self.skip_line();
                        continue;
                    }
                    self.unexpected();
                    return None;
                }
                c => {
                    if c.is_ascii_alphabetic() || c == '_' {
                        let ident = self.lex_identifier();
                        return Some(Token {
                            value: Name(self.identifiers.get_identifier(ident)),
                            line_num: Location(self.line_num),
                        });
                    }
                    self.unexpected();
                    return None;
                }
            }
        }
    }

    /// Names of methods often contain package separators, inner class
    /// markers and descriptors, so those characters are allowed after the
    /// first one. A `//` still starts a comment.
    fn lex_identifier(&mut self) -> &'src str {
        while is_identifier_char(self.peek())
            && !(self.peek() == '/' && self.peek_next() == '/')
        {
            self.advance();
        }

        &self.source[self.start..self.current]
    }

    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn unexpected(&mut self) {
        self.diagnostic_emitter.error(
            self.line_num,
            &format!(
                "Unexpected token: '{}'.",
                &self.source[self.start..self.current]
            ),
        );
        self.has_error = true;
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> char {
        self.source
            .as_bytes()
            .get(self.current)
            .map_or('\0', |&b| b as char)
    }

    fn peek_next(&self) -> char {
        self.source
            .as_bytes()
            .get(self.current + 1)
            .map_or('\0', |&b| b as char)
    }

    fn advance(&mut self) -> char {
        let prev = self.peek();
        self.current += 1;
        prev
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.current += 1;
            true
        } else {
            false
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '/' | '<' | '>' | '(' | ')' | '[')
}
