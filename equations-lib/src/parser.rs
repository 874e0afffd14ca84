use core::hash::Hash;
use core::str::FromStr;

use solver::domains::Lattice;
use solver::{Equation, Key, Product, Rhs};
use utils::DiagnosticEmitter;

use crate::{
    lexer::{IdentifierTable, LexResult, Token, TokenValue},
    system::{Definition, EquationKey},
};

/// Parses a list of equations. Atoms that parse as a value of `D` are
/// constants, every other atom is a key.
pub struct Parser<'src, D: Lattice> {
    current_tok: usize,
    tokens: Vec<Token>,
    identifiers: IdentifierTable,
    ctx: &'src D::LatticeContext,
    limit: usize,
    diag: &'src mut DiagnosticEmitter,
}

use TokenValue::*;

impl<'src, D> Parser<'src, D>
where
    D: Lattice + Hash + FromStr,
{
    /// The right hand sides are combined with [`Rhs::join`], equations
    /// referring to more than `limit` keys are reported and dropped.
    pub fn new(
        lexed: LexResult,
        ctx: &'src D::LatticeContext,
        limit: usize,
        diag: &'src mut DiagnosticEmitter,
    ) -> Self {
        let LexResult {
            tokens,
            identifiers,
        } = lexed;

        Parser {
            current_tok: 0,
            tokens,
            identifiers,
            ctx,
            limit,
            diag,
        }
    }

    pub fn parse(mut self) -> Option<Vec<Definition<D>>> {
        let mut definitions = Vec::new();
        while !self.is_at_end() {
            if let Some(definition) = self.parse_equation()? {
                definitions.push(definition);
            }
        }
        Some(definitions)
    }

    /// equation := key '=' product ('|' product)* ';'
    fn parse_equation(&mut self) -> Option<Option<Definition<D>>> {
        let (tok, id) = self.parse_key()?;
        self.consume(Define, "")?;
        let mut products = vec![self.parse_product()?];
        while self.try_consume(Or).is_some() {
            products.push(self.parse_product()?);
        }
        self.consume(Semicolon, "")?;

        let mut products = products.into_iter();
        let first = products.next()?;
        let (ctx, limit) = (self.ctx, self.limit);
        match products.try_fold(first, |acc, product| acc.join(product, ctx, limit)) {
            Ok(rhs) => Some(Some(Definition {
                line: tok.line_num,
                equation: Equation::new(id, rhs),
            })),
            Err(err) => {
                self.error(tok, &format!("Equation dropped, {err}."));
                Some(None)
            }
        }
    }

    /// product := atom ('&' atom)*
    fn parse_product(&mut self) -> Option<Rhs<EquationKey, D>> {
        let mut value = D::top(self.ctx);
        let mut ids = Vec::new();
        loop {
            match self.parse_atom()? {
                Atom::Value(constant) => value = value.meet(&constant, self.ctx),
                Atom::Key(key) => ids.push(key),
            }
            if self.try_consume(And).is_none() {
                break;
            }
        }

        if ids.is_empty() {
            Some(Rhs::Final(value))
        } else {
            Some(Rhs::pending([Product::new(value, ids)]))
        }
    }

    /// atom := value | key
    fn parse_atom(&mut self) -> Option<Atom<D>> {
        if !self.check(Not) && !self.is_unstable_name() {
            if let Name(name) = self.peek().value {
                if let Ok(value) = self.identifiers.get_name(name).parse::<D>() {
                    self.advance();
                    return Some(Atom::Value(value));
                }
            }
        }
        let (_, key) = self.parse_key()?;
        Some(Atom::Key(key))
    }

    /// key := '!'? name '?'?
    fn parse_key(&mut self) -> Option<(Token, EquationKey)> {
        let negated = self.try_consume(Not).is_some();
        let tok = self.peek();
        let Name(name) = tok.value else {
            self.error(tok, "Key expected.");
            return None;
        };
        self.advance();
        let base = self.identifiers.get_name(name).to_owned();
        let key = if self.try_consume(Unstable).is_some() {
            Key::unstable(base)
        } else {
            Key::stable(base)
        };
        Some((tok, EquationKey { negated, ..key }))
    }

    fn is_unstable_name(&self) -> bool {
        matches!(self.peek().value, Name(_))
            && self
                .tokens
                .get(self.current_tok + 1)
                .is_some_and(|next| next.value == Unstable)
    }

    fn peek(&self) -> Token {
        self.tokens[self.current_tok]
    }

    fn previous(&self) -> Token {
        self.tokens[self.current_tok - 1]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().value, EndOfFile)
    }

    fn check(&self, tok_val: TokenValue) -> bool {
        if self.is_at_end() {
            false
        } else {
            core::mem::discriminant(&self.peek().value) == core::mem::discriminant(&tok_val)
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current_tok += 1;
        }
        self.previous()
    }

    fn consume(&mut self, tok_val: TokenValue, s: &str) -> Option<Token> {
        if self.check(tok_val) {
            return Some(self.advance());
        }
        let msg = if s.is_empty() {
            format!("'{tok_val}' expected.")
        } else {
            s.to_owned()
        };
        self.error(self.peek(), &msg);
        None
    }

    fn try_consume(&mut self, tok_val: TokenValue) -> Option<Token> {
        if self.check(tok_val) {
            return Some(self.advance());
        }
        None
    }

    fn error(&mut self, tok: Token, s: &str) {
        match tok.value {
            EndOfFile => self.diag.report(tok.line_num.0, "at end of file", s),
            Name(name) => {
                let item = format!("at '{}'", self.identifiers.get_name(name));
                self.diag.report(tok.line_num.0, &item, s);
            }
            _ => self.diag.report(tok.line_num.0, &format!("at '{tok}'"), s),
        }
    }
}

enum Atom<D> {
    Value(D),
    Key(EquationKey),
}
