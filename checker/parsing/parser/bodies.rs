use crate::lexer::{Keyword, Symbol, TokenKind};
use checker__syntax::{Block, TypeAssertion};

use super::{ParseResult, Parser};

impl Parser<'_> {
    /// Statements are not modelled. A block is skipped by matching braces,
    /// recording the `x.(T)` type assertions found on the way.
    pub(super) fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.expect_symbol(Symbol::LeftBrace, "{")?;
        let mut type_assertions = Vec::new();
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek().kind {
                TokenKind::EndOfFile => {
                    self.expect_symbol(Symbol::RightBrace, "}")?;
                }
                TokenKind::Symbol(Symbol::LeftBrace) => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::Symbol(Symbol::RightBrace) => {
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Symbol(Symbol::Dot)
                    if self.peek_n_is_symbol(1, Symbol::LeftParenthesis) =>
                {
                    if let Some(assertion) = self.scan_type_assertion() {
                        type_assertions.push(assertion);
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(Block {
            type_assertions,
            span: start.to(&self.previous_span()),
        })
    }

    /// Consumes `.(T)` when `T` parses as a type; otherwise only the dot.
    fn scan_type_assertion(&mut self) -> Option<TypeAssertion> {
        let saved = self.position;
        let dot = self.advance().span;
        self.advance();

        if self.peek_is_keyword(Keyword::Type) && self.peek_n_is_symbol(1, Symbol::RightParenthesis)
        {
            self.advance();
            let end = self.advance().span;
            return Some(TypeAssertion {
                asserted_type: None,
                span: dot.to(&end),
            });
        }

        match self.parse_type() {
            Ok(asserted_type) if self.peek_is_symbol(Symbol::RightParenthesis) => {
                let end = self.advance().span;
                Some(TypeAssertion {
                    asserted_type: Some(asserted_type),
                    span: dot.to(&end),
                })
            }
            _ => {
                self.position = saved + 1;
                None
            }
        }
    }
}
