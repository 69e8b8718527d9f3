use std::collections::HashMap;

use crate::lexer::{CommentGroup, Keyword, Symbol, Token, TokenKind};
use checker__diagnostics::Diagnostic;
use checker__source::Span;
use checker__syntax::{DocComment, Identifier, ParsedFile};

mod bodies;
mod declarations;
mod expressions;
mod types;

#[derive(Clone, Debug)]
pub(super) enum ParseError {
    UnexpectedToken {
        expected: &'static str,
        span: Span,
    },
    MissingKeyword {
        keyword: Keyword,
        span: Span,
    },
    MissingSymbol {
        symbol: &'static str,
        span: Span,
    },
    /// The token was already reported by the lexer.
    UnparsableToken,
}

pub(super) type ParseResult<T> = Result<T, ParseError>;

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
    doc_comment_by_end_line: HashMap<usize, DocComment>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, tokens: Vec<Token>, comments: Vec<CommentGroup>) -> Self {
        let doc_comment_by_end_line = comments
            .into_iter()
            .filter(|group| !group.trailing)
            .map(|group| {
                (
                    group.end_line,
                    DocComment {
                        lines: group.lines,
                        span: group.span,
                    },
                )
            })
            .collect();
        Self {
            source,
            tokens,
            position: 0,
            doc_comment_by_end_line,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn parse_file(&mut self) -> ParseResult<ParsedFile> {
        self.skip_semicolons();
        self.expect_keyword(Keyword::Package)?;
        let package_name = self.expect_identifier()?;
        self.expect_semicolon()?;

        let mut imports = Vec::new();
        loop {
            self.skip_semicolons();
            if !self.peek_is_keyword(Keyword::Import) {
                break;
            }
            match self.parse_import_declaration() {
                Ok(specs) => imports.extend(specs),
                Err(error) => {
                    self.report_parse_error(&error);
                    self.synchronize();
                }
            }
        }

        let declarations = self.parse_declarations();
        Ok(ParsedFile {
            package_name,
            imports,
            declarations,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_n(&self, n: usize) -> &Token {
        let index = self.position + n;
        if index < self.tokens.len() {
            &self.tokens[index]
        } else {
            &self.tokens[self.tokens.len() - 1]
        }
    }

    fn peek_span(&self) -> Span {
        self.peek().span.clone()
    }

    fn previous_span(&self) -> Span {
        if self.position == 0 {
            return self.peek_span();
        }
        self.tokens[self.position - 1].span.clone()
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EndOfFile)
    }

    fn peek_is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek().kind, TokenKind::Keyword(found) if found == keyword)
    }

    fn peek_is_symbol(&self, symbol: Symbol) -> bool {
        matches!(self.peek().kind, TokenKind::Symbol(found) if found == symbol)
    }

    fn peek_n_is_symbol(&self, n: usize, symbol: Symbol) -> bool {
        matches!(self.peek_n(n).kind, TokenKind::Symbol(found) if found == symbol)
    }

    fn peek_is_identifier(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Identifier(_))
    }

    fn peek_n_is_identifier(&self, n: usize) -> bool {
        matches!(self.peek_n(n).kind, TokenKind::Identifier(_))
    }

    fn peek_is_semicolon(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Semicolon)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if !matches!(token.kind, TokenKind::EndOfFile) {
            self.position += 1;
        }
        token
    }

    fn skip_semicolons(&mut self) {
        while self.peek_is_semicolon() {
            self.advance();
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<Span> {
        if self.peek_is_keyword(keyword) {
            return Ok(self.advance().span);
        }
        Err(self.missing(ParseError::MissingKeyword {
            keyword,
            span: self.peek_span(),
        }))
    }

    fn expect_symbol(&mut self, symbol: Symbol, display: &'static str) -> ParseResult<Span> {
        if self.peek_is_symbol(symbol) {
            return Ok(self.advance().span);
        }
        Err(self.missing(ParseError::MissingSymbol {
            symbol: display,
            span: self.peek_span(),
        }))
    }

    fn expect_identifier(&mut self) -> ParseResult<Identifier> {
        if let TokenKind::Identifier(name) = &self.peek().kind {
            let name = name.clone();
            let span = self.advance().span;
            return Ok(Identifier { name, span });
        }
        Err(self.missing(ParseError::UnexpectedToken {
            expected: "identifier",
            span: self.peek_span(),
        }))
    }

    /// A statement or declaration ends at a semicolon; one may be omitted
    /// before a closing `)` or `}`.
    fn expect_semicolon(&mut self) -> ParseResult<()> {
        if self.peek_is_semicolon() {
            self.advance();
            return Ok(());
        }
        if self.at_eof()
            || self.peek_is_symbol(Symbol::RightParenthesis)
            || self.peek_is_symbol(Symbol::RightBrace)
        {
            return Ok(());
        }
        Err(self.missing(ParseError::MissingSymbol {
            symbol: ";",
            span: self.peek_span(),
        }))
    }

    fn missing(&self, error: ParseError) -> ParseError {
        if matches!(self.peek().kind, TokenKind::Error) {
            return ParseError::UnparsableToken;
        }
        error
    }

    /// The doc comment of a declaration or of one entry in a group starting on
    /// `line`: a comment group ending on the line right above it.
    fn doc_comment_for_line(&mut self, line: usize) -> Option<DocComment> {
        if line < 2 {
            return None;
        }
        self.doc_comment_by_end_line.remove(&(line - 1))
    }

    fn source_text(&self, span: &Span) -> &'a str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    /// Skips to the next top-level declaration keyword that starts a line.
    fn synchronize(&mut self) {
        let mut brace_depth = 0usize;
        while !self.at_eof() {
            match self.peek().kind {
                TokenKind::Symbol(Symbol::LeftBrace) => brace_depth += 1,
                TokenKind::Symbol(Symbol::RightBrace) => {
                    brace_depth = brace_depth.saturating_sub(1);
                }
                TokenKind::Semicolon if brace_depth == 0 => {
                    self.advance();
                    if matches!(
                        self.peek().kind,
                        TokenKind::Keyword(
                            Keyword::Func
                                | Keyword::Type
                                | Keyword::Var
                                | Keyword::Const
                                | Keyword::Import
                        )
                    ) {
                        return;
                    }
                    continue;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(message, span));
    }

    pub(crate) fn report_parse_error(&mut self, error: &ParseError) {
        match error {
            ParseError::UnexpectedToken { expected, span } => {
                self.error(format!("expected {expected}"), span.clone());
            }
            ParseError::MissingKeyword { keyword, span } => {
                self.error(format!("expected '{}'", keyword.as_str()), span.clone());
            }
            ParseError::MissingSymbol { symbol, span } => {
                self.error(format!("expected '{symbol}'"), span.clone());
            }
            ParseError::UnparsableToken => {}
        }
    }
}
