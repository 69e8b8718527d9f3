use crate::lexer::{Keyword, Symbol, TokenKind};
use checker__source::Span;
use checker__syntax::{
    Declaration, DeclarationToken, FunctionDeclaration, GenericDeclaration, Identifier,
    ImportSpec, Receiver, Spec, TypeParameter, TypeSpec, ValueSpec,
};

use super::{ParseError, ParseResult, Parser};

impl Parser<'_> {
    pub(super) fn parse_import_declaration(&mut self) -> ParseResult<Vec<ImportSpec>> {
        self.expect_keyword(Keyword::Import)?;
        let mut specs = Vec::new();
        if self.peek_is_symbol(Symbol::LeftParenthesis) {
            self.advance();
            loop {
                self.skip_semicolons();
                if self.peek_is_symbol(Symbol::RightParenthesis) {
                    break;
                }
                specs.push(self.parse_import_spec()?);
                self.expect_semicolon()?;
            }
            self.expect_symbol(Symbol::RightParenthesis, ")")?;
        } else {
            specs.push(self.parse_import_spec()?);
        }
        self.expect_semicolon()?;
        Ok(specs)
    }

    fn parse_import_spec(&mut self) -> ParseResult<ImportSpec> {
        let start = self.peek_span();
        let name = match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Identifier { name, span })
            }
            TokenKind::Symbol(Symbol::Dot) => {
                let span = self.advance().span;
                Some(Identifier {
                    name: ".".to_string(),
                    span,
                })
            }
            _ => None,
        };
        let TokenKind::StringLiteral(path) = self.peek().kind.clone() else {
            return Err(self.missing(ParseError::UnexpectedToken {
                expected: "import path",
                span: self.peek_span(),
            }));
        };
        let end = self.advance().span;
        Ok(ImportSpec {
            name,
            path,
            span: start.to(&end),
        })
    }

    pub(super) fn parse_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_eof() {
                break;
            }

            let result = match self.peek().kind {
                TokenKind::Keyword(Keyword::Type) => self
                    .parse_generic_declaration(DeclarationToken::Type)
                    .map(Declaration::Generic),
                TokenKind::Keyword(Keyword::Var) => self
                    .parse_generic_declaration(DeclarationToken::Var)
                    .map(Declaration::Generic),
                TokenKind::Keyword(Keyword::Const) => self
                    .parse_generic_declaration(DeclarationToken::Const)
                    .map(Declaration::Generic),
                TokenKind::Keyword(Keyword::Func) => {
                    self.parse_function_declaration().map(Declaration::Function)
                }
                TokenKind::Keyword(Keyword::Import) => Err(ParseError::UnexpectedToken {
                    expected: "declaration (imports must precede other declarations)",
                    span: self.peek_span(),
                }),
                _ => Err(self.missing(ParseError::UnexpectedToken {
                    expected: "declaration",
                    span: self.peek_span(),
                })),
            };

            match result.and_then(|declaration| {
                self.expect_semicolon()?;
                Ok(declaration)
            }) {
                Ok(declaration) => declarations.push(declaration),
                Err(error) => {
                    self.report_parse_error(&error);
                    self.synchronize();
                }
            }
        }
        declarations
    }

    fn parse_generic_declaration(
        &mut self,
        token: DeclarationToken,
    ) -> ParseResult<GenericDeclaration> {
        let doc = self.doc_comment_for_line(self.peek_span().line);
        let start = self.advance().span;

        if !self.peek_is_symbol(Symbol::LeftParenthesis) {
            let spec = self.parse_spec(token, None)?;
            let span = start.to(&self.previous_span());
            return Ok(GenericDeclaration {
                token,
                doc,
                grouped: false,
                specs: vec![spec],
                span,
            });
        }

        self.advance();
        let mut specs = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek_is_symbol(Symbol::RightParenthesis) || self.at_eof() {
                break;
            }
            let spec_doc = self.doc_comment_for_line(self.peek_span().line);
            specs.push(self.parse_spec(token, spec_doc)?);
            self.expect_semicolon()?;
        }
        let end = self.expect_symbol(Symbol::RightParenthesis, ")")?;
        Ok(GenericDeclaration {
            token,
            doc,
            grouped: true,
            specs,
            span: start.to(&end),
        })
    }

    fn parse_spec(
        &mut self,
        token: DeclarationToken,
        doc: Option<checker__syntax::DocComment>,
    ) -> ParseResult<Spec> {
        match token {
            DeclarationToken::Type => self.parse_type_spec(doc).map(Spec::Type),
            DeclarationToken::Var | DeclarationToken::Const => {
                self.parse_value_spec(doc).map(Spec::Value)
            }
        }
    }

    fn parse_type_spec(
        &mut self,
        doc: Option<checker__syntax::DocComment>,
    ) -> ParseResult<TypeSpec> {
        let name = self.expect_identifier()?;
        let type_parameters = if self.peek_starts_type_parameters() {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };
        let is_alias = self.peek_is_symbol(Symbol::Assign);
        if is_alias {
            self.advance();
        }
        let type_expression = self.parse_type()?;
        let span = name.span.to(type_expression.span());
        Ok(TypeSpec {
            doc,
            name,
            type_parameters,
            is_alias,
            type_expression,
            span,
        })
    }

    /// Tells `type T[P any] ...` apart from the array type in `type T [N]E`.
    fn peek_starts_type_parameters(&self) -> bool {
        if !self.peek_is_symbol(Symbol::LeftBracket) || !self.peek_n_is_identifier(1) {
            return false;
        }
        matches!(
            self.peek_n(2).kind,
            TokenKind::Identifier(_)
                | TokenKind::Keyword(
                    Keyword::Interface | Keyword::Func | Keyword::Map | Keyword::Chan
                )
                | TokenKind::Symbol(
                    Symbol::Comma | Symbol::Tilde | Symbol::LeftBracket | Symbol::LeftParenthesis
                )
        )
    }

    pub(super) fn parse_type_parameters(&mut self) -> ParseResult<Vec<TypeParameter>> {
        self.expect_symbol(Symbol::LeftBracket, "[")?;
        let mut type_parameters = Vec::new();
        loop {
            if self.peek_is_symbol(Symbol::RightBracket) {
                break;
            }
            let mut names = vec![self.expect_identifier()?];
            while self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                names.push(self.expect_identifier()?);
            }
            let constraint = self.parse_constraint()?;
            for name in names {
                type_parameters.push(TypeParameter {
                    name,
                    constraint: constraint.clone(),
                });
            }
            if self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_symbol(Symbol::RightBracket, "]")?;
        Ok(type_parameters)
    }

    fn parse_value_spec(
        &mut self,
        doc: Option<checker__syntax::DocComment>,
    ) -> ParseResult<ValueSpec> {
        let first = self.expect_identifier()?;
        let start = first.span.clone();
        let mut names = vec![first];
        while self.peek_is_symbol(Symbol::Comma) {
            self.advance();
            names.push(self.expect_identifier()?);
        }

        let type_expression = if self.peek_is_symbol(Symbol::Assign)
            || self.peek_is_semicolon()
            || self.peek_is_symbol(Symbol::RightParenthesis)
        {
            None
        } else {
            Some(self.parse_type()?)
        };

        let mut values = Vec::new();
        if self.peek_is_symbol(Symbol::Assign) {
            self.advance();
            values.push(self.parse_expression()?);
            while self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                values.push(self.parse_expression()?);
            }
        }

        Ok(ValueSpec {
            doc,
            names,
            type_expression,
            values,
            span: start.to(&self.previous_span()),
        })
    }

    fn parse_function_declaration(&mut self) -> ParseResult<FunctionDeclaration> {
        let doc = self.doc_comment_for_line(self.peek_span().line);
        let start = self.expect_keyword(Keyword::Func)?;
        let receiver = if self.peek_is_symbol(Symbol::LeftParenthesis) {
            Some(self.parse_receiver()?)
        } else {
            None
        };
        let name = self.expect_identifier()?;
        let type_parameters = if self.peek_is_symbol(Symbol::LeftBracket) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };
        let signature = self.parse_signature(start.clone())?;
        let body = if self.peek_is_symbol(Symbol::LeftBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(FunctionDeclaration {
            doc,
            receiver,
            name,
            type_parameters,
            signature,
            body,
            span: start.to(&self.previous_span()),
        })
    }

    fn parse_receiver(&mut self) -> ParseResult<Receiver> {
        let start = self.expect_symbol(Symbol::LeftParenthesis, "(")?;
        let name = if self.peek_is_identifier()
            && (self.peek_n_is_identifier(1) || self.peek_n_is_symbol(1, Symbol::Star))
        {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        let pointer = self.peek_is_symbol(Symbol::Star);
        if pointer {
            self.advance();
        }
        let base_type_name = self.expect_identifier()?;
        let mut type_arguments = Vec::new();
        if self.peek_is_symbol(Symbol::LeftBracket) {
            self.advance();
            loop {
                type_arguments.push(self.expect_identifier()?);
                if self.peek_is_symbol(Symbol::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect_symbol(Symbol::RightBracket, "]")?;
        }
        let end = self.expect_symbol(Symbol::RightParenthesis, ")")?;
        Ok(Receiver {
            name,
            pointer,
            base_type_name,
            type_arguments,
            span: Span::to(&start, &end),
        })
    }
}
