use crate::lexer::{Keyword, Symbol, TokenKind};
use checker__source::Span;
use checker__syntax::{
    ChannelDirection, FieldDeclaration, FunctionType, Identifier, InterfaceElement,
    InterfaceType, Parameter, StructType, TypeExpression, TypeTerm,
};

use super::{ParseError, ParseResult, Parser};

/// One entry of a parameter list before Go's grouping rule is applied. A
/// lone identifier is either a parameter name or a type name, depending on
/// whether any entry of the list is named.
enum ParameterEntry {
    Bare(Identifier),
    Named {
        name: Identifier,
        type_expression: TypeExpression,
        variadic: bool,
    },
    Unnamed {
        type_expression: TypeExpression,
        variadic: bool,
    },
}

impl Parser<'_> {
    pub(super) fn parse_type(&mut self) -> ParseResult<TypeExpression> {
        let start = self.peek_span();
        match self.peek().kind.clone() {
            TokenKind::Identifier(_) => self.parse_type_name(),
            TokenKind::Symbol(Symbol::Star) => {
                self.advance();
                let element = self.parse_type()?;
                let span = start.to(element.span());
                Ok(TypeExpression::Pointer {
                    element: Box::new(element),
                    span,
                })
            }
            TokenKind::Symbol(Symbol::LeftBracket) => self.parse_slice_or_array_type(),
            TokenKind::Symbol(Symbol::LeftParenthesis) => {
                self.advance();
                let inner = self.parse_type()?;
                let end = self.expect_symbol(Symbol::RightParenthesis, ")")?;
                Ok(TypeExpression::Parenthesized {
                    inner: Box::new(inner),
                    span: start.to(&end),
                })
            }
            TokenKind::Symbol(Symbol::Arrow) => {
                self.advance();
                self.expect_keyword(Keyword::Chan)?;
                let element = self.parse_type()?;
                let span = start.to(element.span());
                Ok(TypeExpression::Channel {
                    direction: ChannelDirection::Receive,
                    element: Box::new(element),
                    span,
                })
            }
            TokenKind::Keyword(Keyword::Chan) => {
                self.advance();
                let direction = if self.peek_is_symbol(Symbol::Arrow) {
                    self.advance();
                    ChannelDirection::Send
                } else {
                    ChannelDirection::Both
                };
                let element = self.parse_type()?;
                let span = start.to(element.span());
                Ok(TypeExpression::Channel {
                    direction,
                    element: Box::new(element),
                    span,
                })
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.advance();
                self.expect_symbol(Symbol::LeftBracket, "[")?;
                let key = self.parse_type()?;
                self.expect_symbol(Symbol::RightBracket, "]")?;
                let value = self.parse_type()?;
                let span = start.to(value.span());
                Ok(TypeExpression::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span,
                })
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                self.parse_signature(start).map(TypeExpression::Function)
            }
            TokenKind::Keyword(Keyword::Struct) => {
                self.parse_struct_type().map(TypeExpression::Struct)
            }
            TokenKind::Keyword(Keyword::Interface) => {
                self.parse_interface_type().map(TypeExpression::Interface)
            }
            _ => Err(self.missing(ParseError::UnexpectedToken {
                expected: "type",
                span: start,
            })),
        }
    }

    pub(super) fn peek_starts_type(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Identifier(_)
                | TokenKind::Symbol(
                    Symbol::Star | Symbol::LeftBracket | Symbol::LeftParenthesis | Symbol::Arrow
                )
                | TokenKind::Keyword(
                    Keyword::Chan
                        | Keyword::Map
                        | Keyword::Func
                        | Keyword::Struct
                        | Keyword::Interface
                )
        )
    }

    /// `T`, `pkg.T`, and either of them instantiated as in `T[int]`.
    fn parse_type_name(&mut self) -> ParseResult<TypeExpression> {
        let first = self.expect_identifier()?;
        let (qualifier, name) =
            if self.peek_is_symbol(Symbol::Dot) && self.peek_n_is_identifier(1) {
                self.advance();
                (Some(first), self.expect_identifier()?)
            } else {
                (None, first)
            };
        let start = qualifier
            .as_ref()
            .map_or_else(|| name.span.clone(), |qualifier| qualifier.span.clone());

        let mut type_arguments = Vec::new();
        let mut end = name.span.clone();
        if self.peek_is_symbol(Symbol::LeftBracket) && !self.peek_n_is_symbol(1, Symbol::RightBracket)
        {
            self.advance();
            loop {
                type_arguments.push(self.parse_type()?);
                if self.peek_is_symbol(Symbol::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
            end = self.expect_symbol(Symbol::RightBracket, "]")?;
        }

        Ok(TypeExpression::Name {
            qualifier,
            name,
            type_arguments,
            span: start.to(&end),
        })
    }

    fn parse_slice_or_array_type(&mut self) -> ParseResult<TypeExpression> {
        let start = self.expect_symbol(Symbol::LeftBracket, "[")?;
        if self.peek_is_symbol(Symbol::RightBracket) {
            self.advance();
            let element = self.parse_type()?;
            let span = start.to(element.span());
            return Ok(TypeExpression::Slice {
                element: Box::new(element),
                span,
            });
        }

        let length = if self.peek_is_symbol(Symbol::Ellipsis) {
            self.advance();
            None
        } else {
            let length_start = self.peek_span();
            let mut depth = 0usize;
            while !self.at_eof() {
                match self.peek().kind {
                    TokenKind::Symbol(Symbol::LeftBracket) => depth += 1,
                    TokenKind::Symbol(Symbol::RightBracket) if depth == 0 => break,
                    TokenKind::Symbol(Symbol::RightBracket) => depth -= 1,
                    _ => {}
                }
                self.advance();
            }
            let length_end = self.previous_span();
            Some(self.source_text(&length_start.to(&length_end)).trim().to_string())
        };
        self.expect_symbol(Symbol::RightBracket, "]")?;
        let element = self.parse_type()?;
        let span = start.to(element.span());
        Ok(TypeExpression::Array {
            length,
            element: Box::new(element),
            span,
        })
    }

    /// Parameters and results following `func`, a method name or a
    /// function name.
    pub(super) fn parse_signature(&mut self, start: Span) -> ParseResult<FunctionType> {
        let parameters = self.parse_parameters()?;
        let results = if self.peek_is_symbol(Symbol::LeftParenthesis) {
            self.parse_parameters()?
        } else if self.peek_starts_type() {
            let type_expression = self.parse_type()?;
            vec![Parameter {
                name: None,
                type_expression,
                variadic: false,
            }]
        } else {
            Vec::new()
        };
        Ok(FunctionType {
            parameters,
            results,
            span: start.to(&self.previous_span()),
        })
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect_symbol(Symbol::LeftParenthesis, "(")?;
        let mut entries = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek_is_symbol(Symbol::RightParenthesis) {
                break;
            }
            entries.push(self.parse_parameter_entry()?);
            if self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.skip_semicolons();
        self.expect_symbol(Symbol::RightParenthesis, ")")?;
        Ok(group_parameters(entries))
    }

    fn parse_parameter_entry(&mut self) -> ParseResult<ParameterEntry> {
        if self.peek_is_symbol(Symbol::Ellipsis) {
            self.advance();
            return Ok(ParameterEntry::Unnamed {
                type_expression: self.parse_type()?,
                variadic: true,
            });
        }
        if !self.peek_is_identifier() {
            return Ok(ParameterEntry::Unnamed {
                type_expression: self.parse_type()?,
                variadic: false,
            });
        }
        if self.peek_n_is_symbol(1, Symbol::Dot) {
            return Ok(ParameterEntry::Unnamed {
                type_expression: self.parse_type()?,
                variadic: false,
            });
        }
        if self.peek_n_is_symbol(1, Symbol::Comma)
            || self.peek_n_is_symbol(1, Symbol::RightParenthesis)
        {
            return Ok(ParameterEntry::Bare(self.expect_identifier()?));
        }

        let name = self.expect_identifier()?;
        let variadic = self.peek_is_symbol(Symbol::Ellipsis);
        if variadic {
            self.advance();
        }
        Ok(ParameterEntry::Named {
            name,
            type_expression: self.parse_type()?,
            variadic,
        })
    }

    pub(super) fn parse_struct_type(&mut self) -> ParseResult<StructType> {
        let start = self.expect_keyword(Keyword::Struct)?;
        self.expect_symbol(Symbol::LeftBrace, "{")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek_is_symbol(Symbol::RightBrace) || self.at_eof() {
                break;
            }
            fields.push(self.parse_field_declaration()?);
            self.expect_semicolon()?;
        }
        let end = self.expect_symbol(Symbol::RightBrace, "}")?;
        Ok(StructType {
            fields,
            span: start.to(&end),
        })
    }

    fn parse_field_declaration(&mut self) -> ParseResult<FieldDeclaration> {
        let start = self.peek_span();
        let (names, type_expression) = if self.peek_starts_embedded_field() {
            (Vec::new(), self.parse_type()?)
        } else {
            let mut names = vec![self.expect_identifier()?];
            while self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                names.push(self.expect_identifier()?);
            }
            (names, self.parse_type()?)
        };
        let tag = if let TokenKind::StringLiteral(tag) = self.peek().kind.clone() {
            self.advance();
            Some(tag)
        } else {
            None
        };
        Ok(FieldDeclaration {
            names,
            type_expression,
            tag,
            span: start.to(&self.previous_span()),
        })
    }

    fn peek_starts_embedded_field(&self) -> bool {
        if self.peek_is_symbol(Symbol::Star) {
            return true;
        }
        if !self.peek_is_identifier() {
            return false;
        }
        match self.peek_n(1).kind {
            TokenKind::Semicolon
            | TokenKind::StringLiteral(_)
            | TokenKind::Symbol(Symbol::Dot | Symbol::RightBrace) => true,
            // `Base[T]` embeds an instantiated type; `items [4]int` declares a
            // field.
            TokenKind::Symbol(Symbol::LeftBracket) => {
                self.peek_n_is_identifier(2)
                    && self.peek_n_is_symbol(3, Symbol::RightBracket)
                    && matches!(
                        self.peek_n(4).kind,
                        TokenKind::Semicolon
                            | TokenKind::StringLiteral(_)
                            | TokenKind::Symbol(Symbol::RightBrace)
                    )
            }
            _ => false,
        }
    }

    pub(super) fn parse_interface_type(&mut self) -> ParseResult<InterfaceType> {
        let start = self.expect_keyword(Keyword::Interface)?;
        self.expect_symbol(Symbol::LeftBrace, "{")?;
        let mut elements = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek_is_symbol(Symbol::RightBrace) || self.at_eof() {
                break;
            }
            elements.push(self.parse_interface_element()?);
            self.expect_semicolon()?;
        }
        let end = self.expect_symbol(Symbol::RightBrace, "}")?;
        Ok(InterfaceType {
            elements,
            span: start.to(&end),
        })
    }

    fn parse_interface_element(&mut self) -> ParseResult<InterfaceElement> {
        if self.peek_is_identifier() && self.peek_n_is_symbol(1, Symbol::LeftParenthesis) {
            let name = self.expect_identifier()?;
            let signature = self.parse_signature(name.span.clone())?;
            let span = name.span.to(&signature.span);
            return Ok(InterfaceElement::Method {
                name,
                signature,
                span,
            });
        }
        let start = self.peek_span();
        let terms = self.parse_type_terms()?;
        Ok(InterfaceElement::Embedded {
            terms,
            span: start.to(&self.previous_span()),
        })
    }

    fn parse_type_terms(&mut self) -> ParseResult<Vec<TypeTerm>> {
        let mut terms = Vec::new();
        loop {
            let tilde = self.peek_is_symbol(Symbol::Tilde);
            if tilde {
                self.advance();
            }
            terms.push(TypeTerm {
                tilde,
                type_expression: self.parse_type()?,
            });
            if self.peek_is_symbol(Symbol::Pipe) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(terms)
    }

    /// A type parameter constraint. Anything beyond a single plain type is
    /// wrapped in an implicit interface, as Go does.
    pub(super) fn parse_constraint(&mut self) -> ParseResult<TypeExpression> {
        let start = self.peek_span();
        let mut terms = self.parse_type_terms()?;
        if terms.len() == 1 && !terms[0].tilde {
            return Ok(terms.remove(0).type_expression);
        }
        let span = start.to(&self.previous_span());
        Ok(TypeExpression::Interface(InterfaceType {
            elements: vec![InterfaceElement::Embedded {
                terms,
                span: span.clone(),
            }],
            span,
        }))
    }
}

fn group_parameters(entries: Vec<ParameterEntry>) -> Vec<Parameter> {
    let any_named = entries
        .iter()
        .any(|entry| matches!(entry, ParameterEntry::Named { .. }));

    if !any_named {
        return entries
            .into_iter()
            .map(|entry| match entry {
                ParameterEntry::Bare(identifier) => Parameter {
                    name: None,
                    type_expression: TypeExpression::Name {
                        span: identifier.span.clone(),
                        qualifier: None,
                        name: identifier,
                        type_arguments: Vec::new(),
                    },
                    variadic: false,
                },
                ParameterEntry::Named {
                    type_expression,
                    variadic,
                    ..
                }
                | ParameterEntry::Unnamed {
                    type_expression,
                    variadic,
                } => Parameter {
                    name: None,
                    type_expression,
                    variadic,
                },
            })
            .collect();
    }

    let mut parameters = Vec::new();
    let mut pending_names = Vec::new();
    for entry in entries {
        match entry {
            ParameterEntry::Bare(identifier) => pending_names.push(identifier),
            ParameterEntry::Named {
                name,
                type_expression,
                variadic,
            } => {
                for pending in pending_names.drain(..) {
                    parameters.push(Parameter {
                        name: Some(pending),
                        type_expression: type_expression.clone(),
                        variadic,
                    });
                }
                parameters.push(Parameter {
                    name: Some(name),
                    type_expression,
                    variadic,
                });
            }
            ParameterEntry::Unnamed {
                type_expression,
                variadic,
            } => {
                // Mixing named and unnamed parameters is invalid Go; keep
                // the type so signatures still line up.
                parameters.push(Parameter {
                    name: None,
                    type_expression,
                    variadic,
                });
            }
        }
    }
    parameters
}
