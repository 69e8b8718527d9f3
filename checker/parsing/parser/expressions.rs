use crate::lexer::{Keyword, Symbol, TokenKind};
use checker__syntax::{
    BinaryOperator, Expression, Identifier, LiteralKind, TypeAssertion, UnaryOperator,
};

use super::{ParseError, ParseResult, Parser};

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expression(1)
    }

    fn parse_binary_expression(&mut self, minimum_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expression()?;
        while let Some(operator) = self.peek_binary_operator() {
            let precedence = operator.precedence();
            if precedence < minimum_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary_expression(precedence + 1)?;
            let span = left.span().to(right.span());
            left = Expression::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        let TokenKind::Symbol(symbol) = self.peek().kind else {
            return None;
        };
        let operator = match symbol {
            Symbol::PipePipe => BinaryOperator::Or,
            Symbol::AndAnd => BinaryOperator::And,
            Symbol::EqualEqual => BinaryOperator::Equal,
            Symbol::BangEqual => BinaryOperator::NotEqual,
            Symbol::Less => BinaryOperator::Less,
            Symbol::LessEqual => BinaryOperator::LessEqual,
            Symbol::Greater => BinaryOperator::Greater,
            Symbol::GreaterEqual => BinaryOperator::GreaterEqual,
            Symbol::Plus => BinaryOperator::Add,
            Symbol::Minus => BinaryOperator::Subtract,
            Symbol::Pipe => BinaryOperator::BitwiseOr,
            Symbol::Caret => BinaryOperator::BitwiseXor,
            Symbol::Star => BinaryOperator::Multiply,
            Symbol::Slash => BinaryOperator::Divide,
            Symbol::Percent => BinaryOperator::Remainder,
            Symbol::ShiftLeft => BinaryOperator::ShiftLeft,
            Symbol::ShiftRight => BinaryOperator::ShiftRight,
            Symbol::Ampersand => BinaryOperator::BitwiseAnd,
            Symbol::AndNot => BinaryOperator::AndNot,
            _ => return None,
        };
        Some(operator)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let start = self.peek_span();
        let operator = match self.peek().kind {
            TokenKind::Symbol(Symbol::Star) => {
                self.advance();
                let operand = self.parse_unary_expression()?;
                let span = start.to(operand.span());
                return Ok(Expression::Star {
                    operand: Box::new(operand),
                    span,
                });
            }
            // `<-chan T` is a type; `<-ch` receives.
            TokenKind::Symbol(Symbol::Arrow)
                if matches!(self.peek_n(1).kind, TokenKind::Keyword(Keyword::Chan)) =>
            {
                return self.parse_primary_expression();
            }
            TokenKind::Symbol(Symbol::Ampersand) => UnaryOperator::Address,
            TokenKind::Symbol(Symbol::Minus) => UnaryOperator::Negate,
            TokenKind::Symbol(Symbol::Plus) => UnaryOperator::Plus,
            TokenKind::Symbol(Symbol::Bang) => UnaryOperator::Not,
            TokenKind::Symbol(Symbol::Caret) => UnaryOperator::BitwiseComplement,
            TokenKind::Symbol(Symbol::Arrow) => UnaryOperator::Receive,
            _ => return self.parse_primary_expression(),
        };
        self.advance();
        let operand = self.parse_unary_expression()?;
        let span = start.to(operand.span());
        Ok(Expression::Unary {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_operand()?;
        loop {
            expression = match self.peek().kind {
                TokenKind::Symbol(Symbol::Dot) => self.parse_selector_or_assertion(expression)?,
                TokenKind::Symbol(Symbol::LeftParenthesis) => self.parse_call(expression)?,
                TokenKind::Symbol(Symbol::LeftBracket) => self.parse_index_or_slice(expression)?,
                TokenKind::Symbol(Symbol::LeftBrace) if is_literal_type(&expression) => {
                    let Some(type_expression) = expression.as_type_expression() else {
                        return Ok(expression);
                    };
                    self.parse_composite_literal(Some(type_expression))?
                }
                _ => return Ok(expression),
            };
        }
    }

    fn parse_operand(&mut self) -> ParseResult<Expression> {
        let start = self.peek_span();
        let literal = |kind: LiteralKind, value: String| Expression::BasicLiteral {
            kind,
            value,
            span: start.clone(),
        };
        let expression = match self.peek().kind.clone() {
            TokenKind::Identifier(name) => Expression::Identifier(Identifier {
                name,
                span: start.clone(),
            }),
            TokenKind::IntegerLiteral(value) => literal(LiteralKind::Integer, value),
            TokenKind::FloatLiteral(value) => literal(LiteralKind::Float, value),
            TokenKind::ImaginaryLiteral(value) => literal(LiteralKind::Imaginary, value),
            TokenKind::RuneLiteral(value) => literal(LiteralKind::Rune, value),
            TokenKind::StringLiteral(value) => literal(LiteralKind::String, value),
            TokenKind::Symbol(Symbol::LeftParenthesis) => {
                self.advance();
                let inner = self.parse_expression()?;
                let end = self.expect_symbol(Symbol::RightParenthesis, ")")?;
                return Ok(Expression::Parenthesized {
                    inner: Box::new(inner),
                    span: start.to(&end),
                });
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                let signature = self.parse_signature(start.clone())?;
                if !self.peek_is_symbol(Symbol::LeftBrace) {
                    return Ok(Expression::Type(
                        checker__syntax::TypeExpression::Function(signature),
                    ));
                }
                let body = self.parse_block()?;
                let span = start.to(&body.span);
                return Ok(Expression::FunctionLiteral {
                    signature,
                    body,
                    span,
                });
            }
            TokenKind::Symbol(Symbol::LeftBracket | Symbol::Arrow)
            | TokenKind::Keyword(
                Keyword::Map | Keyword::Struct | Keyword::Chan | Keyword::Interface,
            ) => {
                let type_expression = self.parse_type()?;
                if self.peek_is_symbol(Symbol::LeftBrace) {
                    return self.parse_composite_literal(Some(type_expression));
                }
                return Ok(Expression::Type(type_expression));
            }
            _ => {
                return Err(self.missing(ParseError::UnexpectedToken {
                    expected: "expression",
                    span: start.clone(),
                }));
            }
        };
        self.advance();
        Ok(expression)
    }

    fn parse_selector_or_assertion(&mut self, operand: Expression) -> ParseResult<Expression> {
        let dot = self.expect_symbol(Symbol::Dot, ".")?;
        if self.peek_is_symbol(Symbol::LeftParenthesis) {
            self.advance();
            let asserted_type = if self.peek_is_keyword(Keyword::Type) {
                self.advance();
                None
            } else {
                Some(self.parse_type()?)
            };
            let end = self.expect_symbol(Symbol::RightParenthesis, ")")?;
            return Ok(Expression::TypeAssertion {
                operand: Box::new(operand),
                assertion: TypeAssertion {
                    asserted_type,
                    span: dot.to(&end),
                },
            });
        }
        let selector = self.expect_identifier()?;
        let span = operand.span().to(&selector.span);
        Ok(Expression::Selector {
            operand: Box::new(operand),
            selector,
            span,
        })
    }

    fn parse_call(&mut self, function: Expression) -> ParseResult<Expression> {
        self.expect_symbol(Symbol::LeftParenthesis, "(")?;
        let mut arguments = Vec::new();
        let mut has_ellipsis = false;
        loop {
            self.skip_semicolons();
            if self.peek_is_symbol(Symbol::RightParenthesis) {
                break;
            }
            arguments.push(self.parse_expression_or_type()?);
            if self.peek_is_symbol(Symbol::Ellipsis) {
                self.advance();
                has_ellipsis = true;
            }
            if self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.skip_semicolons();
        let end = self.expect_symbol(Symbol::RightParenthesis, ")")?;
        let span = function.span().to(&end);
        Ok(Expression::Call {
            function: Box::new(function),
            arguments,
            has_ellipsis,
            span,
        })
    }

    /// Builtins such as `new` and `make` take a type as their first argument.
    fn parse_expression_or_type(&mut self) -> ParseResult<Expression> {
        if self.peek_is_keyword(Keyword::Map) || self.peek_is_keyword(Keyword::Chan) {
            let type_expression = self.parse_type()?;
            if self.peek_is_symbol(Symbol::LeftBrace) {
                return self.parse_composite_literal(Some(type_expression));
            }
            return Ok(Expression::Type(type_expression));
        }
        self.parse_expression()
    }

    fn parse_index_or_slice(&mut self, operand: Expression) -> ParseResult<Expression> {
        self.expect_symbol(Symbol::LeftBracket, "[")?;
        let mut first = None;
        if !self.peek_is_symbol(Symbol::Colon) {
            first = Some(self.parse_expression_or_type()?);
        }

        if self.peek_is_symbol(Symbol::Colon) {
            let mut bounds = vec![first];
            while self.peek_is_symbol(Symbol::Colon) {
                self.advance();
                if self.peek_is_symbol(Symbol::Colon) || self.peek_is_symbol(Symbol::RightBracket)
                {
                    bounds.push(None);
                } else {
                    bounds.push(Some(self.parse_expression()?));
                }
            }
            let end = self.expect_symbol(Symbol::RightBracket, "]")?;
            let span = operand.span().to(&end);
            return Ok(Expression::Slice {
                operand: Box::new(operand),
                bounds,
                span,
            });
        }

        let mut indices: Vec<Expression> = first.into_iter().collect();
        while self.peek_is_symbol(Symbol::Comma) {
            self.advance();
            if self.peek_is_symbol(Symbol::RightBracket) {
                break;
            }
            indices.push(self.parse_expression_or_type()?);
        }
        let end = self.expect_symbol(Symbol::RightBracket, "]")?;
        let span = operand.span().to(&end);
        Ok(Expression::Index {
            operand: Box::new(operand),
            indices,
            span,
        })
    }

    fn parse_composite_literal(
        &mut self,
        type_expression: Option<checker__syntax::TypeExpression>,
    ) -> ParseResult<Expression> {
        let start = match &type_expression {
            Some(type_expression) => type_expression.span().clone(),
            None => self.peek_span(),
        };
        self.expect_symbol(Symbol::LeftBrace, "{")?;
        let mut elements = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek_is_symbol(Symbol::RightBrace) || self.at_eof() {
                break;
            }
            let element = self.parse_element()?;
            if self.peek_is_symbol(Symbol::Colon) {
                self.advance();
                let value = self.parse_element()?;
                let span = element.span().to(value.span());
                elements.push(Expression::KeyValue {
                    key: Box::new(element),
                    value: Box::new(value),
                    span,
                });
            } else {
                elements.push(element);
            }
            if self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.skip_semicolons();
        let end = self.expect_symbol(Symbol::RightBrace, "}")?;
        Ok(Expression::CompositeLiteral {
            type_expression,
            elements,
            span: start.to(&end),
        })
    }

    /// An element may elide its type: `[]Point{{1, 2}}`.
    fn parse_element(&mut self) -> ParseResult<Expression> {
        if self.peek_is_symbol(Symbol::LeftBrace) {
            return self.parse_composite_literal(None);
        }
        self.parse_expression()
    }
}

/// Operands that can name the type of a composite literal.
fn is_literal_type(expression: &Expression) -> bool {
    match expression {
        Expression::Identifier(_) => true,
        Expression::Selector { operand, .. } => {
            matches!(operand.as_ref(), Expression::Identifier(_))
        }
        Expression::Index { operand, .. } => is_literal_type(operand),
        _ => false,
    }
}
