use checker__source::Span;

#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub package_name: Identifier,
    pub imports: Vec<ImportSpec>,
    pub declarations: Vec<Declaration>,
}

impl ParsedFile {
    pub fn generic_declarations(&self) -> impl Iterator<Item = &GenericDeclaration> {
        self.declarations
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Generic(generic) => Some(generic),
                Declaration::Function(_) => None,
            })
    }

    pub fn function_declarations(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.declarations
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Function(function) => Some(function),
                Declaration::Generic(_) => None,
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Clone, Debug)]
pub struct DocComment {
    pub lines: Vec<String>,
    pub span: Span,
}

impl DocComment {
    /// Comment text with the comment markers removed, one line per source
    /// line.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

#[derive(Clone, Debug)]
pub struct ImportSpec {
    /// Explicit local name, including `_` and `.`.
    pub name: Option<Identifier>,
    pub path: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Generic(GenericDeclaration),
    Function(FunctionDeclaration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclarationToken {
    Const,
    Type,
    Var,
}

/// `type`, `var` and `const` declarations, grouped with parentheses or not.
#[derive(Clone, Debug)]
pub struct GenericDeclaration {
    pub token: DeclarationToken,
    pub doc: Option<DocComment>,
    pub grouped: bool,
    pub specs: Vec<Spec>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Spec {
    Type(TypeSpec),
    Value(ValueSpec),
}

#[derive(Clone, Debug)]
pub struct TypeSpec {
    pub doc: Option<DocComment>,
    pub name: Identifier,
    pub type_parameters: Vec<TypeParameter>,
    pub is_alias: bool,
    pub type_expression: TypeExpression,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TypeParameter {
    pub name: Identifier,
    pub constraint: TypeExpression,
}

#[derive(Clone, Debug)]
pub struct ValueSpec {
    pub doc: Option<DocComment>,
    pub names: Vec<Identifier>,
    pub type_expression: Option<TypeExpression>,
    pub values: Vec<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    pub doc: Option<DocComment>,
    pub receiver: Option<Receiver>,
    pub name: Identifier,
    pub type_parameters: Vec<TypeParameter>,
    pub signature: FunctionType,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Receiver {
    pub name: Option<Identifier>,
    pub pointer: bool,
    pub base_type_name: Identifier,
    pub type_arguments: Vec<Identifier>,
    pub span: Span,
}

/// A function body. Statements are not modelled; the parser records the
/// type-assertion expressions found anywhere inside the braces.
#[derive(Clone, Debug)]
pub struct Block {
    pub type_assertions: Vec<TypeAssertion>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TypeAssertion {
    /// `None` for the `x.(type)` guard of a type switch.
    pub asserted_type: Option<TypeExpression>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FunctionType {
    pub parameters: Vec<Parameter>,
    pub results: Vec<Parameter>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: Option<Identifier>,
    pub type_expression: TypeExpression,
    pub variadic: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelDirection {
    Both,
    Send,
    Receive,
}

#[derive(Clone, Debug)]
pub enum TypeExpression {
    Name {
        qualifier: Option<Identifier>,
        name: Identifier,
        type_arguments: Vec<TypeExpression>,
        span: Span,
    },
    Pointer {
        element: Box<TypeExpression>,
        span: Span,
    },
    Slice {
        element: Box<TypeExpression>,
        span: Span,
    },
    Array {
        /// Source text of the length expression; `None` for `[...]T`.
        length: Option<String>,
        element: Box<TypeExpression>,
        span: Span,
    },
    Map {
        key: Box<TypeExpression>,
        value: Box<TypeExpression>,
        span: Span,
    },
    Channel {
        direction: ChannelDirection,
        element: Box<TypeExpression>,
        span: Span,
    },
    Function(FunctionType),
    Struct(StructType),
    Interface(InterfaceType),
    Parenthesized {
        inner: Box<TypeExpression>,
        span: Span,
    },
}

impl TypeExpression {
    #[must_use]
    pub fn span(&self) -> &Span {
        match self {
            TypeExpression::Name { span, .. }
            | TypeExpression::Pointer { span, .. }
            | TypeExpression::Slice { span, .. }
            | TypeExpression::Array { span, .. }
            | TypeExpression::Map { span, .. }
            | TypeExpression::Channel { span, .. }
            | TypeExpression::Parenthesized { span, .. } => span,
            TypeExpression::Function(function) => &function.span,
            TypeExpression::Struct(structure) => &structure.span,
            TypeExpression::Interface(interface) => &interface.span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StructType {
    pub fields: Vec<FieldDeclaration>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FieldDeclaration {
    /// Empty for an embedded field.
    pub names: Vec<Identifier>,
    pub type_expression: TypeExpression,
    pub tag: Option<String>,
    pub span: Span,
}

impl FieldDeclaration {
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct InterfaceType {
    pub elements: Vec<InterfaceElement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum InterfaceElement {
    Method {
        name: Identifier,
        signature: FunctionType,
        span: Span,
    },
    /// An embedded interface, or a union of type terms in a constraint.
    Embedded { terms: Vec<TypeTerm>, span: Span },
}

#[derive(Clone, Debug)]
pub struct TypeTerm {
    pub tilde: bool,
    pub type_expression: TypeExpression,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    Imaginary,
    Rune,
    String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Address,
    Negate,
    Plus,
    Not,
    BitwiseComplement,
    Receive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    // keep-sorted start
    Add,
    And,
    AndNot,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Divide,
    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Multiply,
    NotEqual,
    Or,
    Remainder,
    ShiftLeft,
    ShiftRight,
    Subtract,
    // keep-sorted end
}

impl BinaryOperator {
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => 3,
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::BitwiseOr
            | BinaryOperator::BitwiseXor => 4,
            BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Remainder
            | BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight
            | BinaryOperator::BitwiseAnd
            | BinaryOperator::AndNot => 5,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expression {
    Identifier(Identifier),
    BasicLiteral {
        kind: LiteralKind,
        value: String,
        span: Span,
    },
    CompositeLiteral {
        type_expression: Option<TypeExpression>,
        elements: Vec<Expression>,
        span: Span,
    },
    KeyValue {
        key: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    FunctionLiteral {
        signature: FunctionType,
        body: Block,
        span: Span,
    },
    Parenthesized {
        inner: Box<Expression>,
        span: Span,
    },
    Selector {
        operand: Box<Expression>,
        selector: Identifier,
        span: Span,
    },
    Index {
        operand: Box<Expression>,
        indices: Vec<Expression>,
        span: Span,
    },
    Slice {
        operand: Box<Expression>,
        bounds: Vec<Option<Expression>>,
        span: Span,
    },
    TypeAssertion {
        operand: Box<Expression>,
        assertion: TypeAssertion,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        has_ellipsis: bool,
        span: Span,
    },
    /// `*x`: a dereference, or a pointer type in expression position as in
    /// `(*T)(nil)`.
    Star {
        operand: Box<Expression>,
        span: Span,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    /// A type used where an expression is expected, as in `[]byte(s)`.
    Type(TypeExpression),
}

impl Expression {
    #[must_use]
    pub fn span(&self) -> &Span {
        match self {
            Expression::Identifier(identifier) => &identifier.span,
            Expression::BasicLiteral { span, .. }
            | Expression::CompositeLiteral { span, .. }
            | Expression::KeyValue { span, .. }
            | Expression::FunctionLiteral { span, .. }
            | Expression::Parenthesized { span, .. }
            | Expression::Selector { span, .. }
            | Expression::Index { span, .. }
            | Expression::Slice { span, .. }
            | Expression::Call { span, .. }
            | Expression::Star { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. } => span,
            Expression::TypeAssertion { assertion, .. } => &assertion.span,
            Expression::Type(type_expression) => type_expression.span(),
        }
    }

    /// Reads the expression as a type, as needed for the operand of a
    /// conversion like `(*T)(nil)` or the type of `T{}` and `pkg.G[int]{}`.
    #[must_use]
    pub fn as_type_expression(&self) -> Option<TypeExpression> {
        match self {
            Expression::Identifier(identifier) => Some(TypeExpression::Name {
                qualifier: None,
                name: identifier.clone(),
                type_arguments: Vec::new(),
                span: identifier.span.clone(),
            }),
            Expression::Selector {
                operand,
                selector,
                span,
            } => {
                let Expression::Identifier(qualifier) = operand.as_ref() else {
                    return None;
                };
                Some(TypeExpression::Name {
                    qualifier: Some(qualifier.clone()),
                    name: selector.clone(),
                    type_arguments: Vec::new(),
                    span: span.clone(),
                })
            }
            Expression::Index {
                operand,
                indices,
                span,
            } => {
                let TypeExpression::Name {
                    qualifier, name, ..
                } = operand.as_type_expression()?
                else {
                    return None;
                };
                let type_arguments = indices
                    .iter()
                    .map(Expression::as_type_expression)
                    .collect::<Option<Vec<_>>>()?;
                Some(TypeExpression::Name {
                    qualifier,
                    name,
                    type_arguments,
                    span: span.clone(),
                })
            }
            Expression::Star { operand, span } => Some(TypeExpression::Pointer {
                element: Box::new(operand.as_type_expression()?),
                span: span.clone(),
            }),
            Expression::Parenthesized { inner, span } => Some(TypeExpression::Parenthesized {
                inner: Box::new(inner.as_type_expression()?),
                span: span.clone(),
            }),
            Expression::Type(type_expression) => Some(type_expression.clone()),
            _ => None,
        }
    }
}
