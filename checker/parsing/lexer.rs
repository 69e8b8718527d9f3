use checker__source::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Keyword {
    // keep-sorted start
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
    // keep-sorted end
}

impl Keyword {
    fn from_identifier(text: &str) -> Option<Self> {
        let keyword = match text {
            // keep-sorted start
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "chan" => Keyword::Chan,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "default" => Keyword::Default,
            "defer" => Keyword::Defer,
            "else" => Keyword::Else,
            "fallthrough" => Keyword::Fallthrough,
            "for" => Keyword::For,
            "func" => Keyword::Func,
            "go" => Keyword::Go,
            "goto" => Keyword::Goto,
            "if" => Keyword::If,
            "import" => Keyword::Import,
            "interface" => Keyword::Interface,
            "map" => Keyword::Map,
            "package" => Keyword::Package,
            "range" => Keyword::Range,
            "return" => Keyword::Return,
            "select" => Keyword::Select,
            "struct" => Keyword::Struct,
            "switch" => Keyword::Switch,
            "type" => Keyword::Type,
            "var" => Keyword::Var,
            // keep-sorted end
            _ => return None,
        };
        Some(keyword)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            // keep-sorted start
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Chan => "chan",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Default => "default",
            Keyword::Defer => "defer",
            Keyword::Else => "else",
            Keyword::Fallthrough => "fallthrough",
            Keyword::For => "for",
            Keyword::Func => "func",
            Keyword::Go => "go",
            Keyword::Goto => "goto",
            Keyword::If => "if",
            Keyword::Import => "import",
            Keyword::Interface => "interface",
            Keyword::Map => "map",
            Keyword::Package => "package",
            Keyword::Range => "range",
            Keyword::Return => "return",
            Keyword::Select => "select",
            Keyword::Struct => "struct",
            Keyword::Switch => "switch",
            Keyword::Type => "type",
            Keyword::Var => "var",
            // keep-sorted end
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Symbol {
    // keep-sorted start
    AndAnd,
    AndNot,
    Ampersand,
    Arrow,
    Assign,
    Bang,
    BangEqual,
    Caret,
    Colon,
    Comma,
    Decrement,
    Define,
    Dot,
    Ellipsis,
    EqualEqual,
    Greater,
    GreaterEqual,
    Increment,
    LeftBrace,
    LeftBracket,
    LeftParenthesis,
    Less,
    LessEqual,
    Minus,
    OperatorAssign,
    Percent,
    Pipe,
    PipePipe,
    Plus,
    RightBrace,
    RightBracket,
    RightParenthesis,
    ShiftLeft,
    ShiftRight,
    Slash,
    Star,
    Tilde,
    // keep-sorted end
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Identifier(String),
    IntegerLiteral(String),
    FloatLiteral(String),
    ImaginaryLiteral(String),
    RuneLiteral(String),
    /// Contents between the delimiters, escapes left as written.
    StringLiteral(String),
    Keyword(Keyword),
    Symbol(Symbol),
    /// Raw line break. Removed by semicolon insertion.
    Newline,
    /// Explicit `;` or one inserted at a line end.
    Semicolon,
    EndOfFile,
    Error,
}

#[derive(Clone, Debug)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub(crate) struct LexError {
    pub(crate) message: String,
    pub(crate) span: Span,
}

/// Consecutive comments with no blank line and no token between them.
#[derive(Clone, Debug)]
pub(crate) struct CommentGroup {
    pub(crate) lines: Vec<String>,
    pub(crate) span: Span,
    pub(crate) end_line: usize,
    /// The first comment shares its line with an earlier token.
    pub(crate) trailing: bool,
}

struct Comment {
    text: String,
    span: Span,
    end_line: usize,
    trailing: bool,
    tokens_before: usize,
}

pub(crate) struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    index: usize,
    line: usize,
    column: usize,
    last_token_line: usize,
    token_count: usize,
    comments: Vec<Comment>,
    lex_errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            index: 0,
            line: 1,
            column: 1,
            last_token_line: 0,
            token_count: 0,
            comments: Vec::new(),
            lex_errors: Vec::new(),
        }
    }

    pub(crate) fn lex_all_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_end_of_file = token.kind == TokenKind::EndOfFile;
            if !matches!(token.kind, TokenKind::Newline) {
                self.last_token_line = token.span.line;
                self.token_count += 1;
            }
            tokens.push(token);
            if is_end_of_file {
                break;
            }
        }
        insert_automatic_semicolons(tokens)
    }

    pub(crate) fn into_parts(self) -> (Vec<CommentGroup>, Vec<LexError>) {
        (group_comments(self.comments), self.lex_errors)
    }

    fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            if !self.match_bytes(b"//") && !self.match_bytes(b"/*") {
                break;
            }
            if let Some(newline) = self.lex_comment() {
                return newline;
            }
        }

        let start = self.index;
        let (line, column) = (self.line, self.column);

        if self.index >= self.bytes.len() {
            return Token {
                kind: TokenKind::EndOfFile,
                span: Span {
                    start,
                    end: start,
                    line,
                    column,
                },
            };
        }

        let character = self.peek_byte();
        match character {
            b'\n' => {
                self.advance();
                Token {
                    kind: TokenKind::Newline,
                    span: Span {
                        start,
                        end: start + 1,
                        line,
                        column,
                    },
                }
            }
            b'(' => self.single(Symbol::LeftParenthesis, 1, start, line, column),
            b')' => self.single(Symbol::RightParenthesis, 1, start, line, column),
            b'{' => self.single(Symbol::LeftBrace, 1, start, line, column),
            b'}' => self.single(Symbol::RightBrace, 1, start, line, column),
            b'[' => self.single(Symbol::LeftBracket, 1, start, line, column),
            b']' => self.single(Symbol::RightBracket, 1, start, line, column),
            b',' => self.single(Symbol::Comma, 1, start, line, column),
            b'~' => self.single(Symbol::Tilde, 1, start, line, column),
            b';' => {
                self.advance();
                Token {
                    kind: TokenKind::Semicolon,
                    span: Span {
                        start,
                        end: start + 1,
                        line,
                        column,
                    },
                }
            }
            b'.' => {
                if self.match_bytes(b"...") {
                    self.single(Symbol::Ellipsis, 3, start, line, column)
                } else if self.peek_byte_at(1).is_some_and(|byte| byte.is_ascii_digit()) {
                    self.lex_number(start, line, column)
                } else {
                    self.single(Symbol::Dot, 1, start, line, column)
                }
            }
            b':' => {
                if self.match_bytes(b":=") {
                    self.single(Symbol::Define, 2, start, line, column)
                } else {
                    self.single(Symbol::Colon, 1, start, line, column)
                }
            }
            b'+' => self.operator(
                &[(b"++", Symbol::Increment), (b"+=", Symbol::OperatorAssign)],
                Symbol::Plus,
                start,
                line,
                column,
            ),
            b'-' => self.operator(
                &[(b"--", Symbol::Decrement), (b"-=", Symbol::OperatorAssign)],
                Symbol::Minus,
                start,
                line,
                column,
            ),
            b'*' => self.operator(
                &[(b"*=", Symbol::OperatorAssign)],
                Symbol::Star,
                start,
                line,
                column,
            ),
            b'/' => self.operator(
                &[(b"/=", Symbol::OperatorAssign)],
                Symbol::Slash,
                start,
                line,
                column,
            ),
            b'%' => self.operator(
                &[(b"%=", Symbol::OperatorAssign)],
                Symbol::Percent,
                start,
                line,
                column,
            ),
            b'^' => self.operator(
                &[(b"^=", Symbol::OperatorAssign)],
                Symbol::Caret,
                start,
                line,
                column,
            ),
            b'&' => self.operator(
                &[
                    (b"&^=", Symbol::OperatorAssign),
                    (b"&^", Symbol::AndNot),
                    (b"&&", Symbol::AndAnd),
                    (b"&=", Symbol::OperatorAssign),
                ],
                Symbol::Ampersand,
                start,
                line,
                column,
            ),
            b'|' => self.operator(
                &[(b"||", Symbol::PipePipe), (b"|=", Symbol::OperatorAssign)],
                Symbol::Pipe,
                start,
                line,
                column,
            ),
            b'<' => self.operator(
                &[
                    (b"<<=", Symbol::OperatorAssign),
                    (b"<<", Symbol::ShiftLeft),
                    (b"<=", Symbol::LessEqual),
                    (b"<-", Symbol::Arrow),
                ],
                Symbol::Less,
                start,
                line,
                column,
            ),
            b'>' => self.operator(
                &[
                    (b">>=", Symbol::OperatorAssign),
                    (b">>", Symbol::ShiftRight),
                    (b">=", Symbol::GreaterEqual),
                ],
                Symbol::Greater,
                start,
                line,
                column,
            ),
            b'=' => self.operator(
                &[(b"==", Symbol::EqualEqual)],
                Symbol::Assign,
                start,
                line,
                column,
            ),
            b'!' => self.operator(
                &[(b"!=", Symbol::BangEqual)],
                Symbol::Bang,
                start,
                line,
                column,
            ),
            b'"' => self.lex_interpreted_string(start, line, column),
            b'`' => self.lex_raw_string(start, line, column),
            b'\'' => self.lex_rune(start, line, column),
            b'0'..=b'9' => self.lex_number(start, line, column),
            _ => {
                let character = self.peek_char();
                if character.is_alphabetic() || character == '_' {
                    self.lex_identifier(start, line, column)
                } else {
                    let message = format!("unexpected character '{character}'");
                    self.advance();
                    self.error_token(message, start, line, column)
                }
            }
        }
    }

    fn single(
        &mut self,
        symbol: Symbol,
        length: usize,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token {
        self.advance_by(length);
        Token {
            kind: TokenKind::Symbol(symbol),
            span: Span {
                start,
                end: start + length,
                line,
                column,
            },
        }
    }

    /// Longest match among `candidates`, which must be listed longest first.
    fn operator(
        &mut self,
        candidates: &[(&[u8], Symbol)],
        fallback: Symbol,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token {
        for (bytes, symbol) in candidates {
            if self.match_bytes(bytes) {
                return self.single(*symbol, bytes.len(), start, line, column);
            }
        }
        self.single(fallback, 1, start, line, column)
    }

    /// Consumes one comment. A general comment spanning lines acts like a
    /// newline, which is returned so semicolon insertion still sees it.
    fn lex_comment(&mut self) -> Option<Token> {
        let start = self.index;
        let (line, column) = (self.line, self.column);
        let trailing = self.last_token_line == line;
        let text = if self.match_bytes(b"//") {
            self.advance_by(2);
            let content_start = self.index;
            while self.index < self.bytes.len() && self.peek_byte() != b'\n' {
                self.advance();
            }
            self.source[content_start..self.index]
                .trim_end_matches('\r')
                .to_string()
        } else {
            self.advance_by(2);
            let content_start = self.index;
            while self.index < self.bytes.len() && !self.match_bytes(b"*/") {
                self.advance();
            }
            let content_end = self.index;
            if self.index >= self.bytes.len() {
                self.lex_errors.push(LexError {
                    message: "comment not terminated".to_string(),
                    span: Span {
                        start,
                        end: self.index,
                        line,
                        column,
                    },
                });
            } else {
                self.advance_by(2);
            }
            self.source[content_start..content_end].to_string()
        };

        let end_line = self.line;
        self.comments.push(Comment {
            text,
            span: Span {
                start,
                end: self.index,
                line,
                column,
            },
            end_line,
            trailing,
            tokens_before: self.token_count,
        });

        if end_line > line {
            return Some(Token {
                kind: TokenKind::Newline,
                span: Span {
                    start,
                    end: self.index,
                    line,
                    column,
                },
            });
        }
        None
    }

    fn lex_interpreted_string(&mut self, start: usize, line: usize, column: usize) -> Token {
        self.advance();
        let content_start = self.index;
        while self.index < self.bytes.len() {
            match self.peek_byte() {
                b'"' => {
                    let content = self.source[content_start..self.index].to_string();
                    self.advance();
                    return self.literal(TokenKind::StringLiteral(content), start, line, column);
                }
                b'\\' => self.advance_by(2),
                b'\n' => break,
                _ => self.advance(),
            }
        }
        let message = "string literal not terminated";
        self.error_token(message, start, line, column)
    }

    fn lex_raw_string(&mut self, start: usize, line: usize, column: usize) -> Token {
        self.advance();
        let content_start = self.index;
        while self.index < self.bytes.len() {
            if self.peek_byte() == b'`' {
                let content = self.source[content_start..self.index].to_string();
                self.advance();
                return self.literal(TokenKind::StringLiteral(content), start, line, column);
            }
            self.advance();
        }
        self.error_token("raw string literal not terminated", start, line, column)
    }

    fn lex_rune(&mut self, start: usize, line: usize, column: usize) -> Token {
        self.advance();
        let content_start = self.index;
        while self.index < self.bytes.len() {
            match self.peek_byte() {
                b'\'' => {
                    let content = self.source[content_start..self.index].to_string();
                    self.advance();
                    return self.literal(TokenKind::RuneLiteral(content), start, line, column);
                }
                b'\\' => self.advance_by(2),
                b'\n' => break,
                _ => self.advance(),
            }
        }
        self.error_token("rune literal not terminated", start, line, column)
    }

    fn lex_number(&mut self, start: usize, line: usize, column: usize) -> Token {
        let hexadecimal = self.match_bytes(b"0x") || self.match_bytes(b"0X");
        if hexadecimal {
            self.advance_by(2);
        }
        while self.index < self.bytes.len() {
            let byte = self.peek_byte();
            let exponent = if hexadecimal {
                matches!(byte, b'p' | b'P')
            } else {
                matches!(byte, b'e' | b'E')
            };
            if exponent && matches!(self.peek_byte_at(1), Some(b'+' | b'-')) {
                self.advance_by(2);
            } else if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.source[start..self.index].to_string();
        let kind = if text.ends_with('i') {
            TokenKind::ImaginaryLiteral(text)
        } else if text.contains('.')
            || (hexadecimal && text.contains(['p', 'P']))
            || (!hexadecimal && text.contains(['e', 'E']))
        {
            TokenKind::FloatLiteral(text)
        } else {
            TokenKind::IntegerLiteral(text)
        };
        self.literal(kind, start, line, column)
    }

    fn lex_identifier(&mut self, start: usize, line: usize, column: usize) -> Token {
        while self.index < self.bytes.len() {
            let character = self.peek_char();
            if character.is_alphanumeric() || character == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.index];
        let kind = match Keyword::from_identifier(text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(text.to_string()),
        };
        self.literal(kind, start, line, column)
    }

    fn literal(&self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        Token {
            kind,
            span: Span {
                start,
                end: self.index,
                line,
                column,
            },
        }
    }

    fn error_token(
        &mut self,
        message: impl Into<String>,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token {
        let span = Span {
            start,
            end: self.index,
            line,
            column,
        };
        self.lex_errors.push(LexError {
            message: message.into(),
            span: span.clone(),
        });
        Token {
            kind: TokenKind::Error,
            span,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.index < self.bytes.len() {
            match self.peek_byte() {
                b' ' | b'\t' | b'\r' => self.advance(),
                _ => break,
            }
        }
    }

    /// Steps over one character, keeping line and column in sync.
    fn advance(&mut self) {
        if self.index >= self.bytes.len() {
            return;
        }
        let character = self.peek_char();
        if character == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.index += character.len_utf8();
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek_byte(&self) -> u8 {
        self.bytes[self.index]
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.index + offset).copied()
    }

    fn peek_char(&self) -> char {
        self.source[self.index..].chars().next().unwrap_or('\0')
    }

    fn match_bytes(&self, bytes: &[u8]) -> bool {
        self.bytes.get(self.index..self.index + bytes.len()) == Some(bytes)
    }
}

/// Go's semicolon rule: a line break after an identifier, a literal, one of
/// `break continue fallthrough return`, or one of `++ -- ) ] }` ends the
/// statement. The end of the file behaves like a line break.
fn insert_automatic_semicolons(tokens: Vec<Token>) -> Vec<Token> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut previous_significant_token: Option<Token> = None;

    for token in tokens {
        let at_line_end = matches!(token.kind, TokenKind::Newline | TokenKind::EndOfFile);
        if at_line_end {
            if let Some(previous_token) = previous_significant_token.take() {
                if triggers_semicolon(&previous_token.kind) {
                    output.push(Token {
                        kind: TokenKind::Semicolon,
                        span: previous_token.span,
                    });
                }
            }
            if matches!(token.kind, TokenKind::EndOfFile) {
                output.push(token);
            }
            continue;
        }

        previous_significant_token = Some(token.clone());
        output.push(token);
    }

    output
}

fn triggers_semicolon(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::IntegerLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::ImaginaryLiteral(_)
            | TokenKind::RuneLiteral(_)
            | TokenKind::StringLiteral(_)
            | TokenKind::Symbol(
                Symbol::Increment
                    | Symbol::Decrement
                    | Symbol::RightParenthesis
                    | Symbol::RightBracket
                    | Symbol::RightBrace
            )
            | TokenKind::Keyword(
                Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
            )
    )
}

fn group_comments(comments: Vec<Comment>) -> Vec<CommentGroup> {
    let mut groups: Vec<CommentGroup> = Vec::new();
    let mut previous_tokens_before = None;

    for comment in comments {
        let continues_group = groups.last().is_some_and(|group| {
            previous_tokens_before == Some(comment.tokens_before)
                && comment.span.line <= group.end_line + 1
        });
        previous_tokens_before = Some(comment.tokens_before);

        let lines = comment
            .text
            .lines()
            .map(|line| line.strip_prefix(' ').unwrap_or(line).to_string())
            .collect::<Vec<_>>();
        if continues_group {
            if let Some(group) = groups.last_mut() {
                group.lines.extend(lines);
                group.span = group.span.to(&comment.span);
                group.end_line = comment.end_line;
            }
            continue;
        }
        groups.push(CommentGroup {
            lines,
            span: comment.span,
            end_line: comment.end_line,
            trailing: comment.trailing,
        });
    }

    groups
}
