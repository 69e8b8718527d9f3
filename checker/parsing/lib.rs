mod lexer;
mod parser;

use checker__diagnostics::Diagnostic;
use checker__syntax::ParsedFile;

/// Parses one Go source file. Lexer and parser diagnostics are collected
/// together; any of them fails the file.
pub fn parse_file(source: &str) -> Result<ParsedFile, Vec<Diagnostic>> {
    let mut lexer = lexer::Lexer::new(source);
    let tokens = lexer.lex_all_tokens();
    let (comments, lex_errors) = lexer.into_parts();
    let mut diagnostics: Vec<Diagnostic> = lex_errors
        .into_iter()
        .map(|error| Diagnostic::new(error.message, error.span))
        .collect();

    let mut parser = parser::Parser::new(source, tokens, comments);
    let file = parser.parse_file();
    if let Err(error) = &file {
        parser.report_parse_error(error);
    }
    diagnostics.extend(parser.into_diagnostics());

    match file {
        Ok(file) if diagnostics.is_empty() => Ok(file),
        _ => Err(diagnostics),
    }
}
