//! Consumer-side checks over a finished token stream
//!
//! The lexer itself never reports malformed input. These helpers apply the
//! policy a consuming parser would: end of input while nested is an error,
//! ignored characters inside an entry are warnings.

use crate::lexer::{Lexer, Truncation};
use crate::token::{Token, TokenKind};
use biblex_error::{
    span::{Position, Span},
    Diagnostic, Diagnostics, ErrorCode, LexFault,
};
use tracing::debug;

/// Tokenizes `source` to the end and checks the result
pub fn tokenize(source: &str, file_id: u32) -> Result<(Vec<Token<'_>>, Diagnostics), LexFault> {
    let mut lexer = Lexer::new(source, file_id);
    let tokens = lexer.tokenize()?;
    let diagnostics = check(&lexer, &tokens);
    Ok((tokens, diagnostics))
}

/// Builds diagnostics for tokens produced by `lexer`
///
/// `tokens` should end with the `EndOfInput` the lexer stopped at.
pub fn check(lexer: &Lexer<'_>, tokens: &[Token<'_>]) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for token in tokens.iter().filter(|t| t.is(TokenKind::Ignore)) {
        diagnostics.push(
            Diagnostic::warning(format!("ignored character `{}` inside entry", token.text))
                .with_code(ErrorCode::IGNORED_CHAR)
                .with_label(token.span, "not part of the entry syntax"),
        );
    }

    if let Some(eof) = tokens.last().filter(|t| t.is_eof()) {
        if lexer.is_nested() {
            let truncation = lexer.truncation().unwrap_or(Truncation::Entry);
            debug!(?truncation, line = eof.line(), column = eof.column(), "truncated input");
            diagnostics.push(truncation_diagnostic(lexer, eof, truncation));
        }
    }

    diagnostics
}

fn truncation_diagnostic(lexer: &Lexer<'_>, eof: &Token<'_>, truncation: Truncation) -> Diagnostic {
    let file_id = lexer.file_id();
    let end = Span::point(lexer.position(), file_id);

    let diagnostic = match truncation {
        Truncation::Entry => {
            let help = match lexer.entry_brace_depth() {
                0 => "an entry needs a `{` after its type".to_string(),
                1 => "add the missing `}`".to_string(),
                n => format!("add the {} missing `}}`", n),
            };
            Diagnostic::error("unterminated entry")
                .with_code(ErrorCode::UNTERMINATED_ENTRY)
                .with_label(end, "input ends inside this entry")
                .with_help(help)
        }
        Truncation::BracedString => Diagnostic::error("unterminated braced string")
            .with_code(ErrorCode::UNTERMINATED_BRACED_STRING)
            .with_label(eof.span, "braced string starts here")
            .with_help("add the missing `}`"),
        Truncation::QuotedString => Diagnostic::error("unterminated quoted string")
            .with_code(ErrorCode::UNTERMINATED_QUOTED_STRING)
            .with_label(eof.span, "quoted string starts here")
            .with_help("add the closing `\"`"),
        Truncation::Text => Diagnostic::error(format!("input ends in the middle of `{}`", eof.text))
            .with_code(ErrorCode::TRUNCATED_TEXT)
            .with_label(eof.span, "text runs into the end of input"),
    };

    match lexer.entry_start() {
        Some(at) => diagnostic.with_secondary_label(at_sign(at, file_id), "entry starts here"),
        None => diagnostic,
    }
}

/// Span covering the single `@` character at `at`
fn at_sign(at: Position, file_id: u32) -> Span {
    let mut end = at;
    end.advance('@');
    Span::new(at, end, file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblex_error::Level;
    use pretty_assertions::assert_eq;

    fn codes(source: &str) -> Vec<String> {
        let (_, diagnostics) = tokenize(source, 0).unwrap();
        diagnostics
            .iter()
            .filter_map(|d| d.code.map(|c| c.to_string()))
            .collect()
    }

    #[test]
    fn test_clean_input_has_no_diagnostics() {
        let (tokens, diagnostics) = tokenize("@book{b, title = {T}}\n", 0).unwrap();
        assert!(diagnostics.is_empty());
        assert!(tokens.last().unwrap().is_eof());
    }

    #[test]
    fn test_truncation_codes() {
        assert_eq!(codes("@misc{x, note = {open"), vec!["EL002"]);
        assert_eq!(codes("@misc{x, note = \"open"), vec!["EL003"]);
        assert_eq!(codes("@misc{x, note = open"), vec!["EL004"]);
        assert_eq!(codes("@misc{x, note = open,"), vec!["EL001"]);
        assert_eq!(codes("@misc"), vec!["EL004"]);
    }

    #[test]
    fn test_ignored_characters_are_warnings() {
        let (_, diagnostics) = tokenize("@misc{x, ; note = 1 ;}", 0).unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.warning_count(), 2);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_truncation_points_at_string_and_entry() {
        let source = "@a{ok}\n@misc{x,\n  note = {open";
        let (_, diagnostics) = tokenize(source, 0).unwrap();
        let diagnostic = diagnostics.iter().next().unwrap();

        assert_eq!(diagnostic.level, Level::Error);
        let primary = diagnostic.primary_span().unwrap();
        assert_eq!((primary.start.line, primary.start.column), (3, 11));

        let secondary = &diagnostic.labels[1];
        assert!(!secondary.primary);
        assert_eq!((secondary.span.start.line, secondary.span.start.column), (2, 1));
        assert_eq!(secondary.span.len(), 1);
    }

    #[test]
    fn test_unterminated_entry_help_counts_braces() {
        let (_, diagnostics) = tokenize("@misc{x, y = 1", 0).unwrap();
        // `1` runs into the end: a text truncation
        assert_eq!(diagnostics.iter().next().unwrap().code, Some(ErrorCode::TRUNCATED_TEXT));

        let (_, diagnostics) = tokenize("@misc{x, y = 1 ", 0).unwrap();
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.code, Some(ErrorCode::UNTERMINATED_ENTRY));
        assert_eq!(diagnostic.help, vec!["add the missing `}`".to_string()]);

        let (_, diagnostics) = tokenize("@misc ", 0).unwrap();
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.help, vec!["an entry needs a `{` after its type".to_string()]);
    }
}
