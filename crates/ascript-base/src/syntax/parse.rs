//! Error-tolerant parse entry point.
//!
//! A full-file parse is attempted first. When it fails the error is captured
//! as a value and the file is re-parsed chunk by chunk (top-level
//! declarations split at brace/semicolon boundaries), keeping every chunk
//! that parses on its own. Editor features keep working on broken files.

use crate::core::text_utils::LineIndex;
use crate::core::{TextPosition, TextRange};
use crate::parser::{AngelScriptParser, Rule};
use crate::syntax::ast::NodeScript;
use crate::syntax::lower::Lower;
use pest::Parser;

/// A syntax error with its source range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

/// Outcome of parsing one document; the script is always present (possibly
/// partial) so analysis can proceed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScript {
    pub script: NodeScript,
    pub errors: Vec<ParseError>,
}

/// Parses AngelScript source, recovering per top-level declaration.
pub fn parse_script(text: &str) -> ParsedScript {
    let index = LineIndex::new(text);

    match AngelScriptParser::parse(Rule::script, text) {
        Ok(mut pairs) => {
            let mut script = NodeScript::default();
            if let Some(pair) = pairs.next() {
                Lower::new(&index, 0).script(pair, &mut script);
            }
            ParsedScript {
                script,
                errors: Vec::new(),
            }
        }
        Err(parse_error) => {
            let error = ParseError {
                message: format!("Syntax error: {}", parse_error.variant.message()),
                range: error_range(&parse_error),
            };
            let script = parse_chunks(text, &index);
            ParsedScript {
                script,
                errors: vec![error],
            }
        }
    }
}

fn error_range(error: &pest::error::Error<Rule>) -> TextRange {
    let ((l1, c1), (l2, c2)) = match error.line_col {
        pest::error::LineColLocation::Pos((l, c)) => ((l, c), (l, c + 1)),
        pest::error::LineColLocation::Span((l1, c1), (l2, c2)) => ((l1, c1), (l2, c2)),
    };
    TextRange::new(
        TextPosition::new(l1.saturating_sub(1) as u32, c1.saturating_sub(1) as u32),
        TextPosition::new(l2.saturating_sub(1) as u32, c2.saturating_sub(1) as u32),
    )
}

/// Splits the document at top-level `;` / `}` boundaries and parses each
/// chunk independently, merging the chunks that succeed.
fn parse_chunks(text: &str, index: &LineIndex) -> NodeScript {
    let mut script = NodeScript::default();
    for (start, end) in top_level_chunks(text) {
        let chunk = &text[start..end];
        if chunk.trim().is_empty() {
            continue;
        }
        if let Ok(mut pairs) = AngelScriptParser::parse(Rule::script, chunk) {
            if let Some(pair) = pairs.next() {
                Lower::new(index, start).script(pair, &mut script);
            }
        }
    }
    script
}

/// Byte ranges of top-level declarations, found by scanning brace depth
/// while skipping strings and comments.
fn top_level_chunks(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut chunks = Vec::new();
    let mut chunk_start = 0usize;
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth <= 0 {
                    depth = 0;
                    // Swallow an optional trailing `;` (class/enum bodies)
                    let mut end = i + 1;
                    while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
                        end += 1;
                    }
                    if end < bytes.len() && bytes[end] == b';' {
                        i = end;
                    }
                    chunks.push((chunk_start, i + 1));
                    chunk_start = i + 1;
                }
            }
            b';' if depth == 0 => {
                chunks.push((chunk_start, i + 1));
                chunk_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if chunk_start < bytes.len() {
        chunks.push((chunk_start, bytes.len()));
    }
    chunks
}

#[cfg(test)]
#[path = "parse/tests.rs"]
mod tests;
