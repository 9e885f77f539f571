use crate::server::LspServer;
use ascript::semantic::settings::FormatterSettings;
use tower_lsp::lsp_types::{Position, Range, TextEdit, Url};

impl LspServer {
    /// Conservative whitespace formatting: trailing whitespace removed,
    /// blank runs clamped to `maxBlankLines`, indentation normalized to
    /// brace depth. Tokens are never rewritten.
    pub fn get_formatting_edits(&mut self, uri: &Url) -> Vec<TextEdit> {
        let Some(path) = self.flush_uri(uri) else {
            return Vec::new();
        };
        let Some(record) = self.workspace.record(&path) else {
            return Vec::new();
        };
        let settings = self.workspace.settings().formatter.clone();
        let original = record.content.clone();
        let formatted = format_source(&original, &settings);
        if formatted == original {
            return Vec::new();
        }
        let end_line = original.lines().count() as u32 + 1;
        vec![TextEdit {
            range: Range {
                start: Position::new(0, 0),
                end: Position::new(end_line, 0),
            },
            new_text: formatted,
        }]
    }
}

fn indent_unit(settings: &FormatterSettings) -> String {
    if settings.use_tab_indent {
        "\t".to_string()
    } else {
        " ".repeat(settings.indent_spaces as usize)
    }
}

pub(crate) fn format_source(source: &str, settings: &FormatterSettings) -> String {
    let unit = indent_unit(settings);
    let mut out = String::with_capacity(source.len());
    let mut depth: i32 = 0;
    let mut blank_run: u32 = 0;
    let mut in_block_comment = false;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run <= settings.max_blank_lines {
                out.push('\n');
            }
            continue;
        }
        blank_run = 0;

        if in_block_comment {
            // Leave comment bodies untouched apart from trailing space
            out.push_str(line.trim_end());
            out.push('\n');
            in_block_comment = !block_comment_closes(line, &mut 0);
            continue;
        }

        let (opens, closes, still_open) = brace_balance(trimmed);
        let leading_close = trimmed.starts_with('}');
        let level = (depth - i32::from(leading_close)).max(0) as usize;
        for _ in 0..level {
            out.push_str(&unit);
        }
        out.push_str(trimmed);
        out.push('\n');
        depth = (depth + opens - closes).max(0);
        in_block_comment = still_open;
    }
    out
}

/// Counts braces outside strings and comments; reports whether the line
/// ends inside an unterminated block comment.
fn brace_balance(line: &str) -> (i32, i32, bool) {
    let bytes = line.as_bytes();
    let mut opens = 0;
    let mut closes = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let mut j = i + 2;
                if !block_comment_closes(&line[j.min(line.len())..], &mut j) {
                    return (opens, closes, true);
                }
                i = j;
                continue;
            }
            b'{' => opens += 1,
            b'}' => closes += 1,
            _ => {}
        }
        i += 1;
    }
    (opens, closes, false)
}

/// Scans for `*/`; advances `consumed` past it when found.
fn block_comment_closes(rest: &str, consumed: &mut usize) -> bool {
    match rest.find("*/") {
        Some(at) => {
            *consumed += at + 2;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clamps_blank_lines_and_indents() {
        let settings = FormatterSettings::default();
        let source = "void main() {\nint x;\n\n\n\nint y;\n}\n";
        let formatted = format_source(source, &settings);
        assert_eq!(formatted, "void main() {\n    int x;\n\n    int y;\n}\n");
    }

    #[test]
    fn test_format_ignores_braces_in_strings_and_comments() {
        let settings = FormatterSettings::default();
        let source = "void main() {\nstring s = \"{{{\"; // }\nint x;\n}\n";
        let formatted = format_source(source, &settings);
        assert_eq!(
            formatted,
            "void main() {\n    string s = \"{{{\"; // }\n    int x;\n}\n"
        );
    }

    #[test]
    fn test_format_tab_indent() {
        let settings = FormatterSettings {
            use_tab_indent: true,
            ..FormatterSettings::default()
        };
        let formatted = format_source("class C {\nint x;\n}\n", &settings);
        assert_eq!(formatted, "class C {\n\tint x;\n}\n");
    }
}
