use crate::server::LspServer;
use crate::server::helpers::{from_lsp_position, to_lsp_position};
use ascript::semantic::hints::ComplementHint;
use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, Range, Url};

impl LspServer {
    /// Inlay hints: inferred `auto` types and parameter names at call
    /// sites.
    pub fn get_inlay_hints(&mut self, uri: &Url, range: Range) -> Vec<InlayHint> {
        let Some(path) = self.flush_uri(uri) else {
            return Vec::new();
        };
        let Some(scope) = self.workspace.record(&path).and_then(|r| r.scope.clone()) else {
            return Vec::new();
        };
        let start = from_lsp_position(range.start);
        let end = from_lsp_position(range.end);

        let mut hints = Vec::new();
        for hint in &scope.hints {
            match hint {
                ComplementHint::AutoTypeResolution { auto_range, ty } => {
                    if auto_range.start < start || end < auto_range.end {
                        continue;
                    }
                    hints.push(InlayHint {
                        position: to_lsp_position(auto_range.end),
                        label: InlayHintLabel::String(format!(": {}", ty.display_name())),
                        kind: Some(InlayHintKind::TYPE),
                        text_edits: None,
                        tooltip: None,
                        padding_left: Some(false),
                        padding_right: Some(true),
                        data: None,
                    });
                }
                ComplementHint::FunctionCall {
                    arg_ranges,
                    callee_holder,
                    selected,
                    ..
                } => {
                    let Some(func) = callee_holder.get(*selected) else {
                        continue;
                    };
                    for (arg_range, param) in arg_ranges.iter().zip(&func.params) {
                        if arg_range.start < start || end < arg_range.end {
                            continue;
                        }
                        let Some(name) = &param.name else { continue };
                        hints.push(InlayHint {
                            position: to_lsp_position(arg_range.start),
                            label: InlayHintLabel::String(format!("{name}:")),
                            kind: Some(InlayHintKind::PARAMETER),
                            text_edits: None,
                            tooltip: None,
                            padding_left: Some(false),
                            padding_right: Some(true),
                            data: None,
                        });
                    }
                }
                _ => {}
            }
        }
        hints
    }
}
