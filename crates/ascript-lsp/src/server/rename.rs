use crate::server::LspServer;
use crate::server::helpers::to_lsp_range;
use std::collections::{HashMap, HashSet};
use tower_lsp::lsp_types::{Position, TextEdit, Url, WorkspaceEdit};

impl LspServer {
    /// Rename: one text edit per reference and one for the declaration
    /// token, grouped by file.
    pub fn get_rename_edits(
        &mut self,
        uri: &Url,
        position: Position,
        new_name: &str,
    ) -> Option<WorkspaceEdit> {
        let key = self.key_at(uri, position)?;
        let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();
        let mut seen: HashSet<(String, u32, u32)> = HashSet::new();

        let mut push = |seen: &mut HashSet<(String, u32, u32)>,
                        changes: &mut HashMap<Url, Vec<TextEdit>>,
                        file: &str,
                        range: ascript::core::TextRange| {
            if !seen.insert((file.to_string(), range.start.line, range.start.character)) {
                return;
            }
            if let Ok(edit_uri) = Url::from_file_path(file) {
                changes.entry(edit_uri).or_default().push(TextEdit {
                    range: to_lsp_range(range),
                    new_text: new_name.to_string(),
                });
            }
        };

        for record in self.workspace.records() {
            let Some(scope) = &record.scope else { continue };
            for reference in &scope.references {
                if reference.to != key {
                    continue;
                }
                push(&mut seen, &mut changes, &reference.from.uri, reference.from.range);
                push(
                    &mut seen,
                    &mut changes,
                    &reference.to_definition.uri,
                    reference.to_definition.range,
                );
            }
        }

        if changes.is_empty() {
            return None;
        }
        Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        })
    }
}
