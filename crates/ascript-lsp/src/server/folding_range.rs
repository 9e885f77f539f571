use crate::server::LspServer;
use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind, Url};

impl LspServer {
    /// Folding ranges come straight from the analyzer's scope regions.
    pub fn get_folding_ranges(&mut self, uri: &Url) -> Vec<FoldingRange> {
        let Some(path) = self.flush_uri(uri) else {
            return Vec::new();
        };
        let Some(scope) = self.workspace.record(&path).and_then(|r| r.scope.clone()) else {
            return Vec::new();
        };
        scope
            .scope_regions
            .iter()
            .filter(|region| region.range.end.line > region.range.start.line)
            .map(|region| FoldingRange {
                start_line: region.range.start.line,
                start_character: Some(region.range.start.character),
                end_line: region.range.end.line,
                end_character: Some(region.range.end.character),
                kind: Some(FoldingRangeKind::Region),
                collapsed_text: None,
            })
            .collect()
    }
}
