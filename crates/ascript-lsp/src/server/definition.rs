use crate::server::LspServer;
use crate::server::helpers::{from_lsp_position, reference_at, to_lsp_range};
use tower_lsp::lsp_types::{Location, Position, Url};

impl LspServer {
    /// Goto-definition: the reference entry under the cursor carries the
    /// declaration's identifier-token location.
    pub fn get_definition(&mut self, uri: &Url, position: Position) -> Option<Location> {
        let path = self.flush_uri(uri)?;
        let scope = self.workspace.record(&path).and_then(|r| r.scope.clone())?;
        let reference = reference_at(&scope, from_lsp_position(position))?;
        let definition_uri = Url::from_file_path(&reference.to_definition.uri).ok()?;
        Some(Location {
            uri: definition_uri,
            range: to_lsp_range(reference.to_definition.range),
        })
    }
}
