use crate::server::LspServer;
use crate::server::helpers::{
    from_lsp_position, reference_at, resolve_symbol_key, symbol_declaration, to_lsp_range,
};
use tower_lsp::lsp_types::{Hover, HoverContents, MarkedString, Position, Url};

impl LspServer {
    pub fn get_hover(&mut self, uri: &Url, position: Position) -> Option<Hover> {
        let path = self.flush_uri(uri)?;
        let scope = self.workspace.record(&path).and_then(|r| r.scope.clone())?;
        let reference = reference_at(&scope, from_lsp_position(position))?;

        let content = match resolve_symbol_key(&self.workspace, &reference.to) {
            Some(holder) => symbol_declaration(&holder),
            None => reference.to.name.clone(),
        };
        Some(Hover {
            contents: HoverContents::Scalar(MarkedString::from_language_code(
                "angelscript".to_string(),
                content,
            )),
            range: Some(to_lsp_range(reference.from.range)),
        })
    }
}
