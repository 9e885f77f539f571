use crate::server::LspServer;
use tower_lsp::lsp_types::{Diagnostic, Url};

impl LspServer {
    /// Open: discover the predefined root, inspect synchronously, and
    /// return the diagnostics to publish for this document.
    pub fn open_document(&mut self, uri: &Url, text: &str) -> Option<(Url, Vec<Diagnostic>)> {
        let path = Self::uri_to_path(uri)?;
        self.workspace.open_document(&path, text);
        Some((uri.clone(), self.diagnostics_for(&path)))
    }

    /// Change: record the content; analysis is debounced through the
    /// direct queue, so no diagnostics are published yet.
    pub fn change_document(&mut self, uri: &Url, text: &str) {
        if let Some(path) = Self::uri_to_path(uri) {
            self.workspace.change_document(&path, text);
        }
    }

    pub fn close_document(&mut self, uri: &Url) {
        if let Some(path) = Self::uri_to_path(uri) {
            self.workspace.close_document(&path);
        }
    }
}
