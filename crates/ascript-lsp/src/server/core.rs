use ascript::semantic::settings::AnalyzerSettings;
use ascript::semantic::workspace::Workspace;
use std::path::PathBuf;
use std::time::Duration;
use tower_lsp::lsp_types::{
    CompletionOptions, FoldingRangeProviderCapability, HoverProviderCapability, OneOf,
    SemanticTokensFullOptions, SemanticTokensLegend, SemanticTokensOptions,
    SemanticTokensServerCapabilities, ServerCapabilities, SignatureHelpOptions,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgressOptions,
};

/// LspServer owns the analysis workspace behind the protocol handlers.
pub struct LspServer {
    pub(crate) workspace: Workspace,
    /// A delayed-task loop is currently alive
    pub(crate) scheduler_active: bool,
}

impl Default for LspServer {
    fn default() -> Self {
        Self::new(AnalyzerSettings::default())
    }
}

impl LspServer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self {
            workspace: Workspace::new(settings),
            scheduler_active: false,
        }
    }

    /// Parse analyzer settings from the client's initialization options;
    /// anything unexpected falls back to defaults.
    pub fn parse_init_options(options: Option<serde_json::Value>) -> AnalyzerSettings {
        options
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn apply_settings(&mut self, settings: AnalyzerSettings) {
        self.workspace.update_settings(settings);
    }

    pub fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            references_provider: Some(OneOf::Left(true)),
            document_highlight_provider: Some(OneOf::Left(true)),
            document_symbol_provider: Some(OneOf::Left(true)),
            workspace_symbol_provider: Some(OneOf::Left(true)),
            rename_provider: Some(OneOf::Left(true)),
            document_formatting_provider: Some(OneOf::Left(true)),
            inlay_hint_provider: Some(OneOf::Left(true)),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(false),
                trigger_characters: Some(vec![".".to_string(), ":".to_string()]),
                ..Default::default()
            }),
            signature_help_provider: Some(SignatureHelpOptions {
                trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                retrigger_characters: None,
                work_done_progress_options: WorkDoneProgressOptions::default(),
            }),
            folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
            semantic_tokens_provider: Some(
                SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                    legend: Self::semantic_tokens_legend(),
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                    range: None,
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
            ),
            ..Default::default()
        }
    }

    pub fn semantic_tokens_legend() -> SemanticTokensLegend {
        SemanticTokensLegend {
            token_types: crate::server::semantic_tokens::TOKEN_TYPES.to_vec(),
            token_modifiers: Vec::new(),
        }
    }

    /// Converts a document uri into the workspace's record key.
    pub fn uri_to_path(uri: &Url) -> Option<PathBuf> {
        uri.to_file_path().ok()
    }

    pub fn path_to_uri(path: &std::path::Path) -> Option<Url> {
        Url::from_file_path(path).ok()
    }

    /// Delay before the next scheduler wakeup, if any task is queued.
    pub fn next_delay(&self) -> Option<Duration> {
        self.workspace.next_delay()
    }

    /// Runs one queued task; returns the diagnostics set to publish.
    pub fn process_one(&mut self) -> Option<(Url, Vec<tower_lsp::lsp_types::Diagnostic>)> {
        let path = self.workspace.process_next()?;
        let uri = Self::path_to_uri(&path)?;
        let diagnostics = self.diagnostics_for(&path);
        Some((uri, diagnostics))
    }

    /// Makes sure the record for this uri reflects the latest edit before a
    /// request is answered.
    pub fn flush_uri(&mut self, uri: &Url) -> Option<PathBuf> {
        let path = Self::uri_to_path(uri)?;
        self.workspace.flush(&path);
        Some(path)
    }

    pub fn diagnostics_for(
        &self,
        path: &std::path::Path,
    ) -> Vec<tower_lsp::lsp_types::Diagnostic> {
        self.workspace
            .diagnostics(path)
            .into_iter()
            .map(crate::server::helpers::to_lsp_diagnostic)
            .collect()
    }
}
