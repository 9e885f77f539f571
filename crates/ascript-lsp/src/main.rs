use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionParams, CompletionResponse, DidChangeConfigurationParams,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DocumentFormattingParams, DocumentHighlight, DocumentHighlightParams, DocumentSymbolParams,
    DocumentSymbolResponse, FoldingRange, FoldingRangeParams, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverParams, InitializeParams, InitializeResult,
    InitializedParams, InlayHint, InlayHintParams, Location, MessageType, ReferenceParams,
    RenameParams, SemanticTokensParams, SemanticTokensResult, ServerInfo, SignatureHelp,
    SignatureHelpParams, SymbolInformation, TextEdit, WorkspaceEdit, WorkspaceSymbolParams,
};
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::info;

mod server;
use server::LspServer;

struct AscriptLanguageServer {
    client: Client,
    server: Arc<tokio::sync::Mutex<LspServer>>,
}

impl AscriptLanguageServer {
    /// Keeps one delayed task alive while any analysis queue is non-empty.
    /// The task sleeps for the best tier's delay, pops one entry, publishes
    /// its diagnostics, and reschedules itself.
    async fn ensure_scheduler(&self) {
        {
            let mut server = self.server.lock().await;
            if server.scheduler_active || server.next_delay().is_none() {
                return;
            }
            server.scheduler_active = true;
        }
        let server = self.server.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            loop {
                let delay = {
                    let mut guard = server.lock().await;
                    match guard.next_delay() {
                        Some(delay) => delay,
                        None => {
                            guard.scheduler_active = false;
                            break;
                        }
                    }
                };
                tokio::time::sleep(delay).await;
                let published = { server.lock().await.process_one() };
                if let Some((uri, diagnostics)) = published {
                    client.publish_diagnostics(uri, diagnostics, None).await;
                }
            }
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for AscriptLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let settings = LspServer::parse_init_options(params.initialization_options);
        let mut server = self.server.lock().await;
        *server = LspServer::new(settings);

        Ok(InitializeResult {
            capabilities: LspServer::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "ascript-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "AngelScript language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let published = {
            let mut server = self.server.lock().await;
            server.open_document(&uri, &params.text_document.text)
        };
        if let Some((uri, diagnostics)) = published {
            self.client.publish_diagnostics(uri, diagnostics, None).await;
        }
        self.ensure_scheduler().await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // FULL sync: exactly one change with the whole document
        if let Some(change) = params.content_changes.into_iter().next() {
            let mut server = self.server.lock().await;
            server.change_document(&params.text_document.uri, &change.text);
        }
        self.ensure_scheduler().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut server = self.server.lock().await;
        server.close_document(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = LspServer::parse_init_options(Some(params.settings));
        let mut server = self.server.lock().await;
        server.apply_settings(settings);
        drop(server);
        self.ensure_scheduler().await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let mut server = self.server.lock().await;
        Ok(Some(server.get_completions(
            &position.text_document.uri,
            position.position,
        )))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let position = params.text_document_position_params;
        let mut server = self.server.lock().await;
        Ok(server.get_signature_help(&position.text_document.uri, position.position))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let mut server = self.server.lock().await;
        Ok(server.get_hover(&position.text_document.uri, position.position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let mut server = self.server.lock().await;
        Ok(server
            .get_definition(&position.text_document.uri, position.position)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let position = params.text_document_position;
        let mut server = self.server.lock().await;
        let locations = server.get_references(
            &position.text_document.uri,
            position.position,
            params.context.include_declaration,
        );
        Ok(Some(locations))
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let position = params.text_document_position_params;
        let mut server = self.server.lock().await;
        Ok(Some(server.get_document_highlights(
            &position.text_document.uri,
            position.position,
        )))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let mut server = self.server.lock().await;
        Ok(server.get_document_symbols(&params.text_document.uri))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        let server = self.server.lock().await;
        Ok(Some(server.get_workspace_symbols(&params.query)))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let position = params.text_document_position;
        let mut server = self.server.lock().await;
        Ok(server.get_rename_edits(
            &position.text_document.uri,
            position.position,
            &params.new_name,
        ))
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        let mut server = self.server.lock().await;
        Ok(Some(
            server.get_inlay_hints(&params.text_document.uri, params.range),
        ))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let mut server = self.server.lock().await;
        Ok(server
            .get_semantic_tokens(&params.text_document.uri)
            .map(SemanticTokensResult::Tokens))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        let mut server = self.server.lock().await;
        Ok(Some(server.get_folding_ranges(&params.text_document.uri)))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let mut server = self.server.lock().await;
        Ok(Some(server.get_formatting_edits(&params.text_document.uri)))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    info!("starting ascript-lsp");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| AscriptLanguageServer {
        client,
        server: Arc::new(tokio::sync::Mutex::new(LspServer::default())),
    });
    Server::new(stdin, stdout, socket).serve(service).await;
}
