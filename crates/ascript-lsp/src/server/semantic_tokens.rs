use crate::server::LspServer;
use crate::server::helpers::resolve_symbol_key;
use ascript::semantic::hints::ReferenceEntry;
use ascript::semantic::symbol::{SymbolHolder, TypeKind};
use tower_lsp::lsp_types::{SemanticToken, SemanticTokenType, SemanticTokens, Url};

pub const TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::NAMESPACE,
    SemanticTokenType::TYPE,
    SemanticTokenType::CLASS,
    SemanticTokenType::ENUM,
    SemanticTokenType::INTERFACE,
    SemanticTokenType::TYPE_PARAMETER,
    SemanticTokenType::FUNCTION,
    SemanticTokenType::METHOD,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::PROPERTY,
    SemanticTokenType::ENUM_MEMBER,
];

fn token_index(token: &SemanticTokenType) -> u32 {
    TOKEN_TYPES.iter().position(|t| t == token).unwrap_or(0) as u32
}

impl LspServer {
    /// Semantic tokens from the reference list: each resolved use site is
    /// classified by the kind of symbol it resolves to.
    pub fn get_semantic_tokens(&mut self, uri: &Url) -> Option<SemanticTokens> {
        let path = self.flush_uri(uri)?;
        let scope = self.workspace.record(&path).and_then(|r| r.scope.clone())?;
        let this_uri = path.display().to_string();

        let mut classified: Vec<(u32, u32, u32, u32)> = scope
            .references
            .iter()
            .filter(|r| r.from.uri == this_uri && r.from.range.start.line == r.from.range.end.line)
            .filter_map(|reference| {
                let range = reference.from.range;
                let length = range.end.character.checked_sub(range.start.character)?;
                if length == 0 {
                    return None;
                }
                let token_type = self.classify_reference(reference);
                Some((range.start.line, range.start.character, length, token_type))
            })
            .collect();
        classified.sort();
        classified.dedup_by_key(|entry| (entry.0, entry.1));

        let mut data = Vec::with_capacity(classified.len());
        let mut prev_line = 0;
        let mut prev_char = 0;
        for (line, character, length, token_type) in classified {
            let delta_line = line - prev_line;
            let delta_start = if delta_line == 0 {
                character - prev_char
            } else {
                character
            };
            data.push(SemanticToken {
                delta_line,
                delta_start,
                length,
                token_type,
                token_modifiers_bitset: 0,
            });
            prev_line = line;
            prev_char = character;
        }
        Some(SemanticTokens {
            result_id: None,
            data,
        })
    }

    fn classify_reference(&self, reference: &ReferenceEntry) -> u32 {
        let Some(holder) = resolve_symbol_key(&self.workspace, &reference.to) else {
            // Scope references without a symbol are namespaces
            return token_index(&SemanticTokenType::NAMESPACE);
        };
        let token = match &holder {
            SymbolHolder::Type(symbol) => match symbol.kind {
                TypeKind::Class => SemanticTokenType::CLASS,
                TypeKind::Interface => SemanticTokenType::INTERFACE,
                TypeKind::Enum => SemanticTokenType::ENUM,
                TypeKind::TemplateParam => SemanticTokenType::TYPE_PARAMETER,
                TypeKind::Primitive(_) | TypeKind::Typedef(_) => SemanticTokenType::TYPE,
            },
            SymbolHolder::Variable(variable) => {
                if variable.ty.type_symbol().is_some_and(|t| t.kind == TypeKind::Enum)
                    && !variable.is_instance_member
                    && variable.scope_path.last()
                        == variable.ty.type_symbol().map(|t| &t.ident.text)
                {
                    SemanticTokenType::ENUM_MEMBER
                } else if variable.is_instance_member {
                    SemanticTokenType::PROPERTY
                } else {
                    SemanticTokenType::VARIABLE
                }
            }
            SymbolHolder::Functions(overloads) => {
                if overloads.first().is_some_and(|f| f.is_instance_member) {
                    SemanticTokenType::METHOD
                } else {
                    SemanticTokenType::FUNCTION
                }
            }
        };
        token_index(&token)
    }
}
