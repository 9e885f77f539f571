use crate::server::LspServer;
use crate::server::helpers::from_lsp_position;
use ascript::semantic::hints::ComplementHint;
use ascript::semantic::symbol::function_signature;
use tower_lsp::lsp_types::{
    ParameterInformation, ParameterLabel, Position, SignatureHelp, SignatureInformation, Url,
};

impl LspServer {
    /// Signature help inside a call's argument list: one signature per
    /// overload; the active parameter saturates at the last parameter.
    pub fn get_signature_help(&mut self, uri: &Url, position: Position) -> Option<SignatureHelp> {
        let path = self.flush_uri(uri)?;
        let scope = self.workspace.record(&path).and_then(|r| r.scope.clone())?;
        let position = from_lsp_position(position);

        let (holder, arg_ranges, selected) = scope.hints.iter().rev().find_map(|hint| match hint {
            ComplementHint::FunctionCall {
                args_range,
                callee_holder,
                arg_ranges,
                selected,
                ..
            } if args_range.contains(position) => {
                Some((callee_holder.clone(), arg_ranges.clone(), *selected))
            }
            _ => None,
        })?;

        let active_parameter = arg_ranges
            .iter()
            .filter(|range| range.end < position)
            .count();

        let signatures: Vec<SignatureInformation> = holder
            .iter()
            .map(|func| {
                let parameters: Vec<ParameterInformation> = func
                    .params
                    .iter()
                    .map(|param| {
                        let label = match &param.name {
                            Some(name) => format!("{} {name}", param.ty.display_name()),
                            None => param.ty.display_name(),
                        };
                        ParameterInformation {
                            label: ParameterLabel::Simple(label),
                            documentation: None,
                        }
                    })
                    .collect();
                let active = active_parameter.min(parameters.len().saturating_sub(1));
                SignatureInformation {
                    label: function_signature(func),
                    documentation: None,
                    parameters: Some(parameters),
                    active_parameter: Some(active as u32),
                }
            })
            .collect();

        Some(SignatureHelp {
            signatures,
            active_signature: Some(selected as u32),
            active_parameter: Some(active_parameter as u32),
        })
    }
}
