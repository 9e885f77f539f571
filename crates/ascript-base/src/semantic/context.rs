//! State threaded through the hoist and analyze passes, and the two FIFOs
//! of deferred work. The hoist queue fully drains before the first analyze
//! task runs; analyze tasks are independent of one another.

use crate::core::{TextLocation, TextRange};
use crate::semantic::diagnostics::DiagnosticSink;
use crate::semantic::hints::{ReferenceEntry, SymbolKey};
use crate::semantic::scope::{ScopeId, ScopeLinkedNode, SymbolGlobalScope};
use crate::semantic::settings::AnalyzerSettings;
use crate::semantic::symbol::Symbol;
use crate::syntax::ast::{NodeClass, NodeEnum, NodeFunc, NodeFuncDef, NodeInterface, NodeVar, NodeVirtualProp};
use std::collections::VecDeque;
use std::sync::Arc;

pub(crate) struct AnalysisContext<'a> {
    pub global: &'a mut SymbolGlobalScope,
    pub sink: &'a mut DiagnosticSink,
    pub settings: &'a AnalyzerSettings,
}

impl AnalysisContext<'_> {
    /// Records a use-site → symbol reference entry.
    pub fn record_reference(&mut self, from: TextRange, symbol: &Symbol) {
        let entry = ReferenceEntry {
            from: TextLocation::new(self.global.uri.clone(), from),
            to: SymbolKey::of(symbol),
            to_definition: symbol.location(),
        };
        self.global.references.push(entry);
    }

    /// Records a reference from a qualifier segment to the namespace scope
    /// it names. The namespace has no symbol; the declaring segment token of
    /// its namespace node serves as the definition site.
    pub fn record_scope_reference(&mut self, from: TextRange, scope: ScopeId) {
        let target = self.global.scope(scope);
        let Some(name) = target.path.last().cloned() else {
            return;
        };
        let Some(ScopeLinkedNode::Namespace(node)) = &target.linked_node else {
            return;
        };
        let Some(segment) = node.segments.iter().find(|s| s.text == name) else {
            return;
        };
        let mut parent_path = target.path.clone();
        parent_path.pop();
        let entry = ReferenceEntry {
            from: TextLocation::new(self.global.uri.clone(), from),
            to: SymbolKey {
                uri: target.uri.clone(),
                scope_path: parent_path,
                name,
            },
            to_definition: TextLocation::new(target.uri.clone(), segment.range),
        };
        self.global.references.push(entry);
    }
}

/// Deferred hoist steps; the queue may enqueue further steps while
/// draining (base copying is scheduled from inside class setup).
pub(crate) enum DeferredHoist {
    /// Resolve the base list and hoist members of a class
    ClassSetup { scope: ScopeId, node: Arc<NodeClass> },
    /// Copy base members and inject `super`
    ClassBaseCopy { scope: ScopeId, node: Arc<NodeClass> },
    InterfaceSetup {
        scope: ScopeId,
        node: Arc<NodeInterface>,
    },
    InterfaceBaseCopy {
        scope: ScopeId,
        node: Arc<NodeInterface>,
    },
    /// Resolve return/parameter types of one overload
    FuncSignature {
        parent: ScopeId,
        body: ScopeId,
        node: Arc<NodeFunc>,
        overload_index: usize,
        is_instance: bool,
    },
    FuncDefSignature {
        scope: ScopeId,
        node: Arc<NodeFuncDef>,
        overload_index: usize,
    },
    /// Resolve declared types of script/member variables
    VarTypes {
        scope: ScopeId,
        node: Arc<NodeVar>,
        is_instance: bool,
    },
    /// Resolve a virtual property's type; bind its setter `value`
    VirtualPropTypes {
        scope: ScopeId,
        node: Arc<NodeVirtualProp>,
        setter_scope: Option<ScopeId>,
    },
}

/// Body-level work for the analyze pass
pub(crate) enum DeferredAnalyze {
    FuncBody { scope: ScopeId, node: Arc<NodeFunc> },
    VarInit { scope: ScopeId, node: Arc<NodeVar> },
    PropBody {
        scope: ScopeId,
        node: Arc<NodeVirtualProp>,
        is_getter: bool,
    },
    EnumValues { scope: ScopeId, node: Arc<NodeEnum> },
}

#[derive(Default)]
pub(crate) struct AnalysisQueues {
    pub hoist: VecDeque<DeferredHoist>,
    /// Base-member copying, drained only once `hoist` is empty so every
    /// signature an overload copy shares is already in its final form
    pub hoist_late: VecDeque<DeferredHoist>,
    pub analyze: VecDeque<DeferredAnalyze>,
}
