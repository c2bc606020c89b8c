use std::sync::Arc;

/// Lexical scope a method was defined in
///
/// Only the chain structure matters here: the module the scope belongs to and the enclosing
/// scope. Name resolution happens in the VM.
#[derive(Debug)]
pub struct LexicalScope {
    module: String,
    parent: Option<Arc<LexicalScope>>,
}

impl LexicalScope {
    /// Outermost scope for a module
    pub fn top_level(module: impl Into<String>) -> Arc<LexicalScope> {
        Arc::new(LexicalScope {
            module: module.into(),
            parent: None,
        })
    }

    /// Scope for `module`, nested inside `parent`
    pub fn nested(module: impl Into<String>, parent: &Arc<LexicalScope>) -> Arc<LexicalScope> {
        Arc::new(LexicalScope {
            module: module.into(),
            parent: Some(parent.clone()),
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn parent(&self) -> Option<&Arc<LexicalScope>> {
        self.parent.as_ref()
    }

    /// Walk from this scope outwards
    pub fn ancestors(&self) -> impl Iterator<Item = &LexicalScope> {
        std::iter::successors(Some(self), |scope| scope.parent.as_deref())
    }
}
