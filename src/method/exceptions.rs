use std::slice::Iter;

/// What a handler does once control reaches it
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HandlerKind {
    /// Handler inspects the exception and may swallow it
    Rescue,

    /// Handler always runs, then re-raises
    Ensure,
}

/// Entry in the exception table
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ExceptionHandler {
    /// Start of the protected range (inclusive)
    pub start_offset: usize,

    /// End of the protected range (exclusive)
    pub end_offset: usize,

    /// Start of the handler code
    pub handler_offset: usize,

    pub kind: HandlerKind,
}

impl ExceptionHandler {
    pub fn new(
        start_offset: usize,
        end_offset: usize,
        handler_offset: usize,
        kind: HandlerKind,
    ) -> ExceptionHandler {
        ExceptionHandler {
            start_offset,
            end_offset,
            handler_offset,
            kind,
        }
    }

    /// Is this offset inside the protected range?
    pub fn protects(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }
}

/// Exception handlers of a method, in the order the VM should try them
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExceptionTable(Vec<ExceptionHandler>);

impl ExceptionTable {
    pub fn new() -> ExceptionTable {
        ExceptionTable(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, handler: ExceptionHandler) {
        self.0.push(handler);
    }

    pub fn get(&self, index: usize) -> Option<&ExceptionHandler> {
        self.0.get(index)
    }

    pub fn iter(&self) -> Iter<'_, ExceptionHandler> {
        self.0.iter()
    }

    /// Handlers protecting `offset`, in table order
    pub fn covering(&self, offset: usize) -> impl Iterator<Item = &ExceptionHandler> + '_ {
        self.0.iter().filter(move |handler| handler.protects(offset))
    }
}

impl From<Vec<ExceptionHandler>> for ExceptionTable {
    fn from(handlers: Vec<ExceptionHandler>) -> ExceptionTable {
        ExceptionTable(handlers)
    }
}

impl<'a> IntoIterator for &'a ExceptionTable {
    type Item = &'a ExceptionHandler;
    type IntoIter = Iter<'a, ExceptionHandler>;

    fn into_iter(self) -> Iter<'a, ExceptionHandler> {
        self.0.iter()
    }
}
