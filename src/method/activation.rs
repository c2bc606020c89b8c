//! Hand-off points to the VM that actually runs methods
//!
//! Nothing here executes bytecode. A [`Backend`] turns a method into whatever native form it
//! runs (memoized in the method's cache) and builds frames from an [`ActivationRecord`].

use crate::method::{Bytecode, CompiledMethod, Error, LexicalScope, Literal};
use std::fmt::Debug;
use std::sync::Arc;

/// Backend-specific executable form of a method (threaded code, machine code, ...)
pub trait NativeForm: Debug + Send + Sync {
    /// Name of the backend that produced this form
    fn backend_name(&self) -> &str;
}

/// Data a backend needs to set up a call frame for a method
#[derive(Debug)]
pub struct ActivationRecord<'a> {
    pub bytecode: &'a Bytecode,
    pub locals_count: u16,
    pub arguments: &'a [Literal],
    pub receiver: Literal,

    /// Scope of the method's definition (if still alive)
    pub scope: Option<Arc<LexicalScope>>,

    pub block: Option<Literal>,
}

impl<'a> ActivationRecord<'a> {
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Module the method was defined in
    pub fn defining_module(&self) -> Option<&str> {
        self.scope.as_deref().map(LexicalScope::module)
    }
}

/// Compiler and interpreter pair that executes compiled methods
pub trait Backend {
    /// Produce the native form of a method
    fn compile(&self, method: &CompiledMethod) -> Result<Arc<dyn NativeForm>, Error>;

    /// Build a frame from the record and run the native form
    fn activate(
        &self,
        native: &dyn NativeForm,
        record: ActivationRecord<'_>,
    ) -> Result<Literal, Error>;
}

impl CompiledMethod {
    /// Native form for this backend, compiling on first use
    ///
    /// If two threads race to compile, both compile but only the first result is kept.
    pub fn native_form<B: Backend + ?Sized>(
        &self,
        backend: &B,
    ) -> Result<Arc<dyn NativeForm>, Error> {
        if let Some(native) = self.cache() {
            return Ok(native.clone());
        }

        log::debug!(
            "Compiling {} ({} bytes)",
            self.name().unwrap_or("<anonymous>"),
            self.bytecode().len()
        );
        let native = backend.compile(self)?;
        match self.set_cache(native.clone()) {
            Ok(()) => Ok(native),
            Err(_) => Ok(self.cache().cloned().unwrap_or(native)),
        }
    }

    /// Collect what a backend needs to activate this method
    pub fn activation<'a>(
        &'a self,
        receiver: Literal,
        arguments: &'a [Literal],
        block: Option<Literal>,
    ) -> Result<ActivationRecord<'a>, Error> {
        if !self.accepts_argument_count(arguments.len()) {
            return Err(Error::ArgumentCount {
                given: arguments.len(),
                required: self.required_args(),
                total: self.total_args().max(self.required_args()),
            });
        }

        Ok(ActivationRecord {
            bytecode: self.bytecode(),
            locals_count: self.locals_count(),
            arguments,
            receiver,
            scope: self.scope(),
            block,
        })
    }

    /// Compile (if needed) and run this method on a backend
    pub fn invoke<B: Backend + ?Sized>(
        &self,
        backend: &B,
        receiver: Literal,
        arguments: &[Literal],
        block: Option<Literal>,
    ) -> Result<Literal, Error> {
        let native = self.native_form(backend)?;
        let record = self.activation(receiver, arguments, block)?;
        backend.activate(native.as_ref(), record)
    }
}
