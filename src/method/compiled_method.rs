use crate::method::{
    decode, Bytecode, BytecodeBuffer, Error, ExceptionHandler, ExceptionTable, Instruction,
    InstructionSet, LexicalScope, LineTable, Literal, LiteralPool, NativeForm, NOT_FOUND,
    UNKNOWN_LINE,
};
use crate::util::{Offset, OffsetResult};
use std::sync::{Arc, OnceLock, Weak};

/// Everything needed to build a [`CompiledMethod`] in one go
///
/// Fields left at their default are absent/empty.
#[derive(Debug, Default)]
pub struct MethodParts {
    pub bytecode: Bytecode,
    pub required_args: u16,
    pub total_args: u16,
    pub locals_count: u16,
    pub literals: LiteralPool,
    pub exceptions: Option<ExceptionTable>,
    pub lines: Option<LineTable>,
    pub scope: Option<Arc<LexicalScope>>,
    pub name: Option<String>,
    pub defining_file: Option<String>,
    pub path: Option<String>,
    pub local_names: Vec<String>,
    pub serial: u64,
}

/// Executable form of one method: bytecode plus its side tables
///
/// A method is put together once (by a compiler or loader) and then only read. Mutators take
/// `&mut self`, so sharing a method behind an `Arc` freezes it. The one exception is the native
/// form cache, which can be filled exactly once through a shared reference.
#[derive(Debug)]
pub struct CompiledMethod {
    bytecode: Bytecode,
    required_args: u16,
    total_args: u16,
    locals_count: u16,
    literals: LiteralPool,
    exceptions: Option<ExceptionTable>,
    lines: Option<LineTable>,

    /// Enclosing scope, not kept alive by the method
    scope: Weak<LexicalScope>,

    name: Option<String>,
    defining_file: Option<String>,
    path: Option<String>,
    local_names: Vec<String>,

    /// Stamp used by caches outside the method to detect redefinition
    serial: u64,

    /// Native form produced by a backend (filled at most once)
    cache: OnceLock<Arc<dyn NativeForm>>,
}

impl CompiledMethod {
    /// Build a method with every field specified
    pub fn new(parts: MethodParts) -> CompiledMethod {
        CompiledMethod {
            bytecode: parts.bytecode,
            required_args: parts.required_args,
            total_args: parts.total_args,
            locals_count: parts.locals_count,
            literals: parts.literals,
            exceptions: parts.exceptions,
            lines: parts.lines,
            scope: parts.scope.as_ref().map_or_else(Weak::new, Arc::downgrade),
            name: parts.name,
            defining_file: parts.defining_file,
            path: parts.path,
            local_names: parts.local_names,
            serial: parts.serial,
            cache: OnceLock::new(),
        }
    }

    /// Minimal method around a bytecode buffer
    ///
    /// `total_args` starts at 0 and the literal pool empty. There are no exception or line
    /// tables, and no identifying metadata.
    pub fn from_raw_parts(
        bytecode: Bytecode,
        locals_count: u16,
        required_args: u16,
    ) -> CompiledMethod {
        CompiledMethod::new(MethodParts {
            bytecode,
            locals_count,
            required_args,
            ..MethodParts::default()
        })
    }

    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    pub fn required_args(&self) -> u16 {
        self.required_args
    }

    pub fn total_args(&self) -> u16 {
        self.total_args
    }

    pub fn locals_count(&self) -> u16 {
        self.locals_count
    }

    pub fn literals(&self) -> &LiteralPool {
        &self.literals
    }

    pub fn exceptions(&self) -> Option<&ExceptionTable> {
        self.exceptions.as_ref()
    }

    pub fn lines(&self) -> Option<&LineTable> {
        self.lines.as_ref()
    }

    /// Enclosing scope, if it is still alive
    pub fn scope(&self) -> Option<Arc<LexicalScope>> {
        self.scope.upgrade()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn defining_file(&self) -> Option<&str> {
        self.defining_file.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Debug names of locals (may be shorter than `locals_count`)
    pub fn local_names(&self) -> &[String] {
        &self.local_names
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Native form, if a backend has produced one
    pub fn cache(&self) -> Option<&Arc<dyn NativeForm>> {
        self.cache.get()
    }

    pub fn is_compiled(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn set_bytecode(&mut self, bytecode: Bytecode) {
        self.bytecode = bytecode;
    }

    pub fn set_literals(&mut self, literals: LiteralPool) {
        self.literals = literals;
    }

    pub fn set_exceptions(&mut self, exceptions: Option<ExceptionTable>) {
        self.exceptions = exceptions;
    }

    pub fn set_lines(&mut self, lines: Option<LineTable>) {
        self.lines = lines;
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn set_defining_file(&mut self, defining_file: Option<String>) {
        self.defining_file = defining_file;
    }

    pub fn set_path(&mut self, path: Option<String>) {
        self.path = path;
    }

    pub fn set_local_names(&mut self, local_names: Vec<String>) {
        self.local_names = local_names;
    }

    pub fn set_serial(&mut self, serial: u64) {
        self.serial = serial;
    }

    pub fn set_scope(&mut self, scope: &Arc<LexicalScope>) {
        self.scope = Arc::downgrade(scope);
    }

    /// Store the native form of this method
    ///
    /// The cache is write-once: after the first successful call, later calls fail with
    /// [`Error::CacheAlreadyFilled`] and leave the stored form in place.
    pub fn set_cache(&self, native: Arc<dyn NativeForm>) -> Result<(), Error> {
        self.cache
            .set(native)
            .map_err(|_| Error::CacheAlreadyFilled)
    }

    /// Source line for a bytecode offset ([`UNKNOWN_LINE`] if there isn't one)
    pub fn line_for_offset(&self, offset: i64) -> i64 {
        self.lines
            .as_ref()
            .map_or(UNKNOWN_LINE, |lines| lines.line_for_offset(offset))
    }

    /// First offset attributed to `line` or a later line ([`NOT_FOUND`] if there isn't one)
    pub fn first_offset_on_or_after_line(&self, line: i64) -> i64 {
        self.lines
            .as_ref()
            .map_or(NOT_FOUND, |lines| lines.first_offset_on_or_after_line(line))
    }

    /// First real source line of the method ([`NOT_FOUND`] if there isn't one)
    pub fn first_defined_line(&self) -> i64 {
        self.lines
            .as_ref()
            .map_or(NOT_FOUND, |lines| lines.first_defined_line())
    }

    /// Decode the bytecode against this method's literal pool
    pub fn decode<I: InstructionSet + ?Sized>(&self, isa: &I) -> Result<Vec<Instruction>, Error> {
        decode(&self.bytecode, &self.literals, isa)
    }

    /// Does an instruction start exactly at `offset`?
    ///
    /// Debuggers use this to reject breakpoints in the middle of an instruction.
    pub fn is_instruction_boundary<I: InstructionSet + ?Sized>(
        &self,
        offset: usize,
        isa: &I,
    ) -> Result<bool, Error> {
        let tokens = self.bytecode.tokenize(isa)?;
        Ok(matches!(tokens.get_offset(Offset(offset)), OffsetResult::Ok(_, _)))
    }

    /// Exception handlers protecting `offset`, in table order
    pub fn handlers_covering(&self, offset: usize) -> Vec<&ExceptionHandler> {
        self.exceptions
            .as_ref()
            .map_or_else(Vec::new, |table| table.covering(offset).collect())
    }

    /// Blocks and methods nested in the literal pool
    pub fn child_methods(&self) -> impl Iterator<Item = &Arc<CompiledMethod>> + '_ {
        self.literals.iter().filter_map(Literal::as_method)
    }

    /// Ruby-style arity: the argument count if it is fixed, otherwise `-(required + 1)`
    pub fn arity(&self) -> i32 {
        if self.total_args > self.required_args {
            -(self.required_args as i32 + 1)
        } else {
            self.required_args as i32
        }
    }

    /// Can this method be activated with `count` arguments?
    pub fn accepts_argument_count(&self, count: usize) -> bool {
        let total = self.total_args.max(self.required_args) as usize;
        self.required_args as usize <= count && count <= total
    }

    /// Check the invariants that the mutators don't
    ///
    /// This covers argument counts, literal indices in the bytecode, and line table ordering.
    /// A `total_args` of 0 means the count was never recorded (see `from_raw_parts`), so it
    /// isn't compared against `required_args`.
    pub fn validate<I: InstructionSet + ?Sized>(&self, isa: &I) -> Result<(), Error> {
        if self.required_args > self.total_args && self.total_args != 0 {
            log::warn!(
                "{}: {} required args but only {} total",
                self.name().unwrap_or("<anonymous>"),
                self.required_args,
                self.total_args
            );
            return Err(Error::RequiredExceedsTotal {
                required: self.required_args,
                total: self.total_args,
            });
        }

        if let Err(err) = self.decode(isa) {
            log::warn!("{}: {}", self.name().unwrap_or("<anonymous>"), err);
            return Err(err);
        }

        if let Some(lines) = &self.lines {
            if let Err(err) = lines.validate() {
                log::warn!("{}: {}", self.name().unwrap_or("<anonymous>"), err);
                return Err(err);
            }
        }

        Ok(())
    }
}
