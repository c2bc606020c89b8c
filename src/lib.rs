//! In-memory model of a compiled method for a bytecode VM
//!
//! A [`method::CompiledMethod`] bundles the bytecode of one method with the side tables a
//! debugger or backtrace needs: the literal pool, the exception table, and the line table.
//! The crate can decode the bytecode into resolved instructions (literal-indexed operands
//! replaced by the literals themselves) and translate between bytecode offsets and source
//! lines.
//!
//! ### Simple example
//!
//! ```
//! use cmethod::method::*;
//!
//! # fn decode_method() -> Result<(), Error> {
//! let isa = StandardInstructionSet::new();
//!
//! // Assemble `push_literal 0; ret`
//! let mut bytecode = Bytecode::new();
//! bytecode.push_instruction(&isa, "push_literal", &[0])?;
//! bytecode.push_instruction(&isa, "ret", &[])?;
//!
//! let mut method = CompiledMethod::from_raw_parts(bytecode, 0, 0);
//! method.set_literals(LiteralPool::from(vec![Literal::Symbol(String::from("hello"))]));
//! method.set_lines(Some(LineTable::from(vec![LineEntry::new(0, 3, 12)])));
//!
//! let instructions = method.decode(&isa)?;
//! assert_eq!(instructions[0].to_string(), "push_literal :hello");
//! assert_eq!(method.line_for_offset(3), 12);
//! # Ok(())
//! # }
//! # decode_method().unwrap();
//! ```

pub mod method;
pub mod util;
