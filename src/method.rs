//! Compiled methods, their side tables, and the instruction decoder

mod activation;
mod bytecode;
mod compiled_method;
mod decoder;
mod disassembly;
mod errors;
mod exceptions;
mod instruction;
mod line_table;
mod literals;
mod opcodes;
mod scope;
mod settings;

pub use activation::*;
pub use bytecode::*;
pub use compiled_method::*;
pub use decoder::*;
pub use disassembly::*;
pub use errors::*;
pub use exceptions::*;
pub use instruction::*;
pub use line_table::*;
pub use literals::*;
pub use opcodes::*;
pub use scope::*;
pub use settings::*;
