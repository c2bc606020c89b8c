use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A literal-indexed operand points past the end of the literal pool
    ///
    /// This means the bytecode and literal pool don't belong together (indicates a bug in
    /// whatever assembled the method).
    OutOfRangeLiteral {
        offset: usize,
        opcode: &'static str,
        index: u16,
        pool_len: usize,
    },

    /// The instruction set has no entry for this opcode
    UnknownOpcode { opcode: u8, offset: usize },

    /// Opcode name isn't part of the instruction set (only when assembling)
    UnknownMnemonic(String),

    /// Operand count doesn't match the instruction's signature (when assembling, or when a
    /// buffer's tokenizer disagrees with the instruction set)
    OperandCount {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// Raw instructions carry at most two operands
    TooManyOperands { opcode: u8, found: usize },

    /// The buffer ends in the middle of an instruction's operands
    TruncatedInstruction { opcode: u8, offset: usize },

    /// Line table entry at this index is out of order, overlaps its predecessor, or ends before
    /// it starts
    MalformedLineTable { index: usize },

    /// `required_args` is larger than `total_args`
    RequiredExceedsTotal { required: u16, total: u16 },

    /// Activation was attempted with an argument count the method doesn't accept
    ArgumentCount {
        given: usize,
        required: u16,
        total: u16,
    },

    /// The native form of a method can only be set once
    CacheAlreadyFilled,

    /// Failure reported by the external backend (compiler or interpreter)
    Backend(String),

    IoError(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRangeLiteral {
                offset,
                opcode,
                index,
                pool_len,
            } => write!(
                f,
                "{} at offset {} refers to literal {} but the pool only has {} entries",
                opcode, offset, index, pool_len
            ),
            Error::UnknownOpcode { opcode, offset } => {
                write!(f, "unknown opcode {:#04x} at offset {}", opcode, offset)
            }
            Error::UnknownMnemonic(name) => write!(f, "unknown instruction `{}`", name),
            Error::OperandCount {
                opcode,
                expected,
                found,
            } => write!(
                f,
                "{} takes {} operand(s) but {} were given",
                opcode, expected, found
            ),
            Error::TooManyOperands { opcode, found } => write!(
                f,
                "instruction {:#04x} has {} operands (at most 2 fit)",
                opcode, found
            ),
            Error::TruncatedInstruction { opcode, offset } => write!(
                f,
                "bytecode ends inside instruction {:#04x} at offset {}",
                opcode, offset
            ),
            Error::MalformedLineTable { index } => {
                write!(f, "line table entry {} is out of order or overlapping", index)
            }
            Error::RequiredExceedsTotal { required, total } => write!(
                f,
                "{} required arguments exceeds {} total arguments",
                required, total
            ),
            Error::ArgumentCount {
                given,
                required,
                total,
            } => write!(
                f,
                "wrong number of arguments (given {}, expected {}..={})",
                given, required, total
            ),
            Error::CacheAlreadyFilled => write!(f, "native form was already set"),
            Error::Backend(msg) => write!(f, "backend failure: {}", msg),
            Error::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {}
