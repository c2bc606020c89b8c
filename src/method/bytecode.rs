//! Reference encoding of the instruction stream
//!
//! Every instruction is one opcode byte followed by its operands, each a big-endian `u16`:
//!
//! ```text
//! ┌────────┬───────────┬───────────┐
//! │ opcode │ operand 1 │ operand 2 │
//! │  (u8)  │  (u16 BE) │  (u16 BE) │
//! └────────┴───────────┴───────────┘
//! ```
//!
//! The number of operands isn't encoded: it comes from the instruction set. A VM with a
//! different encoding implements [`BytecodeBuffer`] for its own buffer type.

use crate::method::{Error, InstructionSet, OpcodeInfo};
use crate::util::{Offset, OffsetVec, Width};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, ErrorKind};

/// Instruction split out of the stream, operands not yet interpreted
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RawInstruction {
    pub opcode: u8,
    operand_count: u8,
    operand_values: [u16; 2],
}

impl RawInstruction {
    /// Fails with [`Error::TooManyOperands`] if there are more than two operands
    pub fn new(opcode: u8, operands: &[u16]) -> Result<RawInstruction, Error> {
        if operands.len() > 2 {
            return Err(Error::TooManyOperands {
                opcode,
                found: operands.len(),
            });
        }
        let mut operand_values = [0; 2];
        operand_values[..operands.len()].copy_from_slice(operands);
        Ok(RawInstruction {
            opcode,
            operand_count: operands.len() as u8,
            operand_values,
        })
    }

    pub fn operands(&self) -> &[u16] {
        &self.operand_values[..self.operand_count as usize]
    }
}

impl Width for RawInstruction {
    fn width(&self) -> usize {
        1 + 2 * self.operand_count as usize
    }
}

/// Byte buffers that know how to split themselves into instructions
pub trait BytecodeBuffer {
    /// Split the buffer into instructions, in stream order
    ///
    /// Operand counts come from the instruction set, so an opcode missing from it is an error.
    fn tokenize<I: InstructionSet + ?Sized>(
        &self,
        isa: &I,
    ) -> Result<OffsetVec<RawInstruction>, Error>;

    /// Encoded size in bytes
    fn byte_len(&self) -> usize;
}

/// Encoded instruction stream of a method
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Bytecode(pub Vec<u8>);

impl Bytecode {
    pub fn new() -> Bytecode {
        Bytecode(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Append an instruction, returning the offset it was written at
    pub fn push_raw(&mut self, info: &OpcodeInfo, operands: &[u16]) -> Result<Offset, Error> {
        if operands.len() != info.operand_count() {
            return Err(Error::OperandCount {
                opcode: info.name,
                expected: info.operand_count(),
                found: operands.len(),
            });
        }

        let offset = Offset(self.0.len());
        self.0.write_u8(info.code)?;
        for operand in operands {
            self.0.write_u16::<BigEndian>(*operand)?;
        }
        Ok(offset)
    }

    /// Append an instruction by mnemonic
    pub fn push_instruction<I: InstructionSet + ?Sized>(
        &mut self,
        isa: &I,
        name: &str,
        operands: &[u16],
    ) -> Result<Offset, Error> {
        let info = isa
            .lookup(name)
            .ok_or_else(|| Error::UnknownMnemonic(name.to_owned()))?;
        self.push_raw(info, operands)
    }
}

impl From<Vec<u8>> for Bytecode {
    fn from(bytes: Vec<u8>) -> Bytecode {
        Bytecode(bytes)
    }
}

impl BytecodeBuffer for Bytecode {
    fn tokenize<I: InstructionSet + ?Sized>(
        &self,
        isa: &I,
    ) -> Result<OffsetVec<RawInstruction>, Error> {
        let mut instructions = OffsetVec::with_capacity(self.0.len());
        let mut cursor = Cursor::new(self.as_bytes());

        while (cursor.position() as usize) < self.0.len() {
            let offset = cursor.position() as usize;
            let opcode = cursor.read_u8()?;
            let info = isa
                .describe(opcode)
                .ok_or(Error::UnknownOpcode { opcode, offset })?;

            let mut operands = [0u16; 2];
            if info.operand_count() > operands.len() {
                return Err(Error::TooManyOperands {
                    opcode,
                    found: info.operand_count(),
                });
            }
            for operand in operands.iter_mut().take(info.operand_count()) {
                *operand = cursor.read_u16::<BigEndian>().map_err(|err| {
                    if err.kind() == ErrorKind::UnexpectedEof {
                        Error::TruncatedInstruction { opcode, offset }
                    } else {
                        Error::IoError(err)
                    }
                })?;
            }

            let raw = RawInstruction::new(opcode, &operands[..info.operand_count()])?;
            log::trace!("@{} {} {:?}", offset, info.name, raw.operands());
            instructions.push(raw);
        }

        Ok(instructions)
    }

    fn byte_len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::method::StandardInstructionSet;

    #[test]
    fn assemble_then_tokenize() {
        let isa = StandardInstructionSet::new();
        let mut code = Bytecode::new();
        assert_eq!(code.push_instruction(&isa, "push_local", &[3]).unwrap(), Offset(0));
        assert_eq!(
            code.push_instruction(&isa, "send_stack", &[0, 1]).unwrap(),
            Offset(3)
        );
        assert_eq!(code.push_instruction(&isa, "ret", &[]).unwrap(), Offset(8));
        assert_eq!(code.as_bytes(), &[7, 0, 3, 19, 0, 0, 0, 1, 17]);

        let tokens = code.tokenize(&isa).unwrap();
        assert_eq!(
            tokens
                .iter()
                .map(|(offset, idx, raw)| (offset, idx, *raw))
                .collect::<Vec<_>>(),
            vec![
                (Offset(0), 0, RawInstruction::new(7, &[3]).unwrap()),
                (Offset(3), 1, RawInstruction::new(19, &[0, 1]).unwrap()),
                (Offset(8), 2, RawInstruction::new(17, &[]).unwrap()),
            ]
        );
    }

    #[test]
    fn operands_are_big_endian() {
        let isa = StandardInstructionSet::new();
        let code = Bytecode::from(vec![4, 0x01, 0x02]);
        let tokens = code.tokenize(&isa).unwrap();
        let (_, _, raw) = tokens.iter().next().unwrap();
        assert_eq!(raw.operands(), &[0x0102]);
    }

    #[test]
    fn wrong_operand_count() {
        let isa = StandardInstructionSet::new();
        let mut code = Bytecode::new();
        assert!(matches!(
            code.push_instruction(&isa, "push_int", &[]),
            Err(Error::OperandCount {
                expected: 1,
                found: 0,
                ..
            })
        ));
        assert!(matches!(
            code.push_instruction(&isa, "jsr", &[]),
            Err(Error::UnknownMnemonic(_))
        ));
        assert!(code.is_empty());
    }

    #[test]
    fn truncated_operand() {
        let isa = StandardInstructionSet::new();
        let code = Bytecode::from(vec![1, 19, 0, 2, 0]);
        assert!(matches!(
            code.tokenize(&isa),
            Err(Error::TruncatedInstruction {
                opcode: 19,
                offset: 1
            })
        ));
    }

    #[test]
    fn unknown_opcode() {
        let isa = StandardInstructionSet::new();
        let code = Bytecode::from(vec![1, 0xee]);
        assert!(matches!(
            code.tokenize(&isa),
            Err(Error::UnknownOpcode {
                opcode: 0xee,
                offset: 1
            })
        ));
    }

    #[test]
    fn at_most_two_operands() {
        assert!(matches!(
            RawInstruction::new(19, &[0, 1, 2]),
            Err(Error::TooManyOperands {
                opcode: 19,
                found: 3
            })
        ));
        assert_eq!(RawInstruction::new(19, &[0, 1]).unwrap().width(), 5);
    }
}
