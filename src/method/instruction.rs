use crate::method::{Literal, OpcodeInfo};
use std::fmt;

/// Decoded operand
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Operand used as-is (local slot, count, jump target, ...)
    Plain(u16),

    /// Operand that indexed the literal pool, replaced by the literal
    Literal(Literal),
}

impl Operand {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Operand::Literal(literal) => Some(literal),
            Operand::Plain(_) => None,
        }
    }

    pub fn as_plain(&self) -> Option<u16> {
        match self {
            Operand::Plain(value) => Some(*value),
            Operand::Literal(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Plain(value) => write!(f, "{}", value),
            Operand::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

/// One decoded instruction, with literal operands already resolved
///
/// Instructions own their operands and don't point back into the method they came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    offset: usize,
    opcode: OpcodeInfo,
    operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(offset: usize, opcode: OpcodeInfo, operands: Vec<Operand>) -> Instruction {
        debug_assert!(operands.len() <= 2);
        Instruction {
            offset,
            opcode,
            operands,
        }
    }

    /// Byte offset of the instruction in the method's bytecode
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn opcode(&self) -> &OpcodeInfo {
        &self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }
}

/// Mnemonic followed by the operands, space separated (eg. `send_stack :+ 1`)
///
/// This is for humans: there is no parser for it.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::method::{InstructionSet, StandardInstructionSet};

    #[test]
    fn rendering() {
        let isa = StandardInstructionSet::new();
        let send = Instruction::new(
            4,
            *isa.lookup("send_stack").unwrap(),
            vec![
                Operand::Literal(Literal::Symbol(String::from("+"))),
                Operand::Plain(1),
            ],
        );
        assert_eq!(send.to_string(), "send_stack :+ 1");
        assert_eq!(send.offset(), 4);
        assert_eq!(send.operands()[1].as_plain(), Some(1));
        assert_eq!(send.operands()[1].as_literal(), None);

        let ret = Instruction::new(9, *isa.lookup("ret").unwrap(), vec![]);
        assert_eq!(ret.to_string(), "ret");
    }
}
