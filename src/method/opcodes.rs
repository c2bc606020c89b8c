use self::OperandKind::{Literal as L, Plain as P};
use bitflags::bitflags;
use std::fmt;

/// How to interpret one operand of an instruction
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperandKind {
    /// Raw integer (local slot, count, jump target, ...)
    Plain,

    /// Index into the method's literal pool
    Literal,
}

bitflags! {
    /// Control flow properties of an opcode
    pub struct OpcodeFlags: u8 {
        /// May transfer control to the offset in its operand
        const BRANCH = 0x01;

        /// Control never falls through to the next instruction
        const TERMINATOR = 0x02;

        /// Dispatches a message send
        const SEND = 0x04;

        /// Unconditional jump
        const JUMP = Self::BRANCH.bits | Self::TERMINATOR.bits;
    }
}

/// Description of one opcode in an instruction set
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OpcodeInfo {
    pub code: u8,

    /// Mnemonic used when rendering and assembling
    pub name: &'static str,

    /// Operand kinds, in encoding order (at most two)
    pub operands: &'static [OperandKind],

    pub flags: OpcodeFlags,
}

impl OpcodeInfo {
    pub const fn new(
        code: u8,
        name: &'static str,
        operands: &'static [OperandKind],
        flags: OpcodeFlags,
    ) -> OpcodeInfo {
        OpcodeInfo {
            code,
            name,
            operands,
            flags,
        }
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    pub fn is_terminator(&self) -> bool {
        self.flags.contains(OpcodeFlags::TERMINATOR)
    }
}

impl fmt::Display for OpcodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Lookup table from opcodes to their operand signatures
///
/// The VM owns its instruction set; this trait is the seam through which the decoder learns
/// how many operands each opcode has and which of them index the literal pool.
pub trait InstructionSet {
    /// Describe an opcode, or `None` if it isn't part of the instruction set
    fn describe(&self, opcode: u8) -> Option<&OpcodeInfo>;

    /// Find an opcode by its mnemonic
    fn lookup(&self, name: &str) -> Option<&OpcodeInfo> {
        (0..=u8::MAX)
            .filter_map(|code| self.describe(code))
            .find(|info| info.name == name)
    }
}

const NONE: OpcodeFlags = OpcodeFlags::empty();

/// Opcodes of the standard instruction set, indexed by their code
static STANDARD_OPCODES: [OpcodeInfo; 28] = [
    OpcodeInfo::new(0, "noop", &[], NONE),
    OpcodeInfo::new(1, "push_nil", &[], NONE),
    OpcodeInfo::new(2, "push_true", &[], NONE),
    OpcodeInfo::new(3, "push_false", &[], NONE),
    OpcodeInfo::new(4, "push_int", &[P], NONE),
    OpcodeInfo::new(5, "push_self", &[], NONE),
    OpcodeInfo::new(6, "push_literal", &[L], NONE),
    OpcodeInfo::new(7, "push_local", &[P], NONE),
    OpcodeInfo::new(8, "set_local", &[P], NONE),
    OpcodeInfo::new(9, "push_ivar", &[L], NONE),
    OpcodeInfo::new(10, "set_ivar", &[L], NONE),
    OpcodeInfo::new(11, "push_const", &[L], NONE),
    OpcodeInfo::new(12, "pop", &[], NONE),
    OpcodeInfo::new(13, "dup_top", &[], NONE),
    OpcodeInfo::new(14, "goto", &[P], OpcodeFlags::JUMP),
    OpcodeInfo::new(15, "goto_if_false", &[P], OpcodeFlags::BRANCH),
    OpcodeInfo::new(16, "goto_if_true", &[P], OpcodeFlags::BRANCH),
    OpcodeInfo::new(17, "ret", &[], OpcodeFlags::TERMINATOR),
    OpcodeInfo::new(18, "send_method", &[L], OpcodeFlags::SEND),
    OpcodeInfo::new(19, "send_stack", &[L, P], OpcodeFlags::SEND),
    OpcodeInfo::new(20, "send_stack_with_block", &[L, P], OpcodeFlags::SEND),
    OpcodeInfo::new(21, "create_block", &[L], NONE),
    OpcodeInfo::new(22, "check_arity", &[P, P], NONE),
    OpcodeInfo::new(23, "raise_exc", &[], OpcodeFlags::TERMINATOR),
    OpcodeInfo::new(24, "push_block", &[], NONE),
    OpcodeInfo::new(25, "make_array", &[P], NONE),
    OpcodeInfo::new(26, "string_dup", &[], NONE),
    OpcodeInfo::new(27, "passed_arg", &[P], NONE),
];

/// Small stack machine instruction set
///
/// Opcodes are numbered densely from zero, so lookup is a direct index.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardInstructionSet;

impl StandardInstructionSet {
    pub fn new() -> StandardInstructionSet {
        StandardInstructionSet
    }

    pub fn opcodes(&self) -> &'static [OpcodeInfo] {
        &STANDARD_OPCODES
    }
}

impl InstructionSet for StandardInstructionSet {
    fn describe(&self, opcode: u8) -> Option<&OpcodeInfo> {
        STANDARD_OPCODES.get(opcode as usize)
    }

    fn lookup(&self, name: &str) -> Option<&OpcodeInfo> {
        STANDARD_OPCODES.iter().find(|info| info.name == name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes_match_positions() {
        for (idx, info) in StandardInstructionSet.opcodes().iter().enumerate() {
            assert_eq!(info.code as usize, idx, "{} is out of place", info.name);
            assert!(info.operand_count() <= 2, "{} has too many operands", info.name);
        }
    }

    #[test]
    fn describe_and_lookup() {
        let isa = StandardInstructionSet::new();
        let send = isa.lookup("send_stack").unwrap();
        assert_eq!(send.operands, &[OperandKind::Literal, OperandKind::Plain]);
        assert!(send.flags.contains(OpcodeFlags::SEND));
        assert_eq!(isa.describe(send.code), Some(send));
        assert!(isa.describe(200).is_none());
        assert!(isa.lookup("jsr").is_none());
    }

    #[test]
    fn jumps_terminate() {
        let isa = StandardInstructionSet::new();
        assert!(isa.lookup("goto").unwrap().is_terminator());
        assert!(isa.lookup("ret").unwrap().is_terminator());
        assert!(!isa.lookup("goto_if_false").unwrap().is_terminator());
    }

    /// Instruction sets only need `describe`, lookup by name comes for free
    #[test]
    fn default_lookup() {
        struct Tiny;
        static TINY: [OpcodeInfo; 2] = [
            OpcodeInfo::new(0, "halt", &[], OpcodeFlags::TERMINATOR),
            OpcodeInfo::new(1, "load", &[OperandKind::Literal], OpcodeFlags::empty()),
        ];
        impl InstructionSet for Tiny {
            fn describe(&self, opcode: u8) -> Option<&OpcodeInfo> {
                TINY.get(opcode as usize)
            }
        }
        assert_eq!(Tiny.lookup("load").map(|info| info.code), Some(1));
        assert!(Tiny.lookup("store").is_none());
    }
}
