use crate::method::{
    BytecodeBuffer, Error, Instruction, InstructionSet, LiteralPool, Operand, OperandKind,
};

/// Decode a bytecode buffer into instructions, resolving literal-indexed operands
///
/// Instructions come back in stream order. Decoding is all or nothing: an unknown opcode, a
/// truncated instruction, an operand count that disagrees with the opcode's signature, or a
/// literal index past the end of `literals` fails the whole call.
pub fn decode<B, I>(
    bytecode: &B,
    literals: &LiteralPool,
    isa: &I,
) -> Result<Vec<Instruction>, Error>
where
    B: BytecodeBuffer + ?Sized,
    I: InstructionSet + ?Sized,
{
    let tokens = bytecode.tokenize(isa)?;
    let mut instructions = Vec::with_capacity(tokens.len());

    for (offset, _, raw) in &tokens {
        let offset = offset.0;
        let opcode = *isa.describe(raw.opcode).ok_or(Error::UnknownOpcode {
            opcode: raw.opcode,
            offset,
        })?;
        if raw.operands().len() != opcode.operand_count() {
            return Err(Error::OperandCount {
                opcode: opcode.name,
                expected: opcode.operand_count(),
                found: raw.operands().len(),
            });
        }

        let mut operands = Vec::with_capacity(raw.operands().len());
        for (kind, value) in opcode.operands.iter().zip(raw.operands()) {
            let operand = match kind {
                OperandKind::Plain => Operand::Plain(*value),
                OperandKind::Literal => {
                    let literal =
                        literals
                            .get(*value as usize)
                            .ok_or(Error::OutOfRangeLiteral {
                                offset,
                                opcode: opcode.name,
                                index: *value,
                                pool_len: literals.len(),
                            })?;
                    Operand::Literal(literal.clone())
                }
            };
            operands.push(operand);
        }

        instructions.push(Instruction::new(offset, opcode, operands));
    }

    log::debug!(
        "Decoded {} instructions from {} bytes",
        instructions.len(),
        bytecode.byte_len()
    );
    Ok(instructions)
}
