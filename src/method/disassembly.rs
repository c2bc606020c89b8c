use crate::method::{
    CompiledMethod, Error, HandlerKind, Instruction, InstructionSet, Settings, UNKNOWN_LINE,
};
use std::fmt;
use std::fmt::Write;

/// Human readable listing of a method
///
/// The method is decoded up front, so building a `Disassembly` is where decode errors surface.
/// Rendering happens through `Display`.
pub struct Disassembly<'m> {
    method: &'m CompiledMethod,
    instructions: Vec<Instruction>,
    children: Vec<Disassembly<'m>>,
    settings: Settings,
}

impl<'m> Disassembly<'m> {
    pub fn of<I: InstructionSet + ?Sized>(
        method: &'m CompiledMethod,
        isa: &I,
        settings: &Settings,
    ) -> Result<Disassembly<'m>, Error> {
        let instructions = method.decode(isa)?;
        let children = if settings.recursive {
            method
                .child_methods()
                .map(|child| Disassembly::of(child.as_ref(), isa, settings))
                .collect::<Result<Vec<_>, Error>>()?
        } else {
            vec![]
        };

        Ok(Disassembly {
            method,
            instructions,
            children,
            settings: settings.clone(),
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    fn render_operand(&self, rendered: String) -> String {
        match self.settings.operand_width {
            Some(width) if rendered.chars().count() > width => {
                let mut truncated: String = rendered.chars().take(width).collect();
                truncated.push_str("...");
                truncated
            }
            _ => rendered,
        }
    }

    fn render_handlers(&self, offset: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = match self.method.exceptions() {
            Some(handlers) => handlers,
            None => return Ok(()),
        };
        for handler in handlers {
            let kind = match handler.kind {
                HandlerKind::Rescue => "rescue",
                HandlerKind::Ensure => "ensure",
            };
            if handler.start_offset == offset {
                writeln!(
                    f,
                    "    -- {} {:04}..{:04} -> {:04}",
                    kind, handler.start_offset, handler.end_offset, handler.handler_offset
                )?;
            }
            if handler.handler_offset == offset {
                writeln!(f, "    -- {} handler", kind)?;
            }
        }
        Ok(())
    }
}

impl<'m> fmt::Display for Disassembly<'m> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method;
        write!(f, "== {}", method.name().unwrap_or("<anonymous>"))?;
        if let Some(file) = method.defining_file() {
            write!(f, " ({})", file)?;
        }
        writeln!(
            f,
            " == arity {}, locals {}, literals {}",
            method.arity(),
            method.locals_count(),
            method.literals().len()
        )?;

        let mut current_line = UNKNOWN_LINE;
        for (idx, insn) in self.instructions.iter().enumerate() {
            if self.settings.show_lines {
                let line = method.line_for_offset(insn.offset() as i64);
                if line != current_line && line != UNKNOWN_LINE {
                    writeln!(f, "    line {}", line)?;
                }
                current_line = line;
            }

            if self.settings.show_handlers {
                self.render_handlers(insn.offset(), f)?;
            }

            let mut text = String::new();
            if self.settings.show_offsets {
                write!(text, "{:04}: ", insn.offset())?;
            }
            text.push_str(insn.opcode().name);
            for operand in insn.operands() {
                text.push(' ');
                text.push_str(&self.render_operand(operand.to_string()));
            }
            writeln!(f, "{}", text)?;

            if insn.opcode().is_terminator() && idx + 1 < self.instructions.len() {
                writeln!(f)?;
            }
        }

        for child in &self.children {
            writeln!(f)?;
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}
