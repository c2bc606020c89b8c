/// Options for rendering a [`super::Disassembly`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    /// Prefix every instruction with its byte offset
    pub show_offsets: bool,

    /// Emit a `line N` header whenever the source line changes
    pub show_lines: bool,

    /// Mark where protected ranges and their handlers start
    pub show_handlers: bool,

    /// Also list the blocks and methods nested in the literal pool
    pub recursive: bool,

    /// Truncate rendered operands longer than this many characters
    ///
    /// Long string literals otherwise make listings unreadable.
    pub operand_width: Option<usize>,
}

impl Settings {
    pub fn new() -> Settings {
        Settings {
            show_offsets: true,
            show_lines: true,
            show_handlers: true,
            recursive: false,
            operand_width: Some(40),
        }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new()
    }
}
