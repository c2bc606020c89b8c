use crate::method::Error;
use std::slice::Iter;

/// Line number returned when an offset isn't covered by the table
pub const UNKNOWN_LINE: i64 = 0;

/// Offset or line returned when a search over the table comes up empty
pub const NOT_FOUND: i64 = -1;

/// Range of bytecode offsets attributed to one source line
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LineEntry {
    /// First offset of the range (inclusive)
    pub start_offset: i64,

    /// Last offset of the range (inclusive)
    pub end_offset: i64,

    /// Source line, `0` for synthetic code with no source line
    pub line: i64,
}

impl LineEntry {
    pub fn new(start_offset: i64, end_offset: i64, line: i64) -> LineEntry {
        LineEntry {
            start_offset,
            end_offset,
            line,
        }
    }

    pub fn contains(&self, offset: i64) -> bool {
        self.start_offset <= offset && offset <= self.end_offset
    }
}

/// Mapping from bytecode offset ranges to source lines
///
/// Entries are expected to be sorted by start offset and not overlap. This is not enforced:
/// queries scan from the front and return the first match, so a malformed table gives
/// well-defined (if surprising) answers. Use [`LineTable::validate`] to check.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineTable(Vec<LineEntry>);

impl LineTable {
    pub fn new() -> LineTable {
        LineTable(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, entry: LineEntry) {
        self.0.push(entry);
    }

    pub fn iter(&self) -> Iter<'_, LineEntry> {
        self.0.iter()
    }

    /// Line of the first range containing `offset`, or [`UNKNOWN_LINE`]
    pub fn line_for_offset(&self, offset: i64) -> i64 {
        self.0
            .iter()
            .find(|entry| entry.contains(offset))
            .map_or(UNKNOWN_LINE, |entry| entry.line)
    }

    /// Start of the first range whose line is at least `line`, or [`NOT_FOUND`]
    ///
    /// This is where a debugger places a breakpoint requested on `line`.
    pub fn first_offset_on_or_after_line(&self, line: i64) -> i64 {
        self.0
            .iter()
            .find(|entry| entry.line >= line)
            .map_or(NOT_FOUND, |entry| entry.start_offset)
    }

    /// First positive line in the table, or [`NOT_FOUND`]
    pub fn first_defined_line(&self) -> i64 {
        self.0
            .iter()
            .map(|entry| entry.line)
            .find(|line| *line > 0)
            .unwrap_or(NOT_FOUND)
    }

    /// Check that ranges are well formed, sorted by start offset, and don't overlap
    pub fn validate(&self) -> Result<(), Error> {
        let mut previous: Option<&LineEntry> = None;
        for (index, entry) in self.0.iter().enumerate() {
            if entry.end_offset < entry.start_offset {
                return Err(Error::MalformedLineTable { index });
            }
            if let Some(previous) = previous {
                if entry.start_offset <= previous.end_offset {
                    return Err(Error::MalformedLineTable { index });
                }
            }
            previous = Some(entry);
        }
        Ok(())
    }
}

impl From<Vec<LineEntry>> for LineTable {
    fn from(entries: Vec<LineEntry>) -> LineTable {
        LineTable(entries)
    }
}

impl FromIterator<LineEntry> for LineTable {
    fn from_iter<I: IntoIterator<Item = LineEntry>>(entries: I) -> LineTable {
        LineTable(entries.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LineTable {
    type Item = &'a LineEntry;
    type IntoIter = Iter<'a, LineEntry>;

    fn into_iter(self) -> Iter<'a, LineEntry> {
        self.0.iter()
    }
}
