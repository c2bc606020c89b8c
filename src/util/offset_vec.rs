use std::iter::Enumerate;
use std::slice::Iter;

/// Elements with an encoded size (eg. when used in an `OffsetVec`)
pub trait Width {
    fn width(&self) -> usize;
}

/// Elements stored alongside their byte offset, where each offset is the sum of the widths of
/// the elements before it
///
/// Tokenized bytecode lives in one of these: instructions have different encoded sizes, but
/// line tables, exception tables and debuggers all address them by byte offset.
pub struct OffsetVec<T> {
    entries: Vec<(Offset, T)>,

    /// Total encoded size, which is also where the next element lands
    offset_len: Offset,
}

/// Byte offset into an `OffsetVec`
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Offset(pub usize);

impl<T: Width> OffsetVec<T> {
    /// Empty vector with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> OffsetVec<T> {
        OffsetVec {
            entries: Vec::with_capacity(capacity),
            offset_len: Offset(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an element, returning the offset it landed at
    pub fn push(&mut self, elem: T) -> Offset {
        let offset = self.offset_len;
        self.offset_len.0 += elem.width();
        self.entries.push((offset, elem));
        offset
    }

    /// Find the element starting exactly at `offset`
    pub fn get_offset(&self, offset: Offset) -> OffsetResult<'_, T> {
        if offset >= self.offset_len {
            return OffsetResult::TooLarge;
        }
        match self.entries.binary_search_by_key(&offset, |(off, _)| *off) {
            Ok(index) => OffsetResult::Ok(index, &self.entries[index].1),
            Err(next) => OffsetResult::InvalidOffset(next),
        }
    }

    pub fn iter(&self) -> OffsetVecIter<'_, T> {
        self.into_iter()
    }
}

#[derive(Debug, PartialEq)]
pub enum OffsetResult<'a, T> {
    /// Element at this index starts at the offset
    Ok(usize, &'a T),

    /// Offset falls in the middle of the element before this index
    InvalidOffset(usize),

    /// Offset is at or past the end of the last element
    TooLarge,
}

/// Iterator over `(offset, index, element)`
pub struct OffsetVecIter<'a, T>(Enumerate<Iter<'a, (Offset, T)>>);

impl<'a, T> Iterator for OffsetVecIter<'a, T> {
    type Item = (Offset, usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(idx, (off, elem))| (*off, idx, elem))
    }
}

impl<'a, T> IntoIterator for &'a OffsetVec<T> {
    type Item = (Offset, usize, &'a T);
    type IntoIter = OffsetVecIter<'a, T>;

    fn into_iter(self) -> OffsetVecIter<'a, T> {
        OffsetVecIter(self.entries.iter().enumerate())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Stand-in for an encoded instruction: an opcode byte plus `n` two-byte operands
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    struct Insn(u8, usize);

    impl Width for Insn {
        fn width(&self) -> usize {
            1 + 2 * self.1
        }
    }

    fn stream(insns: &[Insn]) -> OffsetVec<Insn> {
        let mut offset_vec = OffsetVec::with_capacity(insns.len());
        for insn in insns {
            offset_vec.push(*insn);
        }
        offset_vec
    }

    #[test]
    fn offsets_accumulate_widths() {
        let mut insns = stream(&[Insn(1, 0), Insn(2, 1), Insn(3, 2)]);
        assert_eq!(insns.push(Insn(4, 0)), Offset(1 + 3 + 5));
        assert_eq!(insns.len(), 4);
        assert_eq!(
            insns.iter().collect::<Vec<_>>(),
            vec![
                (Offset(0), 0, &Insn(1, 0)),
                (Offset(1), 1, &Insn(2, 1)),
                (Offset(4), 2, &Insn(3, 2)),
                (Offset(9), 3, &Insn(4, 0)),
            ]
        );
    }

    #[test]
    fn lookup_by_offset() {
        let insns = stream(&[Insn(1, 0), Insn(2, 1), Insn(3, 2)]);
        assert_eq!(insns.get_offset(Offset(1)), OffsetResult::Ok(1, &Insn(2, 1)));
        assert_eq!(insns.get_offset(Offset(2)), OffsetResult::InvalidOffset(2));
        assert_eq!(insns.get_offset(Offset(4)), OffsetResult::Ok(2, &Insn(3, 2)));
        assert_eq!(insns.get_offset(Offset(9)), OffsetResult::TooLarge);
        assert_eq!(insns.get_offset(Offset(40)), OffsetResult::TooLarge);
    }

    #[test]
    fn offset_inside_last_element() {
        let insns = stream(&[Insn(4, 1)]);
        assert_eq!(insns.get_offset(Offset(1)), OffsetResult::InvalidOffset(1));
        assert_eq!(insns.get_offset(Offset(2)), OffsetResult::InvalidOffset(1));
        assert_eq!(insns.get_offset(Offset(3)), OffsetResult::TooLarge);

        let empty: OffsetVec<Insn> = OffsetVec::with_capacity(0);
        assert!(empty.is_empty());
        assert_eq!(empty.get_offset(Offset(0)), OffsetResult::TooLarge);
    }
}
