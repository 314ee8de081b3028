//! Slot directory entries.
//!
//! Each slot packs the size and in-page offset of one record into a single
//! u32: the size in the high 16 bits and the offset in the low 16 bits.

/// A decoded slot directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Record length in bytes
    pub size: u16,
    /// Offset of the record within the page
    pub offset: u16,
}

impl Slot {
    /// Build a slot for a record of `size` bytes at `offset`.
    ///
    /// The offset is truncated to 16 bits. Only an empty record placed at
    /// the very end of a 64KB page has an offset that does not fit, and an
    /// empty record reads back the same from any offset.
    pub fn new(size: usize, offset: usize) -> Self {
        debug_assert!(size <= u16::MAX as usize);
        Self {
            size: size as u16,
            offset: (offset & 0xFFFF) as u16,
        }
    }

    /// Pack into the on-disk representation
    pub fn pack(self) -> u32 {
        ((self.size as u32) << 16) | self.offset as u32
    }

    /// Unpack from the on-disk representation
    pub fn unpack(raw: u32) -> Self {
        Self {
            size: (raw >> 16) as u16,
            offset: (raw & 0xFFFF) as u16,
        }
    }

    /// Byte range of the record within the page
    pub fn range(self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        let slot = Slot::new(3, 8189);
        assert_eq!(slot.pack(), (3 << 16) | 8189);
        assert_eq!(Slot::unpack(slot.pack()), slot);
        assert_eq!(slot.range(), 8189..8192);
    }

    #[test]
    fn test_empty_record_at_end_of_large_page() {
        let slot = Slot::new(0, 64 * 1024);
        assert_eq!(slot.offset, 0);
        assert!(slot.range().is_empty());
    }
}
