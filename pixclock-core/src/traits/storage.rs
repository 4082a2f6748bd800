//! Persistent storage abstraction
//!
//! The core treats flash as opaque byte ranges. Implementations only need
//! the two primitives below; integrity checking is done by the core.

/// Errors from the flash primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Read failed
    Read,
    /// Erase or program failed
    Write,
    /// Offset/length outside the device
    OutOfBounds,
}

/// Byte-addressed non-volatile storage
///
/// Implementations must make `erase_and_write` replace the whole byte range
/// starting at `offset` (the erase block is rewritten each time). No partial
/// write recovery is expected.
pub trait RecordStorage {
    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), StorageError>;

    /// Erase the block(s) covering `offset..offset + capacity` and program `data` at `offset`
    ///
    /// `capacity` is the size of the record region; `data.len()` never exceeds it.
    fn erase_and_write(&mut self, offset: u32, capacity: u32, data: &[u8])
        -> Result<(), StorageError>;
}

/// RAM-backed storage, used on the host and in tests
///
/// Erased bytes read back as `0xFF`, like NOR flash.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
    writes: u32,
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryStorage<N> {
    /// Create fully erased storage
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
        }
    }

    /// Raw contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw contents, mutable (for fault injection)
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Number of erase-and-write operations performed
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    fn range(offset: u32, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > N {
            return Err(StorageError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const N: usize> RecordStorage for MemoryStorage<N> {
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, buffer.len())?;
        buffer.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn erase_and_write(
        &mut self,
        offset: u32,
        capacity: u32,
        data: &[u8],
    ) -> Result<(), StorageError> {
        if data.len() > capacity as usize {
            return Err(StorageError::OutOfBounds);
        }
        let block = Self::range(offset, capacity as usize)?;
        self.bytes[block].fill(0xFF);
        let range = Self::range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_starts_erased() {
        let mut storage = MemoryStorage::<64>::new();
        let mut buf = [0u8; 8];
        storage.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 8]);
    }

    #[test]
    fn test_erase_and_write_clears_tail() {
        let mut storage = MemoryStorage::<64>::new();
        storage.erase_and_write(16, 16, &[1, 2, 3, 4, 5]).unwrap();
        storage.erase_and_write(16, 16, &[9, 9]).unwrap();

        let mut buf = [0u8; 5];
        storage.read(16, &mut buf).unwrap();
        assert_eq!(buf, [9, 9, 0xFF, 0xFF, 0xFF]);
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut storage = MemoryStorage::<16>::new();
        let mut buf = [0u8; 8];
        assert_eq!(storage.read(12, &mut buf), Err(StorageError::OutOfBounds));
        assert_eq!(
            storage.erase_and_write(8, 16, &[0]),
            Err(StorageError::OutOfBounds)
        );
    }
}
