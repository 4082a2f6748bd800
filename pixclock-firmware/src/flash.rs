//! Record storage on the RP2040's external flash
//!
//! The two persisted records live in the last sectors of the 2MB flash,
//! well clear of the program image.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use pixclock_core::storage::STORE_SIZE;
use pixclock_core::traits::{RecordStorage, StorageError};

/// Flash size of the supported boards
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the record store, sector aligned
pub const STORE_BASE: u32 = ((FLASH_SIZE - STORE_SIZE) / ERASE_SIZE * ERASE_SIZE) as u32;

/// Blocking flash driver implementing [`RecordStorage`]
pub struct FlashRecords<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashRecords<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }
}

impl RecordStorage for FlashRecords<'_> {
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), StorageError> {
        self.flash
            .blocking_read(offset, buffer)
            .map_err(|_| StorageError::Read)
    }

    fn erase_and_write(
        &mut self,
        offset: u32,
        capacity: u32,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let end = offset
            .checked_add(capacity)
            .ok_or(StorageError::OutOfBounds)?;
        if data.len() > capacity as usize || end as usize > FLASH_SIZE {
            return Err(StorageError::OutOfBounds);
        }

        self.flash
            .blocking_erase(offset, end)
            .map_err(|_| StorageError::Write)?;
        self.flash
            .blocking_write(offset, data)
            .map_err(|_| StorageError::Write)
    }
}
