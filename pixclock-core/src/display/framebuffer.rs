//! Monochrome framebuffer for the 64×32 matrix
//!
//! One bit per pixel, eight bytes per row. Bit 7 of a byte is its leftmost
//! pixel, so the scan driver can shift each row sector out MSB first.

use crate::error::CoreError;

/// Matrix width in pixels
pub const WIDTH: usize = 64;

/// Matrix height in pixels
pub const HEIGHT: usize = 32;

/// Bytes per row
pub const ROW_BYTES: usize = WIDTH / 8;

/// Total framebuffer size in bytes
pub const FRAME_BYTES: usize = ROW_BYTES * HEIGHT;

/// Pixel state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    #[default]
    Off,
    On,
}

impl Color {
    /// Opposite state
    pub fn inverted(self) -> Self {
        match self {
            Color::Off => Color::On,
            Color::On => Color::Off,
        }
    }
}

impl From<bool> for Color {
    fn from(lit: bool) -> Self {
        if lit {
            Color::On
        } else {
            Color::Off
        }
    }
}

/// Rectangular area, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    pub start_row: u8,
    pub end_row: u8,
    pub start_col: u8,
    pub end_col: u8,
}

impl Region {
    /// Whole matrix
    pub const FULL: Region = Region {
        start_row: 0,
        end_row: HEIGHT as u8 - 1,
        start_col: 0,
        end_col: WIDTH as u8 - 1,
    };

    /// Create a region, rejecting inverted or off-matrix bounds
    pub fn new(start_row: u8, end_row: u8, start_col: u8, end_col: u8) -> Result<Self, CoreError> {
        let region = Self {
            start_row,
            end_row,
            start_col,
            end_col,
        };
        if region.is_valid() {
            Ok(region)
        } else {
            Err(CoreError::InvalidRegion)
        }
    }

    /// Full-width band of rows
    pub fn rows(start_row: u8, end_row: u8) -> Result<Self, CoreError> {
        Self::new(start_row, end_row, 0, WIDTH as u8 - 1)
    }

    /// Returns true if the bounds are ordered and on the matrix
    pub fn is_valid(&self) -> bool {
        self.start_row <= self.end_row
            && self.start_col <= self.end_col
            && (self.end_row as usize) < HEIGHT
            && (self.end_col as usize) < WIDTH
    }

    pub fn width(&self) -> u8 {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> u8 {
        self.end_row - self.start_row + 1
    }

    /// Returns true if (x, y) lies inside
    pub fn contains(&self, x: u8, y: u8) -> bool {
        (self.start_col..=self.end_col).contains(&x) && (self.start_row..=self.end_row).contains(&y)
    }

    /// Box of half-extent `step` rows (twice that in columns) around the centre, clipped
    pub fn centred_box(&self, step: u8) -> Region {
        let mid_row = (self.start_row + self.end_row) / 2;
        let mid_col = (self.start_col + self.end_col) / 2;
        let col_step = step.saturating_mul(2);
        Region {
            start_row: mid_row.saturating_sub(step).max(self.start_row),
            end_row: mid_row.saturating_add(step).min(self.end_row),
            start_col: mid_col.saturating_sub(col_step).max(self.start_col),
            end_col: mid_col.saturating_add(col_step).min(self.end_col),
        }
    }
}

/// 1 bpp framebuffer
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: [u8; FRAME_BYTES],
}

impl core::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("lit", &self.lit_count())
            .finish()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a blank framebuffer
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_BYTES],
        }
    }

    /// Raw row sectors for the scan driver
    pub fn as_bytes(&self) -> &[u8; FRAME_BYTES] {
        &self.bytes
    }

    /// Overwrite from another buffer's bytes
    pub fn copy_from(&mut self, other: &FrameBuffer) {
        self.bytes.copy_from_slice(&other.bytes);
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Set one pixel; off-matrix coordinates are ignored
    pub fn set_pixel(&mut self, x: u8, y: u8, color: Color) {
        let (x, y) = (x as usize, y as usize);
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let index = y * ROW_BYTES + x / 8;
        let mask = 0x80 >> (x % 8);
        match color {
            Color::On => self.bytes[index] |= mask,
            Color::Off => self.bytes[index] &= !mask,
        }
    }

    /// Read one pixel; off-matrix coordinates read as off
    pub fn pixel(&self, x: u8, y: u8) -> Color {
        let (x, y) = (x as usize, y as usize);
        if x >= WIDTH || y >= HEIGHT {
            return Color::Off;
        }
        Color::from(self.bytes[y * ROW_BYTES + x / 8] & (0x80 >> (x % 8)) != 0)
    }

    /// Fill a region
    pub fn fill(&mut self, region: &Region, color: Color) {
        for y in region.start_row..=region.end_row {
            for x in region.start_col..=region.end_col {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Draw the one-pixel outline of a region
    pub fn border(&mut self, region: &Region, color: Color) {
        for x in region.start_col..=region.end_col {
            self.set_pixel(x, region.start_row, color);
            self.set_pixel(x, region.end_row, color);
        }
        for y in region.start_row..=region.end_row {
            self.set_pixel(region.start_col, y, color);
            self.set_pixel(region.end_col, y, color);
        }
    }

    /// Invert every pixel of a region
    pub fn invert(&mut self, region: &Region) {
        for y in region.start_row..=region.end_row {
            for x in region.start_col..=region.end_col {
                let color = self.pixel(x, y).inverted();
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Shift `rows` of `columns` left by one pixel and feed a new rightmost column
    ///
    /// Bit `n` of `column` lights row `start_row + n`.
    pub fn shift_left(&mut self, rows: &Region, column: u8) {
        for (n, y) in (rows.start_row..=rows.end_row).enumerate() {
            for x in rows.start_col..rows.end_col {
                let next = self.pixel(x + 1, y);
                self.set_pixel(x, y, next);
            }
            let lit = n < 8 && column & (1 << n) != 0;
            self.set_pixel(rows.end_col, y, Color::from(lit));
        }
    }

    /// Number of lit pixels
    pub fn lit_count(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Number of lit pixels inside a region
    pub fn lit_in(&self, region: &Region) -> u32 {
        let mut count = 0;
        for y in region.start_row..=region.end_row {
            for x in region.start_col..=region.end_col {
                if self.pixel(x, y) == Color::On {
                    count += 1;
                }
            }
        }
        count
    }
}
