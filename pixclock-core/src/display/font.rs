//! 5×7 glyph table
//!
//! Glyphs are stored column by column, bit 0 at the top row. Only the
//! printable range 0x20..=0x5F is present; lowercase letters are folded to
//! uppercase and anything else renders as `?`.

use super::framebuffer::{Color, FrameBuffer, Region};

/// Glyph height in rows
pub const GLYPH_HEIGHT: u8 = 7;

/// Blank columns after every glyph
pub const GLYPH_SPACING: u8 = 1;

/// Width of a space
const SPACE_WIDTH: u8 = 3;

const FIRST: u8 = 0x20;
const LAST: u8 = 0x5F;

/// Font variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    #[default]
    Normal,
    /// Each column smeared one pixel right
    Bold,
}

#[rustfmt::skip]
static GLYPHS: [[u8; 5]; (LAST - FIRST + 1) as usize] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x56, 0x20, 0x50], // &
    [0x00, 0x08, 0x07, 0x03, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x72, 0x49, 0x49, 0x49, 0x46], // 2
    [0x21, 0x41, 0x49, 0x4D, 0x33], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x31], // 6
    [0x41, 0x21, 0x11, 0x09, 0x07], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x46, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x00, 0x14, 0x00, 0x00], // :
    [0x00, 0x40, 0x34, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x59, 0x09, 0x06], // ?
    [0x3E, 0x41, 0x5D, 0x59, 0x4E], // @
    [0x7C, 0x12, 0x11, 0x12, 0x7C], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x41, 0x3E], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x73], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x1C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x26, 0x49, 0x49, 0x49, 0x32], // S
    [0x03, 0x01, 0x7F, 0x01, 0x03], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x59, 0x49, 0x4D, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x41, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
];

/// Columns of one rendered glyph, at most six wide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    columns: [u8; 6],
    width: u8,
}

impl Glyph {
    /// Column bytes, bit 0 = top row
    pub fn columns(&self) -> &[u8] {
        &self.columns[..self.width as usize]
    }

    /// Width in pixels, spacing excluded
    pub fn width(&self) -> u8 {
        self.width
    }
}

/// Look up and trim the glyph for `ch`
pub fn glyph(ch: u8, font: Font) -> Glyph {
    if ch == b' ' {
        return Glyph {
            columns: [0; 6],
            width: SPACE_WIDTH,
        };
    }

    let ch = ch.to_ascii_uppercase();
    let ch = if (FIRST..=LAST).contains(&ch) { ch } else { b'?' };
    let raw = &GLYPHS[(ch - FIRST) as usize];

    // Proportional: drop blank columns on both sides
    let first = raw.iter().position(|&c| c != 0).unwrap_or(0);
    let last = raw.iter().rposition(|&c| c != 0).unwrap_or(0);

    let mut columns = [0u8; 6];
    let mut width = 0;
    for &column in &raw[first..=last] {
        columns[width] = column;
        width += 1;
    }

    if font == Font::Bold {
        let mut previous = 0;
        for column in columns.iter_mut().take(width + 1) {
            let own = *column;
            *column |= previous;
            previous = own;
        }
        width += 1;
    }

    Glyph {
        columns,
        width: width as u8,
    }
}

/// Width of `text` in pixels, spacing included
pub fn text_width(text: &str, font: Font) -> u16 {
    text.bytes()
        .map(|ch| (glyph(ch, font).width() + GLYPH_SPACING) as u16)
        .sum()
}

/// Draw `text` with its top-left corner at (x, y), clipped to `clip`
///
/// Returns the column just past the last glyph.
pub fn draw_text(fb: &mut FrameBuffer, clip: &Region, x: u8, y: u8, text: &str, font: Font) -> u8 {
    let mut cursor = x as u16;

    for ch in text.bytes() {
        let glyph = glyph(ch, font);
        for (dx, &column) in glyph.columns().iter().enumerate() {
            let px = cursor + dx as u16;
            if px > clip.end_col as u16 {
                return clip.end_col;
            }
            for row in 0..GLYPH_HEIGHT {
                let py = y + row;
                if clip.contains(px as u8, py) {
                    fb.set_pixel(px as u8, py, Color::from(column & (1 << row) != 0));
                }
            }
        }
        cursor += (glyph.width() + GLYPH_SPACING) as u16;
    }

    cursor.min(u8::MAX as u16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_widths() {
        assert_eq!(glyph(b'A', Font::Normal).width(), 5);
        assert_eq!(glyph(b'1', Font::Normal).width(), 3);
        assert_eq!(glyph(b':', Font::Normal).width(), 1);
        assert_eq!(glyph(b' ', Font::Normal).width(), 3);
    }

    #[test]
    fn test_lowercase_folds() {
        assert_eq!(glyph(b'a', Font::Normal), glyph(b'A', Font::Normal));
    }

    #[test]
    fn test_unknown_is_question_mark() {
        assert_eq!(glyph(0x7F, Font::Normal), glyph(b'?', Font::Normal));
        assert_eq!(glyph(0xC3, Font::Normal), glyph(b'?', Font::Normal));
    }

    #[test]
    fn test_bold_is_wider_and_superset() {
        let normal = glyph(b'I', Font::Normal);
        let bold = glyph(b'I', Font::Bold);
        assert_eq!(bold.width(), normal.width() + 1);
        for (n, b) in normal.columns().iter().zip(bold.columns()) {
            assert_eq!(n & b, *n);
        }
    }

    #[test]
    fn test_text_width() {
        // 5 + 1 + 1 + 1 + 5 + 1
        assert_eq!(text_width("A:A", Font::Normal), 14);
    }

    #[test]
    fn test_draw_text_clips() {
        let mut fb = FrameBuffer::new();
        let clip = Region::new(0, 7, 0, 7).unwrap();
        let end = draw_text(&mut fb, &clip, 0, 0, "HH", Font::Normal);
        assert_eq!(end, 7);
        let outside = Region::new(0, 31, 8, 63).unwrap();
        assert_eq!(fb.lit_in(&outside), 0);
        // H is lit on both outer columns
        assert_eq!(fb.pixel(0, 0), Color::On);
        assert_eq!(fb.pixel(4, 0), Color::On);
    }
}
