use super::{DISPLAY_X, DISPLAY_Y, Display};

/// 64x32 monochrome frame buffer. Cells hold 0 or 1.
///
/// The dirty flag is raised by every clear and draw and lowered only by the consumer
/// through [`DisplayBuffer::mark_clean`].
pub struct DisplayBuffer {
    pixels: Display<u8>,
    dirty: bool,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [[0; DISPLAY_X]; DISPLAY_Y],
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_X]; DISPLAY_Y];
        self.dirty = true;
    }

    /// XORs an 8 pixel wide sprite into the buffer and reports whether any lit pixel was erased.
    ///
    /// The start position wraps around the screen; rows and columns that run past the
    /// right or bottom edge are clipped.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: impl IntoIterator<Item = u8>) -> bool {
        let x_pos = x as usize % DISPLAY_X;
        let y_pos = y as usize % DISPLAY_Y;

        // Don't draw out of bounds
        let max_rows = DISPLAY_Y - y_pos;
        let col_count = std::cmp::min(8, DISPLAY_X - x_pos);

        let mut any_erased = false;
        for (row, sprite_byte) in rows.into_iter().take(max_rows).enumerate() {
            for col in 0..col_count {
                // If current sprite bit is non-zero
                if (sprite_byte & (0x80 >> col)) != 0 {
                    let pixel = &mut self.pixels[y_pos + row][x_pos + col];

                    // Flip the pixel
                    *pixel ^= 1;

                    if *pixel == 0 {
                        any_erased = true;
                    }
                }
            }
        }

        self.dirty = true;
        any_erased
    }

    pub fn pixels(&self) -> &Display<u8> {
        &self.pixels
    }

    /// Get the state of a pixel (1 = on, 0 = off).
    pub fn pixel(&self, y: usize, x: usize) -> u8 {
        self.pixels[y][x]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the renderer once it has consumed the current frame.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}
