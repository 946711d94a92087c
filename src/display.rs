pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
// N is a single nibble
pub const MAX_SPRITE_HEIGHT: usize = 15;

/// Monochrome framebuffer, one byte (0 or 1) per pixel, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: [u8; WIDTH * HEIGHT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: [0; WIDTH * HEIGHT],
        }
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer = [0; WIDTH * HEIGHT];
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.bit_buffer[(y % HEIGHT) * WIDTH + (x % WIDTH)]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bit_buffer
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.bit_buffer.chunks(WIDTH)
    }

    /// XORs an 8-pixel-wide sprite onto the buffer at (x, y). Coordinates wrap
    /// around both edges. Returns whether any lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                let bit = (row >> (7 - j)) & 1;
                let (nx, ny) = ((x as usize + j) % WIDTH, (y as usize + i) % HEIGHT);
                let index = ny * WIDTH + nx;
                let previous = self.bit_buffer[index];
                if previous & bit == 1 {
                    collision = true;
                }
                self.bit_buffer[index] = previous ^ bit;
            }
        }
        collision
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|&p| if p == 1 { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
