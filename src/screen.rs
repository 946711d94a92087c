use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use chip8vm::display::{FrameBuffer, HEIGHT, WIDTH};

const OFF: u32 = 0x000000;
const ON: u32 = 0x007FFF;

pub struct Screen {
    pixel_buffer: Vec<u32>,
    window: Window,
}

impl Screen {
    pub fn new(title: &str, scale: Scale) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));
        Ok(Self {
            pixel_buffer: vec![OFF; WIDTH * HEIGHT],
            window,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn held_keys(&self) -> Vec<Key> {
        self.window.get_keys()
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    pub fn sync(&mut self, fb: &FrameBuffer) -> Result<(), minifb::Error> {
        for (pixel, &bit) in self.pixel_buffer.iter_mut().zip(fb.as_slice()) {
            *pixel = if bit == 1 { ON } else { OFF };
        }
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
    }
}

pub fn scale_from(factor: u8) -> Option<Scale> {
    match factor {
        1 => Some(Scale::X1),
        2 => Some(Scale::X2),
        4 => Some(Scale::X4),
        8 => Some(Scale::X8),
        16 => Some(Scale::X16),
        32 => Some(Scale::X32),
        _ => None,
    }
}
