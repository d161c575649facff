use crate::u4;

/// State of the 16 key hex keypad (true = pressed).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn set(&mut self, key: u4, pressed: bool) {
        self.keys[key] = pressed;
    }

    pub fn is_pressed(&self, key: u4) -> bool {
        self.keys[key]
    }

    /// The highest numbered key currently held down, if any.
    pub fn highest_pressed(&self) -> Option<u4> {
        self.keys
            .iter()
            .rposition(|&pressed| pressed)
            .map(|key| u4::new(key as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_pressed_prefers_larger_key() {
        let mut keypad = Keypad::default();
        assert_eq!(keypad.highest_pressed(), None);

        keypad.set(u4::new(0x3), true);
        keypad.set(u4::new(0xA), true);
        assert_eq!(keypad.highest_pressed(), Some(u4::new(0xA)));

        keypad.set(u4::new(0xA), false);
        assert_eq!(keypad.highest_pressed(), Some(u4::new(0x3)));
        assert!(!keypad.is_pressed(u4::new(0xA)));
    }
}
