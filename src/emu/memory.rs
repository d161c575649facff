use super::{
    FONT, FONT_END_ADDRESS, FONT_HIGH, FONT_HIGH_END_ADDRESS, FONT_HIGH_START_ADDRESS,
    FONT_START_ADDRESS,
};
use crate::u12;

pub(crate) const MEMORY_SIZE: usize = 4096;

/// 4KB of byte addressable memory. Addresses are `u12`, so every access wraps modulo 4096.
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with both glyph fonts in place.
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        bytes[FONT_HIGH_START_ADDRESS..FONT_HIGH_END_ADDRESS].copy_from_slice(&FONT_HIGH);
        Self { bytes }
    }

    pub fn read(&self, addr: u12) -> u8 {
        self.bytes[addr]
    }

    pub fn write(&mut self, addr: u12, value: u8) {
        self.bytes[addr] = value;
    }

    /// Reads a big endian 16-bit word; the second byte wraps to 0x000 after 0xFFF.
    pub fn read_word(&self, addr: u12) -> u16 {
        u16::from_be_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Copies `data` starting at `offset`, wrapping past the end of memory.
    ///
    /// Returns true if the copy wrapped.
    pub fn load(&mut self, offset: u12, data: &[u8]) -> bool {
        let mut addr = offset;
        for &byte in data {
            self.write(addr, byte);
            addr = addr.wrapping_add(1);
        }
        usize::from(offset) + data.len() > MEMORY_SIZE
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fonts_are_preloaded() {
        let mem = Memory::new();
        assert_eq!(&mem.as_slice()[0x000..0x005], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(mem.read(u12::new(0x04F)), 0x80);
        assert_eq!(mem.read(u12::new(0x050)), 0xFF);
        assert_eq!(mem.read(u12::new(0x0EF)), 0xC0);
        assert_eq!(mem.read(u12::new(0x0F0)), 0x00);
    }

    #[test]
    fn load_wraps_past_end_of_memory() {
        let mut mem = Memory::new();
        let wrapped = mem.load(u12::new(0xFFE), &[1, 2, 3, 4]);

        assert!(wrapped);
        assert_eq!(mem.read(u12::new(0xFFE)), 1);
        assert_eq!(mem.read(u12::new(0xFFF)), 2);
        assert_eq!(mem.read(u12::new(0x000)), 3);
        assert_eq!(mem.read(u12::new(0x001)), 4);
    }

    #[test]
    fn load_that_fits_does_not_report_wrap() {
        let mut mem = Memory::new();
        assert!(!mem.load(u12::new(0xFFC), &[1, 2, 3, 4]));
    }

    #[test]
    fn read_word_is_big_endian_and_wraps() {
        let mut mem = Memory::new();
        mem.write(u12::new(0x200), 0x12);
        mem.write(u12::new(0x201), 0x34);
        assert_eq!(mem.read_word(u12::new(0x200)), 0x1234);

        mem.write(u12::new(0xFFF), 0xAB);
        mem.write(u12::new(0x000), 0xCD);
        assert_eq!(mem.read_word(u12::new(0xFFF)), 0xABCD);
    }
}
