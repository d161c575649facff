use std::fmt;
use std::ops::{Index, IndexMut};

/// A 4-bit unsigned integer (nibble).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub struct u4(u8);

impl u4 {
    /// Creates a new `u4` from a `u8`.
    ///
    /// Panics if the value is greater than 0x0F.
    pub const fn new(value: u8) -> Self {
        assert!(value <= 0x0F, "u4 value must be in range 0x0-0xF");
        Self(value)
    }

    /// Keeps only the low four bits of `value`.
    pub const fn from_low_bits(value: u8) -> Self {
        Self(value & 0x0F)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u4> for usize {
    fn from(v: u4) -> usize {
        v.0 as usize
    }
}

impl<T> Index<u4> for [T; 16] {
    type Output = T;

    fn index(&self, index: u4) -> &Self::Output {
        &self[index.0 as usize]
    }
}

impl<T> IndexMut<u4> for [T; 16] {
    fn index_mut(&mut self, index: u4) -> &mut Self::Output {
        &mut self[index.0 as usize]
    }
}

/// A 12-bit address. Every constructor and arithmetic operation wraps modulo 4096,
/// so an `u12` can always index the 4KB memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
pub struct u12(u16);

impl u12 {
    pub const MASK: u16 = 0x0FFF;

    /// Creates a new `u12`, discarding everything above the low 12 bits.
    pub const fn new(value: u16) -> Self {
        Self(value & Self::MASK)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn wrapping_add(self, rhs: u16) -> Self {
        Self::new(self.0.wrapping_add(rhs))
    }

    pub const fn wrapping_sub(self, rhs: u16) -> Self {
        Self::new(self.0.wrapping_sub(rhs))
    }
}

impl From<u12> for usize {
    fn from(v: u12) -> usize {
        v.0 as usize
    }
}

impl From<u12> for u16 {
    fn from(v: u12) -> u16 {
        v.0
    }
}

impl fmt::UpperHex for u12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl<T> Index<u12> for [T; 4096] {
    type Output = T;

    fn index(&self, index: u12) -> &Self::Output {
        &self[index.0 as usize]
    }
}

impl<T> IndexMut<u12> for [T; 4096] {
    fn index_mut(&mut self, index: u12) -> &mut Self::Output {
        &mut self[index.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u12_wraps_on_construction_and_arithmetic() {
        assert_eq!(u12::new(0x1234).value(), 0x234);
        assert_eq!(u12::new(0xFFF).wrapping_add(1).value(), 0x000);
        assert_eq!(u12::new(0xFFE).wrapping_add(4).value(), 0x002);
        assert_eq!(u12::new(0x000).wrapping_sub(2).value(), 0xFFE);
    }

    #[test]
    fn u4_from_low_bits_masks() {
        assert_eq!(u4::from_low_bits(0xAB).value(), 0xB);
        assert_eq!(usize::from(u4::new(0xF)), 15);
    }

    #[test]
    #[should_panic]
    fn u4_new_rejects_wide_values() {
        let _ = u4::new(0x10);
    }
}
