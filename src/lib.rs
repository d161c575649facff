//! A CHIP-8 / SCHIP interpreter core.
//!
//! [`Chip8`] owns all machine state and is driven one cycle at a time through
//! [`Chip8::run_cycle`]. Rendering, audio and input live outside the library and talk to
//! the interpreter through the display buffer, the beep trigger and the keypad.

pub mod emu;
mod nibble;

pub use emu::*;
pub use nibble::*;
