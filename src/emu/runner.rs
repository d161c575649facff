use super::{Chip8, Chip8Error, Chip8Result, Display};
use crate::u4;

/// One cycle every 1.2ms.
pub const DEFAULT_CYCLE_HZ: f32 = 833.0;

// Longest stretch of wall-clock time a single update will catch up on
const MAX_UPDATE_DT: f32 = 0.25;

/// High-level emulator runner that manages timing internally.
pub struct Chip8Runner {
    chip8: Chip8,
    cycle_time_step: f32,
    dt_accumulator: f32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Chip8RunnerResult {
    Ok,
    /// The program exited; nothing more will run.
    Halted,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self::with_cycle_hz(chip8, DEFAULT_CYCLE_HZ)
    }

    /// Runs at `cycle_hz` cycles per second, clamped to at least 1 Hz.
    ///
    /// Non-finite rates fall back to [`DEFAULT_CYCLE_HZ`].
    pub fn with_cycle_hz(chip8: Chip8, cycle_hz: f32) -> Self {
        let cycle_hz = if cycle_hz.is_finite() {
            cycle_hz.max(1.0)
        } else {
            log::warn!("Ignoring cycle rate {cycle_hz}, using {DEFAULT_CYCLE_HZ} Hz");
            DEFAULT_CYCLE_HZ
        };

        Self {
            chip8,
            cycle_time_step: 1.0 / cycle_hz,
            dt_accumulator: 0.0,
        }
    }

    /// Update emulator by delta time.
    ///
    /// Runs as many whole cycles as fit in the accumulated time. The first error stops
    /// the update and is returned; the interpreter stays halted afterwards.
    pub fn update(&mut self, dt: f32) -> Result<Chip8RunnerResult, Chip8Error> {
        self.dt_accumulator += dt.min(MAX_UPDATE_DT);

        while self.dt_accumulator >= self.cycle_time_step {
            self.dt_accumulator -= self.cycle_time_step;

            if self.chip8.run_cycle()? == Chip8Result::Halted {
                self.dt_accumulator = 0.0;
                return Ok(Chip8RunnerResult::Halted);
            }
        }

        Ok(Chip8RunnerResult::Ok)
    }

    /// Returns true once per expired sound timer, indicating a beep should be played.
    pub fn take_beep(&mut self) -> bool {
        self.chip8.take_beep()
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.chip8.set_key(key, pressed)
    }

    /// Returns the display if it changed since the last call, marking it clean.
    pub fn take_frame(&mut self) -> Option<&Display<u8>> {
        if self.chip8.is_display_dirty() {
            self.chip8.mark_display_clean();
            Some(self.chip8.display())
        } else {
            None
        }
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}
