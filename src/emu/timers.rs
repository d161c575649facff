/// Delay and sound down-counters, ticked once per interpreter cycle.
#[derive(Debug, Default)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// Decrements both timers, stopping at zero.
    ///
    /// Returns true on the tick where the sound timer runs out (1 -> 0), which is
    /// the single point where a beep is requested.
    pub fn tick(&mut self) -> bool {
        self.delay = self.delay.saturating_sub(1);

        let beep = self.sound == 1;
        self.sound = self.sound.saturating_sub(1);
        beep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_count_down_to_zero_and_stay() {
        let mut timers = Timers { delay: 5, sound: 3 };

        for n in 1..=10u8 {
            timers.tick();
            assert_eq!(timers.delay, 5u8.saturating_sub(n));
            assert_eq!(timers.sound, 3u8.saturating_sub(n));
        }
    }

    #[test]
    fn beep_fires_once_when_sound_runs_out() {
        let mut timers = Timers { delay: 0, sound: 3 };

        let beeps: Vec<bool> = (0..6).map(|_| timers.tick()).collect();
        assert_eq!(beeps, [false, false, true, false, false, false]);
    }

    #[test]
    fn idle_sound_timer_never_beeps() {
        let mut timers = Timers::default();
        assert!((0..4).all(|_| !timers.tick()));
    }
}
