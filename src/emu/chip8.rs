use std::path::Path;

use rand::{SeedableRng, rngs::StdRng};

use super::{
    Chip8Error, Chip8Result, Display, DisplayBuffer, Keypad, LoadError, Memory, Mode, Opcode,
    Stack, Timers,
};
use crate::{u4, u12};

// Conventional program load address
pub const ROM_START_ADDRESS: u12 = u12::new(0x200);
pub const RPL_FLAG_COUNT: usize = 8;

/// Interpreter state
pub struct Chip8 {
    /// 4KB memory array
    pub(crate) memory: Memory,
    /// Display buffer: 64x32 monochrome pixels plus dirty flag
    pub(crate) display: DisplayBuffer,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u12,
    /// Index register: used for memory operations
    pub(crate) i: u12,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Call stack for subroutine returns
    pub(crate) stack: Stack,

    /// Delay and sound timers, ticked once per cycle
    pub(crate) timers: Timers,
    /// Set when the sound timer runs out, cleared by `take_beep`
    pub(crate) beep: bool,

    /// Keypad state: 16 keys mapped as booleans (true = pressed)
    pub(crate) keypad: Keypad,
    /// RPL user flags, only reachable in super mode
    pub(crate) rpl_flags: [u8; RPL_FLAG_COUNT],

    pub(crate) rng: StdRng,
    pub(crate) mode: Mode,
    /// Cleared by the exit instruction or a fatal error
    pub(crate) alive: bool,
}

impl Chip8 {
    /// Classic interpreter with a randomly seeded generator.
    pub fn new() -> Self {
        Self::with_mode(Mode::Classic)
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self::with_rng(mode, StdRng::from_os_rng())
    }

    /// Fixed seed, so CXNN produces a reproducible sequence.
    pub fn with_seed(mode: Mode, seed: u64) -> Self {
        Self::with_rng(mode, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mode: Mode, rng: StdRng) -> Self {
        Chip8 {
            memory: Memory::new(),
            display: DisplayBuffer::new(),
            pc: ROM_START_ADDRESS,
            i: u12::new(0),
            v: [0; 16],
            stack: Stack::new(),
            timers: Timers::default(),
            beep: false,
            keypad: Keypad::default(),
            rpl_flags: [0; RPL_FLAG_COUNT],
            rng,
            mode,
            alive: true,
        }
    }

    /// Loads a program at the conventional start address.
    pub fn load(&mut self, rom: &[u8]) {
        self.load_at(rom, ROM_START_ADDRESS);
    }

    /// Copies a program into memory at `offset`.
    ///
    /// Nothing is validated: a program longer than the remaining memory wraps around
    /// to address 0x000 and overwrites whatever is there.
    pub fn load_at(&mut self, rom: &[u8], offset: u12) {
        if self.memory.load(offset, rom) {
            log::warn!(
                "Program of {} bytes at {:#05X} wrapped past the end of memory",
                rom.len(),
                offset
            );
        }
        log::info!("Loaded {} bytes at {:#05X}", rom.len(), offset);
    }

    /// Reads a program file and loads it at the conventional start address.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let rom = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&rom);
        Ok(())
    }

    /// Runs one instruction followed by one timer tick.
    ///
    /// Fatal errors halt the interpreter; every later call returns `Chip8Result::Halted`
    /// without touching state.
    pub fn run_cycle(&mut self) -> Result<Chip8Result, Chip8Error> {
        if !self.alive {
            return Ok(Chip8Result::Halted);
        }

        let result = self.step()?;

        if self.timers.tick() {
            self.beep = true;
        }

        Ok(result)
    }

    /// Fetches, decodes and executes a single instruction without ticking the timers.
    pub fn step(&mut self) -> Result<Chip8Result, Chip8Error> {
        if !self.alive {
            return Ok(Chip8Result::Halted);
        }

        let pc = self.pc;
        let opcode = self.memory.read_word(pc);
        let decoded_opcode = Opcode::decode(opcode, self.mode);
        log::trace!("{:#05X}: {:04X} {:?}", pc, opcode, decoded_opcode);

        self.execute(decoded_opcode).inspect_err(|e| {
            log::error!("{e}");
            // A halted machine keeps pointing at the faulting instruction
            self.pc = pc;
            self.alive = false;
        })
    }

    /// Returns true once if the sound timer ran out since the last call.
    pub fn take_beep(&mut self) -> bool {
        std::mem::take(&mut self.beep)
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad.set(key, pressed);
    }

    pub fn is_key_pressed(&self, key: u4) -> bool {
        self.keypad.is_pressed(key)
    }

    /// Get the state of a pixel on the display (1 = on, 0 = off).
    pub fn get_display_pixel(&self, y: usize, x: usize) -> u8 {
        self.display.pixel(y, x)
    }

    pub fn display(&self) -> &Display<u8> {
        self.display.pixels()
    }

    /// True if the display changed since the last `mark_display_clean`.
    pub fn is_display_dirty(&self) -> bool {
        self.display.is_dirty()
    }

    pub fn mark_display_clean(&mut self) {
        self.display.mark_clean();
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pc(&self) -> u12 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u12) {
        self.pc = pc;
    }

    pub fn i(&self) -> u12 {
        self.i
    }

    pub fn set_i(&mut self, i: u12) {
        self.i = i;
    }

    pub fn register(&self, reg: u4) -> u8 {
        self.v[reg]
    }

    pub fn set_register(&mut self, reg: u4, value: u8) {
        self.v[reg] = value;
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.timers.delay = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.timers.sound = value;
    }

    /// Current number of nested subroutine calls.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn read_memory(&self, addr: u12) -> u8 {
        self.memory.read(addr)
    }

    pub fn write_memory(&mut self, addr: u12, value: u8) {
        self.memory.write(addr, value);
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let chip8 = Chip8::new();

        assert_eq!(chip8.pc(), u12::new(512));
        assert_eq!(chip8.i(), u12::new(0));
        assert_eq!(chip8.stack_depth(), 0);
        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 0);
        assert!(chip8.is_alive());
        assert!(!chip8.is_display_dirty());
        assert_eq!(chip8.memory()[0], 0xF0);
        assert!(chip8.memory()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn register_file_integrity() {
        let mut chip8 = Chip8::new();

        for reg in 0..16u8 {
            chip8.set_register(u4::new(reg), reg.wrapping_mul(17).wrapping_add(3));
        }
        for reg in 0..16u8 {
            assert_eq!(
                chip8.register(u4::new(reg)),
                reg.wrapping_mul(17).wrapping_add(3)
            );
        }
    }

    #[test]
    fn load_places_program_at_start_address() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x12, 0x34, 0x56]);

        assert_eq!(&chip8.memory()[0x200..0x203], &[0x12, 0x34, 0x56]);
        assert_eq!(chip8.pc(), ROM_START_ADDRESS);
    }

    #[test]
    fn oversize_program_wraps_instead_of_failing() {
        let mut chip8 = Chip8::new();
        let rom: Vec<u8> = (0..4000u32).map(|b| (b % 251) as u8).collect();
        chip8.load(&rom);

        // The first 3584 bytes fill 0x200..=0xFFF, the rest continues at 0x000
        let wrapped_index = 4096 - 0x200;
        assert_eq!(chip8.memory()[0x000], rom[wrapped_index]);
        assert_eq!(chip8.memory()[0xFFF], rom[wrapped_index - 1]);
    }

    #[test]
    fn load_file_reports_missing_file() {
        let mut chip8 = Chip8::new();
        let err = chip8
            .load_file("this/path/does/not/exist.ch8")
            .unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("exist.ch8"));
    }

    #[test]
    fn load_file_places_bytes_at_start_address() {
        let path = std::env::temp_dir().join(format!("cookie8-load-{}.ch8", std::process::id()));
        std::fs::write(&path, [0x60, 0x2A, 0x12, 0x02]).unwrap();

        let mut chip8 = Chip8::new();
        let result = chip8.load_file(&path);
        std::fs::remove_file(&path).unwrap();

        result.unwrap();
        assert_eq!(&chip8.memory()[0x200..0x204], &[0x60, 0x2A, 0x12, 0x02]);
        assert_eq!(chip8.read_memory(u12::new(0x204)), 0);

        chip8.run_cycle().unwrap();
        assert_eq!(chip8.register(u4::new(0)), 0x2A);
    }

    #[test]
    fn memory_and_keypad_accessors() {
        let mut chip8 = Chip8::with_mode(Mode::Super);
        assert_eq!(chip8.mode(), Mode::Super);

        chip8.write_memory(u12::new(0x300), 0xAB);
        assert_eq!(chip8.read_memory(u12::new(0x300)), 0xAB);

        assert!(!chip8.is_key_pressed(u4::new(0xA)));
        chip8.set_key(u4::new(0xA), true);
        assert!(chip8.is_key_pressed(u4::new(0xA)));
        chip8.set_key(u4::new(0xA), false);
        assert!(!chip8.is_key_pressed(u4::new(0xA)));
    }

    #[test]
    fn timers_tick_once_per_cycle() {
        let mut chip8 = Chip8::new();
        // 1200: jump to self
        chip8.load(&[0x12, 0x00]);
        chip8.set_delay_timer(5);

        for n in 1..=8u8 {
            chip8.run_cycle().unwrap();
            assert_eq!(chip8.delay_timer(), 5u8.saturating_sub(n));
        }
    }

    #[test]
    fn beep_is_raised_once() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x12, 0x00]);
        chip8.set_sound_timer(2);

        chip8.run_cycle().unwrap();
        assert!(!chip8.take_beep());
        chip8.run_cycle().unwrap();
        assert!(chip8.take_beep());
        assert!(!chip8.take_beep());
        chip8.run_cycle().unwrap();
        assert!(!chip8.take_beep());
    }

    #[test]
    fn unknown_opcode_halts_the_run() {
        let mut chip8 = Chip8::new();
        chip8.load(&[0x60, 0x07, 0xFF, 0xFF, 0x61, 0x01]);

        assert_eq!(chip8.run_cycle(), Ok(Chip8Result::Continue));
        assert_eq!(
            chip8.run_cycle(),
            Err(Chip8Error::UnknownOpcode {
                opcode: 0xFFFF,
                pc: u12::new(0x202)
            })
        );
        assert!(!chip8.is_alive());
        assert_eq!(chip8.pc(), u12::new(0x202));

        // Further cycles do nothing
        assert_eq!(chip8.run_cycle(), Ok(Chip8Result::Halted));
        assert_eq!(chip8.pc(), u12::new(0x202));
        assert_eq!(chip8.register(u4::new(1)), 0);
    }

    #[test]
    fn seeded_generators_repeat() {
        let program = [0xC0, 0xFF, 0xC1, 0xFF, 0xC2, 0xFF];
        let mut a = Chip8::with_seed(Mode::Classic, 42);
        let mut b = Chip8::with_seed(Mode::Classic, 42);
        a.load(&program);
        b.load(&program);

        for _ in 0..3 {
            a.run_cycle().unwrap();
            b.run_cycle().unwrap();
        }
        for reg in 0..3 {
            assert_eq!(a.register(u4::new(reg)), b.register(u4::new(reg)));
        }
    }
}
