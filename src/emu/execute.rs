use rand::Rng;

use super::{
    Chip8, Chip8Error, Chip8Result, FONT_GLYPH_SIZE, FONT_HIGH_GLYPH_SIZE,
    FONT_HIGH_START_ADDRESS, FONT_START_ADDRESS, Opcode, OpcodeALU, StackFault,
};
use crate::{u4, u12};

impl Chip8 {
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<Chip8Result, Chip8Error> {
        let pc = self.pc;
        self.pc = self.pc.wrapping_add(2);

        match opcode {
            Opcode::ClearDisplay => {
                self.display.clear();
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::JumpWithOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                self.stack.push(self.pc).map_err(|e| stack_error(e, pc))?;
                self.pc = nnn;
            }
            Opcode::Return => {
                self.pc = self.stack.pop().map_err(|e| stack_error(e, pc))?;
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                if self.v[x] == nn {
                    self.skip();
                }
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                if self.v[x] != nn {
                    self.skip();
                }
            }
            Opcode::SkipRegEqualReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.skip();
                }
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.skip();
                }
            }
            Opcode::SetRegImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndexReg { x } => {
                let sum = self.i.value() + u16::from(self.v[x]);
                self.i = u12::new(sum);
                self.v[0xF] = if sum > u12::MASK { 1 } else { 0 };
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n);
            }
            Opcode::SkipIfPressed { x } => {
                if self.keypad.is_pressed(u4::from_low_bits(self.v[x])) {
                    self.skip();
                }
            }
            Opcode::SkipIfNotPressed { x } => {
                if !self.keypad.is_pressed(u4::from_low_bits(self.v[x])) {
                    self.skip();
                }
            }
            Opcode::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(x));
            }
            Opcode::ReadDelayTimer { x } => {
                self.v[x] = self.timers.delay;
            }
            Opcode::SetDelayTimer { x } => {
                self.timers.delay = self.v[x];
            }
            Opcode::SetSoundTimer { x } => {
                self.timers.sound = self.v[x];
            }
            Opcode::FontChar { x } => {
                let digit = usize::from(u4::from_low_bits(self.v[x]));
                self.i = u12::new((FONT_START_ADDRESS + digit * FONT_GLYPH_SIZE) as u16);
            }
            Opcode::FontCharHigh { x } => {
                let digit = usize::from(u4::from_low_bits(self.v[x]));
                self.i =
                    u12::new((FONT_HIGH_START_ADDRESS + digit * FONT_HIGH_GLYPH_SIZE) as u16);
            }
            Opcode::BCD { x } => {
                let value = self.v[x];
                self.memory.write(self.i, value / 100);
                self.memory.write(self.i.wrapping_add(1), (value / 10) % 10);
                self.memory.write(self.i.wrapping_add(2), value % 10);
            }
            Opcode::StoreRegs { x } => {
                for reg_index in 0..=usize::from(x) {
                    self.memory.write(self.i, self.v[reg_index]);
                    self.i = self.i.wrapping_add(1);
                }
            }
            Opcode::LoadRegs { x } => {
                for reg_index in 0..=usize::from(x) {
                    self.v[reg_index] = self.memory.read(self.i);
                    self.i = self.i.wrapping_add(1);
                }
            }
            Opcode::StoreFlags { x } => {
                let count = usize::from(x) + 1;
                self.rpl_flags[..count].copy_from_slice(&self.v[..count]);
            }
            Opcode::LoadFlags { x } => {
                let count = usize::from(x) + 1;
                self.v[..count].copy_from_slice(&self.rpl_flags[..count]);
            }
            Opcode::Exit => {
                log::info!("Program exited at {:#05X}", pc);
                self.alive = false;
                return Ok(Chip8Result::Halted);
            }
            Opcode::Unknown(opcode) => {
                return Err(Chip8Error::UnknownOpcode { opcode, pc });
            }
        };

        Ok(Chip8Result::Continue)
    }

    /// Skips the next instruction; the program counter already points past the current one.
    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    // Results are written before VF so a flag always wins when x is F
    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        match op {
            OpcodeALU::Set => self.v[x] = self.v[y],
            OpcodeALU::Or => self.v[x] |= self.v[y],
            OpcodeALU::And => self.v[x] &= self.v[y],
            OpcodeALU::Xor => self.v[x] ^= self.v[y],
            OpcodeALU::Add => {
                let (res, overflow) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = if overflow { 1 } else { 0 };
            }
            OpcodeALU::Sub => {
                let (res, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = if borrow { 0 } else { 1 }; // Notice that borrow is inverted
            }
            OpcodeALU::SubReverse => {
                let (res, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = res;
                self.v[0xF] = if borrow { 0 } else { 1 };
            }
            OpcodeALU::ShiftRight => {
                let lsb = self.v[x] & 1;
                self.v[x] >>= 1;
                self.v[0xF] = lsb;
            }
            OpcodeALU::ShiftLeft => {
                let msb = (self.v[x] >> 7) & 1;
                self.v[x] <<= 1;
                self.v[0xF] = msb;
            }
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) {
        let rows = (0..u16::from(n.value()))
            .map(|row| self.memory.read(self.i.wrapping_add(row)));

        let any_erased = self.display.draw_sprite(self.v[x], self.v[y], rows);
        self.v[0xF] = if any_erased { 1 } else { 0 };
    }

    fn execute_wait_for_key(&mut self, x: u4) -> Chip8Result {
        match self.keypad.highest_pressed() {
            Some(key) => {
                self.v[x] = key.value();
                Chip8Result::Continue
            }
            None => {
                // Repeat this instruction until a key is pressed
                self.pc = self.pc.wrapping_sub(2);
                Chip8Result::WaitingForKey
            }
        }
    }
}

fn stack_error(fault: StackFault, pc: u12) -> Chip8Error {
    match fault {
        StackFault::Overflow => Chip8Error::StackOverflow { pc },
        StackFault::Underflow => Chip8Error::StackUnderflow { pc },
    }
}
