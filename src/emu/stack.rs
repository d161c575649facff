use crate::u12;

pub const STACK_DEPTH: usize = 16;

/// Fixed depth return address stack.
#[derive(Debug, Default)]
pub struct Stack {
    entries: [u12; STACK_DEPTH],
    sp: usize,
}

/// The stack was pushed while full or popped while empty.
#[derive(Debug, PartialEq, Eq)]
pub enum StackFault {
    Overflow,
    Underflow,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, addr: u12) -> Result<(), StackFault> {
        let slot = self.entries.get_mut(self.sp).ok_or(StackFault::Overflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u12, StackFault> {
        self.sp = self.sp.checked_sub(1).ok_or(StackFault::Underflow)?;
        Ok(self.entries[self.sp])
    }

    /// Number of return addresses currently held.
    pub fn len(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }
}
