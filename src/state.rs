//! Machine state: everything a CHIP-8 program can see, apart from the display.

use crate::error::LoadError;
use crate::instruction::Opcode;
use crate::memory::{Chip8MemoryMap, MemoryMap};

/// how many nested calls we allow
pub const CHIP8_STACK_DEPTH: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xf;

/// Fixed-depth return address stack. `sp` is the next free slot.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    slots: [u16; CHIP8_STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    /// push a return address; `None` if the stack is full, in which case
    /// nothing changes
    pub fn push(&mut self, addr: u16) -> Option<()> {
        let slot = self.slots.get_mut(self.sp)?;
        *slot = addr;
        self.sp += 1;
        Some(())
    }

    /// pop the most recent return address; `None` if there isn't one
    pub fn pop(&mut self) -> Option<u16> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.slots[self.sp])
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    /// the live return addresses, oldest first
    pub fn frames(&self) -> &[u16] {
        &self.slots[..self.sp]
    }
}

/// the state store; one per loaded program
pub struct MachineState {
    pub memory: Chip8MemoryMap,
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub stack: CallStack,
}

impl MachineState {
    pub fn new(program: &[u8]) -> Result<Self, LoadError> {
        let memory = Chip8MemoryMap::with_program(program)?;
        Ok(MachineState::from_memory(memory))
    }

    pub fn from_memory(memory: Chip8MemoryMap) -> Self {
        let pc = memory.program_addr;
        MachineState {
            memory,
            v: [0; 16],
            i: 0,
            pc,
            stack: CallStack::default(),
        }
    }

    /// the instruction word at PC
    pub fn fetch(&self) -> Opcode {
        Opcode::from_bytes(
            self.memory.read_byte(self.pc),
            self.memory.read_byte(self.pc.wrapping_add(1)),
        )
    }

    /// set VF; always last, so it wins when VF is also the destination
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = flag as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() -> Result<(), LoadError> {
        let s = MachineState::new(&[0x12, 0x00])?;
        assert_eq!(s.pc, 0x200);
        assert_eq!(s.i, 0);
        assert_eq!(s.v, [0; 16]);
        assert_eq!(s.stack.sp(), 0);
        assert_eq!(s.fetch(), Opcode(0x1200));
        Ok(())
    }

    #[test]
    fn test_fetch_wraps_at_top_of_ram() -> Result<(), LoadError> {
        let mut s = MachineState::new(&[0xe0])?;
        s.memory.write_byte(0x0fff, 0x00);
        s.pc = 0x0fff;
        s.memory.write_byte(0x0000, 0xee);
        assert_eq!(s.fetch(), Opcode(0x00ee));
        Ok(())
    }

    #[test]
    fn test_stack_bounds() {
        let mut st = CallStack::default();
        assert_eq!(st.pop(), None);
        assert_eq!(st.sp(), 0);
        for n in 0..CHIP8_STACK_DEPTH as u16 {
            assert_eq!(st.push(0x200 + n * 2), Some(()));
        }
        assert_eq!(st.push(0x300), None);
        assert_eq!(st.sp(), CHIP8_STACK_DEPTH);
        assert_eq!(st.frames().len(), CHIP8_STACK_DEPTH);
        assert_eq!(st.pop(), Some(0x21e));
        assert_eq!(st.sp(), CHIP8_STACK_DEPTH - 1);
    }

    #[test]
    fn test_flag_write() -> Result<(), LoadError> {
        let mut s = MachineState::new(&[])?;
        s.set_flag(true);
        assert_eq!(s.v[FLAG_REGISTER], 1);
        s.set_flag(false);
        assert_eq!(s.v[FLAG_REGISTER], 0);
        Ok(())
    }
}
