/// # interpreter
///
/// One call to `step()` is one trip round fetch/decode/execute:
///  1. fetch the big-endian word at PC
///  2. decode it into an `Instruction`, or fail with `UndefinedOpcode`
///  3. execute it against the machine state, which yields the next PC
///
/// PC only moves once an instruction has executed successfully, so after any
/// error the state still points at the instruction that faulted.
///
/// the interpreter has no sense of time. the tick driver decides how often to
/// step, and when to present the display.
use crate::display::Display;
use crate::error::{LoadError, StepError};
use crate::input::{Keypad, Unplugged};
use crate::instruction::{Instruction, Opcode};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::state::MachineState;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// tallest sprite a DXYN can draw
const CHIP8_MAX_SPRITE_ROWS: usize = 15;

pub struct Chip8Interpreter<'a> {
    state: MachineState,
    display: &'a mut dyn Display,
    keypad: &'a dyn Keypad,
    rng: StdRng,
}

impl<'a> Chip8Interpreter<'a> {
    /// set up a fresh machine with `program` loaded at 0x200
    pub fn new(display: &'a mut dyn Display, program: &[u8]) -> Result<Self, LoadError> {
        let state = MachineState::new(program)?;
        info!("loaded {} byte program", program.len());
        Ok(Chip8Interpreter::with_state(display, state))
    }

    /// as `new`, but read the program from a file or whatever
    pub fn from_reader(
        display: &'a mut dyn Display,
        reader: &mut impl io::Read,
    ) -> Result<Self, LoadError> {
        let memory = Chip8MemoryMap::read_program(reader)?;
        info!("loaded program from reader");
        Ok(Chip8Interpreter::with_state(
            display,
            MachineState::from_memory(memory),
        ))
    }

    fn with_state(display: &'a mut dyn Display, state: MachineState) -> Self {
        Chip8Interpreter {
            state,
            display,
            keypad: &Unplugged,
            rng: StdRng::from_entropy(),
        }
    }

    /// make CXNN repeatable
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// plug in something that knows which keys are held down
    pub fn with_keypad(mut self, keypad: &'a dyn Keypad) -> Self {
        self.keypad = keypad;
        self
    }

    /// load a new chip8 program, throwing away all state from the last one.
    /// if the new program can't be loaded, the old one is left alone
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        let memory = Chip8MemoryMap::read_program(reader)?;
        self.state = MachineState::from_memory(memory);
        info!("reloaded program; state reset");
        Ok(())
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn sp(&self) -> usize {
        self.state.stack.sp()
    }

    /// the I register
    pub fn index(&self) -> u16 {
        self.state.i
    }

    /// V0-VF
    pub fn registers(&self) -> &[u8; 16] {
        &self.state.v
    }

    /// live return addresses, oldest first
    pub fn stack_frames(&self) -> &[u16] {
        self.state.stack.frames()
    }

    /// all 4K of RAM
    pub fn memory(&self) -> &[u8] {
        self.state.memory.as_slice()
    }

    /// the display we're drawing on; the tick driver uses this to present
    pub fn display(&mut self) -> &mut (dyn Display + 'a) {
        &mut *self.display
    }

    /// fetch, decode and execute exactly one instruction
    pub fn step(&mut self) -> Result<(), StepError> {
        let pc = self.state.pc;
        let op = self.state.fetch();
        let instr = Instruction::decode(op).ok_or(StepError::UndefinedOpcode { opcode: op.0, pc })?;
        trace!("{:04x}: {} {:?}", pc, op, instr);
        self.state.pc = self.execute(op, instr)?;
        Ok(())
    }

    /// carry out `instr` (which was decoded from `op`) and work out where PC
    /// goes next. nothing is written to PC here
    fn execute(&mut self, op: Opcode, instr: Instruction) -> Result<u16, StepError> {
        use Instruction::*;
        let pc = self.state.pc;
        let next = pc.wrapping_add(2);
        let skip = pc.wrapping_add(4);
        let s = &mut self.state;

        let new_pc = match instr {
            // flow control
            Clear => {
                debug!("{:04x}: clear screen", pc);
                self.display.clear();
                next
            }
            Return => {
                let ret = s.stack.pop().ok_or(StepError::StackUnderflow { opcode: op.0, pc })?;
                debug!("{:04x}: return to {:04x}", pc, ret);
                ret.wrapping_add(2)
            }
            Jump(addr) => addr,
            Call(addr) => {
                s.stack
                    .push(pc)
                    .ok_or(StepError::StackOverflow { opcode: op.0, pc })?;
                debug!("{:04x}: call {:04x} (depth {})", pc, addr, s.stack.sp());
                addr
            }
            JumpOffset(addr) => addr.wrapping_add(s.v[0] as u16),
            SkipEqImm(x, nn) => skip_if(s.v[x as usize] == nn, next, skip),
            SkipNeImm(x, nn) => skip_if(s.v[x as usize] != nn, next, skip),
            SkipEqReg(x, y) => skip_if(s.v[x as usize] == s.v[y as usize], next, skip),
            SkipNeReg(x, y) => skip_if(s.v[x as usize] != s.v[y as usize], next, skip),
            SkipKeyPressed(x) => skip_if(self.keypad.is_pressed(s.v[x as usize] & 0xf), next, skip),
            SkipKeyNotPressed(x) => {
                skip_if(!self.keypad.is_pressed(s.v[x as usize] & 0xf), next, skip)
            }

            // arithmetic and logic
            LoadImm(x, nn) => {
                s.v[x as usize] = nn;
                next
            }
            AddImm(x, nn) => {
                s.v[x as usize] = s.v[x as usize].wrapping_add(nn);
                next
            }
            Move(x, y) => {
                s.v[x as usize] = s.v[y as usize];
                next
            }
            Or(x, y) => {
                s.v[x as usize] |= s.v[y as usize];
                next
            }
            And(x, y) => {
                s.v[x as usize] &= s.v[y as usize];
                next
            }
            Xor(x, y) => {
                s.v[x as usize] ^= s.v[y as usize];
                next
            }
            AddCarry(x, y) => {
                let (sum, carry) = s.v[x as usize].overflowing_add(s.v[y as usize]);
                s.v[x as usize] = sum;
                s.set_flag(carry);
                next
            }
            Sub(x, y) => {
                let (vx, vy) = (s.v[x as usize], s.v[y as usize]);
                s.v[x as usize] = vx.wrapping_sub(vy);
                s.set_flag(vx >= vy);
                next
            }
            SubReversed(x, y) => {
                let (vx, vy) = (s.v[x as usize], s.v[y as usize]);
                s.v[x as usize] = vy.wrapping_sub(vx);
                s.set_flag(vy >= vx);
                next
            }
            ShiftRight(x) => {
                let vx = s.v[x as usize];
                s.v[x as usize] = vx >> 1;
                s.set_flag(vx & 0x01 != 0);
                next
            }
            ShiftLeft(x) => {
                let vx = s.v[x as usize];
                s.v[x as usize] = vx << 1;
                s.set_flag(vx & 0x80 != 0);
                next
            }
            Random(x, nn) => {
                s.v[x as usize] = self.rng.gen::<u8>() & nn;
                next
            }

            // index register and memory
            LoadIndex(addr) => {
                s.i = addr;
                next
            }
            AddIndex(x) => {
                s.i = s.i.wrapping_add(s.v[x as usize] as u16);
                next
            }
            StoreBcd(x) => {
                let vx = s.v[x as usize];
                s.memory.write(&[vx / 100, vx / 10 % 10, vx % 10], s.i);
                next
            }
            StoreRegisters(x) => {
                let regs = &s.v[..=x as usize];
                s.memory.write(regs, s.i);
                next
            }
            LoadRegisters(x) => {
                s.memory.read_into(s.i, &mut s.v[..=x as usize]);
                next
            }
            Draw(x, y, n) => {
                let mut rows = [0u8; CHIP8_MAX_SPRITE_ROWS];
                let rows = &mut rows[..n as usize];
                s.memory.read_into(s.i, rows);
                let collision = self
                    .display
                    .composite(s.v[x as usize], s.v[y as usize], rows);
                s.set_flag(collision);
                next
            }

            // timers and fonts aren't modelled
            ReadDelayTimer(_) | SetDelayTimer(_) | SetSoundTimer(_) | FontAddress(_) => {
                debug!("{:04x}: {} not modelled; skipped", pc, op);
                next
            }
        };
        Ok(new_pc)
    }
}

fn skip_if(cond: bool, next: u16, skip: u16) -> u16 {
    if cond {
        skip
    } else {
        next
    }
}
