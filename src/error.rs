use std::io;

/// why a program couldn't be turned into a runnable interpreter
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("couldn't read ROM: {0}")]
    Io(#[from] io::Error),
}

/// why a single fetch/decode/execute step couldn't complete; all of these
/// end the run
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StepError {
    #[error("undefined opcode {opcode:#06x} at {pc:#06x}")]
    UndefinedOpcode { opcode: u16, pc: u16 },

    #[error("stack overflow: call {opcode:#06x} at {pc:#06x} with a full call stack")]
    StackOverflow { opcode: u16, pc: u16 },

    #[error("stack underflow: return {opcode:#06x} at {pc:#06x} with an empty call stack")]
    StackUnderflow { opcode: u16, pc: u16 },
}

impl StepError {
    /// the instruction word that faulted
    pub fn opcode(&self) -> u16 {
        match *self {
            StepError::UndefinedOpcode { opcode, .. }
            | StepError::StackOverflow { opcode, .. }
            | StepError::StackUnderflow { opcode, .. } => opcode,
        }
    }

    /// where the faulting instruction lives
    pub fn pc(&self) -> u16 {
        match *self {
            StepError::UndefinedOpcode { pc, .. }
            | StepError::StackOverflow { pc, .. }
            | StepError::StackUnderflow { pc, .. } => pc,
        }
    }
}
