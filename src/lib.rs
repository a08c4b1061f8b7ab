//! A CHIP-8 interpreter core.
//!
//! ## Design
//!
//! * the interpreter is a small state machine: `step()` runs exactly one
//!   instruction and either succeeds or reports why it couldn't
//! * abstract display so can plug alternatives; a TUI in-console one and a
//!   headless one for tests
//! * the interpreter has no clock. pacing is the tick driver's job, so the
//!   core can be stepped as fast or as slowly as anyone likes
//! * keys and timers are capabilities the interpreter calls out to, and for
//!   now nothing much sits behind them
//!
//! Model
//!
//! ```text
//! main
//!  |-- display, controls, config
//!  |-- interpreter(display, program)
//!  |    |-- machine state: memory, V0-VF, I, PC, call stack
//!  |    `-- instruction set
//!  `-- tick driver
//!       |-- for each frame: interpreter.step() * (ips / fps)
//!       |-- display.present()
//!       `-- sleep out the rest of the frame
//! ```
pub mod display;
pub mod driver;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod state;

pub use display::{Display, HeadlessDisplay, MonoTermDisplay, PixelGrid};
pub use driver::{DriverConfig, RunSummary, StopReason, TickDriver};
pub use error::{LoadError, StepError};
pub use input::{Controls, Keypad, NoControls, TermControls, Unplugged};
pub use interpreter::Chip8Interpreter;
