//! The tick driver: steps the interpreter at a steady rate and presents a
//! frame every so often. CHIP-8 instructions run as fast as possible then we
//! sleep out the rest of the frame, so the pacing is only right on average.

use crate::error::StepError;
use crate::input::Controls;
use crate::interpreter::Chip8Interpreter;
use log::{error, info};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

/// how fast to run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    /// instructions per second
    pub ips: u32,
    /// frames presented per second
    pub fps: u32,
    /// stop after this many instructions, if set
    pub max_steps: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            ips: 700,
            fps: 60,
            max_steps: None,
        }
    }
}

impl DriverConfig {
    /// instructions to run between presents; never zero
    pub fn steps_per_frame(&self) -> u32 {
        (self.ips / self.fps.max(1)).max(1)
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

/// why a run came to an end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// the controls asked us to stop
    Quit,
    /// hit `max_steps`
    StepLimit,
    /// the program did something it can't continue from
    Fault(StepError),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Quit => write!(f, "quit"),
            StopReason::StepLimit => write!(f, "step limit reached"),
            StopReason::Fault(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub frames: u64,
    pub reason: StopReason,
}

pub struct TickDriver {
    config: DriverConfig,
    /// skip sleeping entirely; for tests and headless runs
    unpaced: bool,
}

impl TickDriver {
    pub fn new(config: DriverConfig) -> Self {
        TickDriver {
            config,
            unpaced: false,
        }
    }

    /// run flat out, with no sleeping between frames
    pub fn unpaced(mut self) -> Self {
        self.unpaced = true;
        self
    }

    /// step `interpreter` until the controls ask to quit, the step limit is
    /// hit, or the program faults. a fault is reported in the summary, not
    /// as an `Err`; `Err` is for the display or controls going wrong
    pub fn run(
        &self,
        interpreter: &mut Chip8Interpreter,
        controls: &mut dyn Controls,
    ) -> Result<RunSummary, Box<dyn Error>> {
        let frame = self.config.frame_duration();
        let per_frame = self.config.steps_per_frame();
        let mut steps = 0u64;
        let mut frames = 0u64;
        info!(
            "running at {} instructions/s, {} per frame",
            self.config.ips, per_frame
        );

        let reason = 'frames: loop {
            let deadline = Instant::now() + frame;
            for _ in 0..per_frame {
                if self.config.max_steps.map_or(false, |max| steps >= max) {
                    break 'frames StopReason::StepLimit;
                }
                if let Err(e) = interpreter.step() {
                    error!("{}", e);
                    break 'frames StopReason::Fault(e);
                }
                steps += 1;
            }
            interpreter.display().present()?;
            frames += 1;
            if controls.quit_requested()? {
                break StopReason::Quit;
            }
            if !self.unpaced {
                spin_sleep::sleep(deadline.saturating_duration_since(Instant::now()));
            }
        };

        // whatever the last frame drew should still make it out
        interpreter.display().present()?;
        frames += 1;
        info!("stopped after {} steps, {} frames: {}", steps, frames, reason);
        Ok(RunSummary {
            steps,
            frames,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplay;
    use crate::input::NoControls;
    use std::io;

    struct QuitAfter(u32);
    impl Controls for QuitAfter {
        fn quit_requested(&mut self) -> Result<bool, io::Error> {
            self.0 = self.0.saturating_sub(1);
            Ok(self.0 == 0)
        }
    }

    #[test]
    fn test_steps_per_frame() {
        let c = DriverConfig::default();
        assert_eq!(c.steps_per_frame(), 11);
        let slow = DriverConfig {
            ips: 10,
            fps: 60,
            max_steps: None,
        };
        assert_eq!(slow.steps_per_frame(), 1);
        assert_eq!(slow.frame_duration(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn test_run_to_step_limit() -> Result<(), Box<dyn Error>> {
        let mut display = HeadlessDisplay::new();
        // spin forever
        let mut i = Chip8Interpreter::new(&mut display, &[0x12, 0x00])?;
        let driver = TickDriver::new(DriverConfig {
            ips: 100,
            fps: 10,
            max_steps: Some(25),
        })
        .unpaced();
        let summary = driver.run(&mut i, &mut NoControls)?;
        assert_eq!(summary.steps, 25);
        assert_eq!(summary.reason, StopReason::StepLimit);
        assert_eq!(summary.frames, 3);
        assert_eq!(display.presented(), 3);
        Ok(())
    }

    #[test]
    fn test_run_until_fault() -> Result<(), Box<dyn Error>> {
        let mut display = HeadlessDisplay::new();
        let mut i = Chip8Interpreter::new(&mut display, &[0x60, 0x01, 0xff, 0xff])?;
        let summary = TickDriver::new(DriverConfig::default())
            .unpaced()
            .run(&mut i, &mut NoControls)?;
        assert_eq!(summary.steps, 1);
        assert_eq!(
            summary.reason,
            StopReason::Fault(StepError::UndefinedOpcode {
                opcode: 0xffff,
                pc: 0x202
            })
        );
        Ok(())
    }

    #[test]
    fn test_run_until_quit() -> Result<(), Box<dyn Error>> {
        let mut display = HeadlessDisplay::new();
        let mut i = Chip8Interpreter::new(&mut display, &[0x12, 0x00])?;
        let summary = TickDriver::new(DriverConfig::default())
            .unpaced()
            .run(&mut i, &mut QuitAfter(2))?;
        assert_eq!(summary.reason, StopReason::Quit);
        assert_eq!(summary.steps, 22);
        assert_eq!(summary.frames, 3);
        Ok(())
    }
}
