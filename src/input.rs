use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::{debug, warn};
use std::io;
use std::time::Duration;

/// answers "is this CHIP-8 key held down?" for EX9E/EXA1. keys are 0x0-0xf
pub trait Keypad {
    fn is_pressed(&self, key: u8) -> bool;
}

/// a keypad with nothing plugged in; every key is up
pub struct Unplugged;

impl Keypad for Unplugged {
    fn is_pressed(&self, _key: u8) -> bool {
        false
    }
}

/// emulator controls (not CHIP-8 keys), polled by the tick driver between
/// frames
pub trait Controls {
    /// has the user asked to stop?
    fn quit_requested(&mut self) -> Result<bool, io::Error>;
}

/// reads Esc / 'q' from the terminal, using crossterm in raw mode
pub struct TermControls {
    quit: bool,
}

impl TermControls {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermControls { quit: false })
    }

    fn read_events(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
                    code => debug!("ignoring key {:?}", code),
                },
                Event::Resize(w, h) => debug!("terminal resized to {}x{}", w, h),
                _ => warn!("unknown event received"),
            }
        }
        Ok(())
    }
}

impl Drop for TermControls {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("couldn't restore terminal mode: {}", e);
        }
    }
}

impl Controls for TermControls {
    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        self.read_events()?;
        Ok(self.quit)
    }
}

/// never asks to quit; the run ends on its own or not at all
pub struct NoControls;

impl Controls for NoControls {
    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        Ok(false)
    }
}
