use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, warn};
use std::fmt;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// CHIP-8 screen width in pixels
pub const CHIP8_DISPLAY_WIDTH: usize = 64;
/// CHIP-8 screen height in pixels
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// turn every pixel off
    fn clear(&mut self);

    /// XOR a sprite onto the screen at (x, y); true if any pixel was turned
    /// off in the process
    fn composite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool;

    /// push the current pixels out to whatever is showing them. only the
    /// tick driver calls this, never the interpreter
    fn present(&mut self) -> Result<(), io::Error>;
}

/// A monochrome 64x32 framebuffer, and the sprite compositor that draws on it.
/// Displays own one of these and forward `clear`/`composite` to it.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelGrid {
    rows: [[bool; CHIP8_DISPLAY_WIDTH]; CHIP8_DISPLAY_HEIGHT],
}

impl PixelGrid {
    pub fn new() -> Self {
        PixelGrid {
            rows: [[false; CHIP8_DISPLAY_WIDTH]; CHIP8_DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        for row in self.rows.iter_mut() {
            row.fill(false);
        }
    }

    /// each byte of `sprite` is one row, MSB leftmost. anything that falls
    /// off the right or bottom edge wraps back round to the left or top
    pub fn composite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (dy, bits) in sprite.iter().enumerate() {
            let py = (y as usize + dy) % CHIP8_DISPLAY_HEIGHT;
            for dx in 0..8 {
                if bits & (0x80 >> dx) == 0 {
                    continue;
                }
                let px = (x as usize + dx) % CHIP8_DISPLAY_WIDTH;
                let pixel = &mut self.rows[py][px];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
        collision
    }

    /// is the pixel at (x, y) lit? coordinates must be on screen
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.rows[y][x]
    }

    /// how many pixels are lit
    pub fn lit_count(&self) -> usize {
        self.rows.iter().flatten().filter(|p| **p).count()
    }

    /// coordinates of every pixel that matches `lit`, in canvas space (y
    /// grows upward, so rows are negated)
    fn bitplane(&self, lit: bool) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(y, row)| {
            row.iter()
                .enumerate()
                .filter(move |(_, p)| **p == lit)
                .map(move |(x, _)| (x as f64, -1.0 * y as f64))
        })
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        PixelGrid::new()
    }
}

/// one character per pixel; handy for logs and test failures
impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows.iter() {
            for p in row.iter() {
                f.write_str(if *p { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelGrid(\n{})", self)
    }
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    grid: PixelGrid,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT),
            grid: PixelGrid::new(),
        })
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
            warn!("couldn't restore terminal screen: {}", e);
        }
    }
}

impl Display for MonoTermDisplay {
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn composite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        self.grid.composite(x, y, rows)
    }

    fn present(&mut self) -> Result<(), io::Error> {
        let grid = &self.grid;
        let resolution = &self.resolution;

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &grid.bitplane(false).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &grid.bitplane(true).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing, and for running without a terminal
pub struct HeadlessDisplay {
    grid: PixelGrid,
    presented: usize,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        HeadlessDisplay {
            grid: PixelGrid::new(),
            presented: 0,
        }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut PixelGrid {
        &mut self.grid
    }

    /// how many frames have been presented
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        HeadlessDisplay::new()
    }
}

impl Display for HeadlessDisplay {
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn composite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        self.grid.composite(x, y, rows)
    }

    fn present(&mut self) -> Result<(), io::Error> {
        self.presented += 1;
        debug!("frame {}: {} pixels lit", self.presented, self.grid.lit_count());
        Ok(())
    }
}
