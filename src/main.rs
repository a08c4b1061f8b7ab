use clap::Parser;
use log::info;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use chip8::display::{Display, HeadlessDisplay, MonoTermDisplay};
use chip8::driver::{DriverConfig, RunSummary, StopReason, TickDriver};
use chip8::input::{Controls, NoControls, TermControls};
use chip8::interpreter::Chip8Interpreter;

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "Run a CHIP-8 program in the terminal.")]
struct Args {
    /// ROM image to load at 0x200
    #[arg(value_name = "PATH")]
    rom: PathBuf,

    /// Instructions executed per second.
    #[arg(long, default_value_t = 700)]
    ips: u32,

    /// Frames presented per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for CXNN, to make runs repeatable.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many instructions.
    #[arg(long)]
    max_steps: Option<u64>,

    /// Don't touch the terminal; log the final screen instead.
    #[arg(long, default_value_t = false)]
    headless: bool,
}

fn run(
    args: &Args,
    display: &mut dyn Display,
    controls: &mut dyn Controls,
) -> Result<RunSummary, Box<dyn Error>> {
    let mut f = File::open(&args.rom)?;
    let mut interpreter = Chip8Interpreter::from_reader(display, &mut f)?;
    if let Some(seed) = args.seed {
        interpreter = interpreter.with_rng_seed(seed);
    }
    info!("running {}", args.rom.display());

    let mut driver = TickDriver::new(DriverConfig {
        ips: args.ips,
        fps: args.fps,
        max_steps: args.max_steps,
    });
    if args.headless {
        driver = driver.unpaced();
    }
    driver.run(&mut interpreter, controls)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let summary = if args.headless {
        let mut display = HeadlessDisplay::new();
        let summary = run(&args, &mut display, &mut NoControls)?;
        info!("final screen:\n{}", display.grid());
        summary
    } else {
        // controls first, so raw mode is dropped after the display lets go of
        // the alternate screen
        let mut controls = TermControls::new()?;
        let mut display = MonoTermDisplay::new()?;
        run(&args, &mut display, &mut controls)?
    };

    println!(
        "{} steps, {} frames: {}",
        summary.steps, summary.frames, summary.reason
    );
    match summary.reason {
        StopReason::Fault(e) => Err(e.into()),
        _ => Ok(()),
    }
}
