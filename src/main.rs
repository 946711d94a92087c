// Host shell: window, keypad and cadence around the chip8vm core.
//
// Controls
//      Escape      quit
//      P           pause / resume
//      N           single step while paused
//      Backspace   reload the ROM

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{anyhow, Context};
use chip8vm::Emulator;
use clap::Parser;
use log::{error, info};
use minifb::Key;

use screen::Screen;

mod keyboard;
mod screen;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 virtual machine", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: Option<PathBuf>,

    /// Instructions executed per second; timers decay once per instruction
    #[arg(short, long, default_value_t = 300)]
    cycles_per_second: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Start paused
    #[arg(long, default_value_t = false)]
    paused: bool,

    /// Window scale: 1, 2, 4, 8, 16 or 32
    #[arg(long, default_value_t = 16)]
    scale: u8,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut emu = match args.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };

    let rom = match &args.rom {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read ROM {}", path.display()))?
        }
        None => Vec::new(),
    };
    emu.load_rom(&rom)?;
    info!("loaded {} byte ROM", rom.len());

    let scale = screen::scale_from(args.scale)
        .ok_or_else(|| anyhow!("unsupported scale {}", args.scale))?;
    let mut screen = Screen::new("chip8vm - ESC to exit", scale)?;

    let mut running = !args.paused;
    let mut budget = 0.0f64;
    let mut last_frame = Instant::now();

    while screen.is_open() {
        emu.keypad_mut().set_all(keyboard::read_keypad(&screen.held_keys()));

        if screen.was_pressed(Key::P) {
            running = !running;
            info!("{}\n{}", if running { "resumed" } else { "paused" }, emu.snapshot());
        }
        if screen.was_pressed(Key::Backspace) {
            emu.load_rom(&rom)?;
            info!("reloaded ROM");
        }

        let now = Instant::now();
        if running {
            let elapsed = now.duration_since(last_frame).as_secs_f64();
            budget = refill_budget(budget, elapsed, args.cycles_per_second);
            while budget >= 1.0 {
                budget -= 1.0;
                if let Err(err) = emu.step() {
                    error!("halted: {err}\n{}", emu.snapshot());
                    running = false;
                    budget = 0.0;
                    break;
                }
            }
        } else if screen.was_pressed(Key::N) {
            match emu.step() {
                Ok(op) => info!("step: {op}\n{}", emu.snapshot()),
                Err(err) => error!("halted: {err}"),
            }
        }
        last_frame = now;

        screen.sync(emu.display())?;
    }

    Ok(())
}

/// Adds the cycles owed for `elapsed` seconds, capped at one second's worth
/// so a stalled frame does not turn into a burst.
fn refill_budget(budget: f64, elapsed: f64, cycles_per_second: u32) -> f64 {
    let cps = cycles_per_second as f64;
    (budget + elapsed * cps).min(cps)
}
