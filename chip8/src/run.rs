use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;

use c8vm::Chip8;
use display::{Color, Display};

use crate::beeper::Beeper;
use crate::keymap::keymap;

const TITLE: &str = "CHIP-8 Emulator";

/// Everything the host needs to know before it starts running a ROM
#[derive(Debug, Clone)]
pub struct Settings {
    pub rom: PathBuf,
    /// Instructions executed per 60Hz frame
    pub ipf: u16,
    /// Beeper pitch in Hz
    pub tone: u16,
    pub background: Color,
    pub foreground: Color,
    /// Size of a Chip-8 pixel on screen
    pub scale: u32,
}

/// Length of the `frame`th frame; 16, 17, 17 ms averages out to 60Hz
fn frame_duration(frame: u32) -> Duration {
    Duration::from_millis(if frame % 3 == 0 { 16 } else { 17 })
}

fn load(chip8: &mut Chip8, settings: &Settings) -> Result<()> {
    chip8
        .load_rom_file(&settings.rom)
        .with_context(|| format!("unable to load {}", settings.rom.display()))?;
    info!("loaded {}", settings.rom.display());
    Ok(())
}

/// Reloads the ROM, leaving a reset machine behind when that fails
fn restart(chip8: &mut Chip8, settings: &Settings) {
    info!("restarting");
    chip8.reset();
    if let Err(e) = load(chip8, settings) {
        warn!("{:#}", e);
    }
}

pub fn run(settings: Settings) -> Result<()> {
    let mut chip8: Chip8 = Chip8::new();
    load(&mut chip8, &settings)?;

    // Get SDL2 context
    let sdl = sdl2::init().map_err(|e| anyhow!(e)).context("unable to initialise SDL")?;
    let mut display = Display::new(
        &sdl,
        TITLE,
        settings.scale,
        settings.background,
        settings.foreground,
    )
    .map_err(|e| anyhow!(e))
    .context("unable to open a window")?;
    let mut beeper = Beeper::new(&sdl, settings.tone)
        .map_err(|e| anyhow!(e))
        .context("unable to open an audio device")?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    let mut ipf = settings.ipf;
    let mut frame: u32 = 0;
    let mut frames: u32 = 0;
    let mut last_frame = Instant::now();
    let mut last_title = Instant::now();

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::Window {
                    win_event: WindowEvent::Close,
                    ..
                } => break 'event,
                Event::KeyDown {
                    scancode: Some(key),
                    ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Scancode::Escape, _) => break 'event,
                    (Scancode::Backspace, _) => restart(&mut chip8, &settings),
                    (Scancode::KpPlus, _) => ipf = ipf.saturating_add(1),
                    (Scancode::KpMinus, _) => ipf = ipf.saturating_sub(1),
                    _ => continue,
                },
                Event::KeyUp {
                    scancode: Some(key),
                    ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_release(kc);
                    }
                }
                _ => continue,
            };
        }

        // Handle timing
        let elapsed = last_frame.elapsed();
        let frame_time = frame_duration(frame);
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
        last_frame = Instant::now();

        // Update state
        chip8.tick_timers();
        for _ in 0..ipf {
            if let Err(fault) = chip8.cycle() {
                warn!("{}", fault);
            }
        }

        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame).map_err(|e| anyhow!(e))?;
        }

        if chip8.sound_active() {
            beeper.beep();
        } else {
            beeper.mute();
        }

        frame = frame.wrapping_add(1);
        frames += 1;
        if last_title.elapsed() >= Duration::from_secs(1) {
            let title = format!(
                "{} ({} FPS; {} IPS) - {}",
                TITLE,
                frames,
                u32::from(ipf) * frames,
                settings.rom.display()
            );
            display.set_title(&title).map_err(|e| anyhow!(e))?;
            last_title = Instant::now();
            frames = 0;
        }
    }

    Ok(())
}
