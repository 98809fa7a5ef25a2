use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use display::Color;

mod beeper;
mod keymap;
mod run;

use run::{run, Settings};

const DEFAULT_IPF: u16 = 9;
const DEFAULT_TONE: u16 = 440;

/// Runs a CHIP-8 ROM in a window
///
/// Escape quits, Backspace restarts the ROM and keypad +/- change the emulation speed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions executed per frame
    #[arg(long, default_value_t = DEFAULT_IPF)]
    ipf: u16,

    /// Beeper pitch in Hz
    #[arg(long, default_value_t = DEFAULT_TONE)]
    tone: u16,

    /// Background colour as hex RGB
    #[arg(long, default_value = "000000", value_parser = parse_color)]
    bg_color: Color,

    /// Foreground colour as hex RGB
    #[arg(long, default_value = "00FF00", value_parser = parse_color)]
    fg_color: Color,

    /// Size of a CHIP-8 pixel on screen
    #[arg(long, default_value_t = 10)]
    scale: u32,
}

fn parse_color(hex: &str) -> Result<Color, String> {
    let digits = hex.trim_start_matches('#').trim_start_matches("0x");
    if digits.is_empty() || digits.len() > 6 {
        return Err(format!("{:?} is not a 6 digit hex colour", hex));
    }
    u32::from_str_radix(digits, 16)
        .map(Color::from_rgb)
        .map_err(|e| format!("{:?} is not a hex colour: {}", hex, e))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run(Settings {
        rom: args.rom,
        ipf: args.ipf,
        tone: args.tone,
        background: args.bg_color,
        foreground: args.fg_color,
        scale: args.scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(&["chip8", "pong.ch8"]).unwrap();
        assert_eq!(args.rom, PathBuf::from("pong.ch8"));
        assert_eq!(args.ipf, DEFAULT_IPF);
        assert_eq!(args.tone, DEFAULT_TONE);
        assert_eq!(args.bg_color, Color(0x00, 0x00, 0x00));
        assert_eq!(args.fg_color, Color(0x00, 0xFF, 0x00));
        assert_eq!(args.scale, 10);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from(&[
            "chip8",
            "pong.ch8",
            "--ipf",
            "20",
            "--fg-color",
            "#FFFFFF",
            "--bg-color",
            "0x102030",
        ])
        .unwrap();
        assert_eq!(args.ipf, 20);
        assert_eq!(args.fg_color, Color(0xFF, 0xFF, 0xFF));
        assert_eq!(args.bg_color, Color(0x10, 0x20, 0x30));
    }

    #[test]
    fn test_parse_color_rejects_junk() {
        assert!(parse_color("GGGGGG").is_err());
        assert!(parse_color("1234567").is_err());
        assert!(parse_color("").is_err());
    }
}
