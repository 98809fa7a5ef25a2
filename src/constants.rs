/// Total addressable memory in bytes
pub const MEMORY_SIZE: usize = 4096;

/// Where ROMs are loaded and where the program counter starts
pub const PROGRAM_START: u16 = 0x200;

/// Largest ROM that fits between `PROGRAM_START` and the end of memory
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of return addresses the call stack can hold
pub const STACK_SIZE: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Rate at which the delay and sound timers count down
pub const TIMER_HZ: u32 = 60;

/// Address of the first glyph in the sprite sheet
pub const FONT_ADDRESS: u16 = 0x050;

/// Each glyph is 4 pixels wide and 5 rows tall, one byte per row
pub const GLYPH_STRIDE: u16 = 5;

/// # Sprite Sheet
/// Glyphs for the hexadecimal digits 0..F, copied to `FONT_ADDRESS` on reset.
///
/// ```text
/// "0"     Binary   Hex
/// ****    11110000 0xF0
/// *  *    10010000 0x90
/// *  *    10010000 0x90
/// *  *    10010000 0x90
/// ****    11110000 0xF0
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
