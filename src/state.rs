use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ADDRESS, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET,
    STACK_SIZE,
};

/// The FrameBuffer is indexed as [y][x]; 0 is background and 1 is foreground
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// The pressed status of keys 0..F
pub type Keypad = [bool; 16];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented at 60Hz
/// - the host beeps while the sound timer is nonzero
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x200 is reserved; the sprite sheet lives at `FONT_ADDRESS`
///     - ROMs are loaded at 0x200
/// - 32x64 frame buffer and a flag set whenever it needs redrawing
///
/// ## Input
/// - pressed status of keys 0..F, latched by the host before each batch of cycles
/// - the register an FX0A instruction is waiting to fill, if any
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub pressed_keys: Keypad,
    pub awaiting_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_ADDRESS as usize;
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            pressed_keys: [false; 16],
            awaiting_key: None,
        }
    }

    /// Returns `len` bytes of memory starting at `address`, or the first address past the end
    pub fn memory_slice(&self, address: usize, len: usize) -> Result<&[u8], usize> {
        self.memory
            .get(address..address + len)
            .ok_or_else(|| address.max(MEMORY_SIZE))
    }

    /// Mutable counterpart of `memory_slice`
    pub fn memory_slice_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8], usize> {
        self.memory
            .get_mut(address..address + len)
            .ok_or_else(|| address.max(MEMORY_SIZE))
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
