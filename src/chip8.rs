use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::error::{Fault, LoadError};
use crate::instruction::Operation;
use crate::opcode::Instruction;
use crate::operations::*;
use crate::state::{FrameBuffer, Keypad, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - a random number generator for CXNN
///
/// Supplies interfaces for:
/// - resetting and loading roms
/// - latching the pressed keys
/// - fetching, decoding and executing instructions
/// - advancing its timers
/// - inspecting its frame buffer and sound timer for some host to present
pub struct Chip8 {
    state: State,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8 {
            state: State::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// A Chip8 whose CXNN results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Chip8 {
            state: State::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Puts the machine back into its power-on state without touching the random number generator
    pub fn reset(&mut self) {
        debug!("resetting machine state");
        self.state = State::new();
    }

    /// Resets the machine and copies `rom` to the program start
    ///
    /// Nothing is written if the rom doesn't fit.
    pub fn load_bytes(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.reset();
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte ROM at {:#06X}", rom.len(), start);
        Ok(())
    }

    /// Load a rom from some reader
    ///
    /// # Arguments
    /// * `reader` a reader that contains a ROM
    /// Reads at most one byte past the largest ROM, so endless readers are still rejected.
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), LoadError> {
        let mut rom = Vec::with_capacity(MAX_ROM_SIZE + 1);
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        self.load_bytes(&rom)
    }

    /// Load a rom from a file on disk
    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io(e),
        })?;
        let size = file.metadata()?.len() as usize;
        if size > MAX_ROM_SIZE {
            self.reset();
            return Err(LoadError::TooLarge {
                size,
                max_size: MAX_ROM_SIZE,
            });
        }
        self.load_rom(&mut file)
    }

    /// Latch the pressed status of every key at once
    pub fn set_keys(&mut self, keys: Keypad) {
        self.state.pressed_keys = keys;
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.state.pressed_keys[(key & 0xF) as usize] = true;
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.state.pressed_keys[(key & 0xF) as usize] = false;
    }

    /// Gets the opcode currently pointed at by the pc and moves the pc past it.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    /// Bytes past the end of memory read as 0; `execute` catches the pc running off the end.
    pub fn fetch(&mut self) -> u16 {
        let pc = self.state.pc as usize;
        let left = u16::from(self.byte_at(pc));
        let right = u16::from(self.byte_at(pc + 1));
        self.state.pc = self.state.pc.wrapping_add(0x2);
        left << 8 | right
    }

    fn byte_at(&self, address: usize) -> u8 {
        self.state.memory.get(address).copied().unwrap_or(0)
    }

    /// Applies a single instruction to the machine
    ///
    /// If the instruction leaves the pc past the end of memory it is put back at the program start.
    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), Fault> {
        let operation = Operation::try_from(instruction)?;
        let random_byte = match operation {
            Operation::Random { .. } => self.rng.gen(),
            _ => 0,
        };

        let state = &mut self.state;
        match operation {
            Operation::Nop => nop(state),
            Operation::Cls => clr(state),
            Operation::Ret => rts(state),
            Operation::Jump { nnn } => jump(state, nnn),
            Operation::Call { nnn } => call(state, nnn),
            Operation::SkipEqImm { x, nn } => ske(state, x, nn),
            Operation::SkipNeImm { x, nn } => skne(state, x, nn),
            Operation::SkipEqReg { x, y } => skre(state, x, y),
            Operation::LoadImm { x, nn } => load(state, x, nn),
            Operation::AddImm { x, nn } => add(state, x, nn),
            Operation::Move { x, y } => mv(state, x, y),
            Operation::Or { x, y } => or(state, x, y),
            Operation::And { x, y } => and(state, x, y),
            Operation::Xor { x, y } => xor(state, x, y),
            Operation::AddReg { x, y } => addr(state, x, y),
            Operation::Sub { x, y } => sub(state, x, y),
            Operation::ShiftRight { x, y } => shr(state, x, y),
            Operation::SubN { x, y } => subn(state, x, y),
            Operation::ShiftLeft { x, y } => shl(state, x, y),
            Operation::SkipNeReg { x, y } => skrne(state, x, y),
            Operation::LoadI { nnn } => loadi(state, nnn),
            Operation::JumpOffset { nnn } => jumpi(state, nnn),
            Operation::Random { x, nn } => rand(state, x, nn, random_byte),
            Operation::Draw { x, y, n } => draw(state, x, y, n),
            Operation::SkipPressed { x } => skpr(state, x),
            Operation::SkipNotPressed { x } => skup(state, x),
            Operation::LoadDelay { x } => moved(state, x),
            Operation::WaitKey { x } => keyd(state, x),
            Operation::SetDelay { x } => loads(state, x),
            Operation::SetSound { x } => ld(state, x),
            Operation::AddI { x } => addi(state, x),
            Operation::LoadGlyph { x } => ldspr(state, x),
            Operation::Bcd { x } => bcd(state, x),
            Operation::Store { x } => stor(state, x),
            Operation::Read { x } => read(state, x),
        }?;

        if state.pc as usize >= MEMORY_SIZE {
            let pc = state.pc;
            state.pc = PROGRAM_START;
            return Err(Fault::PcOverflow { pc });
        }
        Ok(())
    }

    /// Advances the CPU by a single cycle
    /// - fetches the opcode at the pc
    /// - decodes it
    /// - executes it
    pub fn cycle(&mut self) -> Result<(), Fault> {
        let pc = self.state.pc;
        let op = self.fetch();
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            pc
        );
        self.execute(&Instruction::decode(op))
    }

    /// Decrements both timers toward zero; call once per 60Hz frame
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Returns the FrameBuffer if the display should be redrawn and clears the draw flag
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Whether the host should be playing a tone
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// The register an FX0A instruction is waiting to fill, if the last cycle found no key pressed
    pub fn awaiting_key(&self) -> Option<u8> {
        self.state.awaiting_key
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
