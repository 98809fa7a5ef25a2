pub use chip8::Chip8;
pub use error::{Fault, LoadError};
pub use opcode::Instruction;
pub use state::{FrameBuffer, Keypad, State};

mod chip8;
pub mod constants;
mod error;
pub mod instruction;
mod opcode;
mod operations;
pub mod state;
