//! An instruction-level Zilog Z80 emulator core.  The CPU owns a flat
//! 64 KiB memory image; hosts load a program, seed registers if they want
//! to, and drive execution one instruction at a time with [`Z80::step`].

pub mod decode;
pub mod execute;
pub mod instructions;
pub mod memory;
pub mod state;

pub use self::decode::Z80Decoder;
pub use self::instructions::{Condition, IndexRegister, Instruction, LoadTarget, Register, RegisterPair, Target};
pub use self::memory::MemoryBlock;
pub use self::state::{Flags, Status, Z80, Z80Error, Z80State};
