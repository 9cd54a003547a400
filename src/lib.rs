// Assembling
mod asm;
pub use asm::{assemble, Program};
mod isa;
pub use isa::{decode, variants_for, AddrMode, Mnemonic};

// Running
mod cpu;
pub use cpu::{Cpu, Fault, Snapshot, MEMORY_MAX};
mod addr;
mod exec;
mod status;
pub use status::Status;

mod error;
pub mod output;

/// Conventional load address for small standalone programs.
pub const DEFAULT_LOAD_ADDR: u16 = 0x0600;

/// Conventional `run` sentinel: the BRK encoding.
pub const STOP_OPCODE: u8 = 0x00;
