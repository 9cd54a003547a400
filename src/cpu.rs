use std::fmt;

use crate::addr;
use crate::exec;
use crate::isa::{AddrMode, Mnemonic, TABLE};
use crate::status::Status;

/// The 6502 can address 64KiB of memory.
pub const MEMORY_MAX: usize = 0x10000;

/// The stack lives in page one, addressed as 0x0100 + SP.
pub(crate) const STACK_PAGE: u16 = 0x0100;

/// Little-endian vector loaded into PC by the software interrupt.
pub(crate) const IRQ_VECTOR: u16 = 0xFFFE;

/// Complete machine state plus the opcode dispatch table. One instance per
/// run; nothing is shared between instances.
pub struct Cpu {
    pub(crate) mem: Box<[u8; MEMORY_MAX]>,
    pub(crate) pc: u16,
    pub(crate) sp: u8,
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) status: Status,
    dispatch: Box<[Slot; 256]>,
}

/// One dispatch-table entry. The explicit `Illegal` marker makes fetching an
/// unregistered opcode an observable fault instead of undefined behaviour.
#[derive(Clone, Copy)]
enum Slot {
    Illegal,
    Implied(fn(&mut Cpu)),
    Addressed(fn(&mut Cpu, u16), AddrMode),
}

/// Unrecoverable execution faults. There is no retry path; every fault is
/// immediate and deterministic for the same inputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Fault {
    /// Fetched an opcode byte with no registered instruction.
    IllegalOpcode { opcode: u8, addr: u16 },
    /// `run_bounded` executed its full budget without reaching the sentinel.
    InstructionLimit { limit: u64 },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::IllegalOpcode { opcode, addr } => {
                write!(f, "illegal opcode {opcode:#04x} at {addr:#06x}")
            }
            Fault::InstructionLimit { limit } => {
                write!(f, "program did not halt within {limit} instructions")
            }
        }
    }
}

impl std::error::Error for Fault {}

/// Read-only view of the register and flag state, for inspection and for
/// the embedding layer to format.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub negative: bool,
    pub overflow: bool,
    pub decimal: bool,
    pub interrupt_disable: bool,
    pub zero: bool,
    pub carry: bool,
}

impl Cpu {
    /// Fresh machine with zeroed memory and registers, PC at `load_addr`.
    pub fn new(load_addr: u16) -> Self {
        Cpu {
            mem: Box::new([0; MEMORY_MAX]),
            pc: load_addr,
            sp: 0xFF,
            a: 0,
            x: 0,
            y: 0,
            status: Status::new(),
            dispatch: build_dispatch(),
        }
    }

    /// Copy a byte sequence into memory starting at `at`, truncating at the
    /// 64KiB ceiling. Sizing programs to fit is the caller's responsibility.
    pub fn load(&mut self, bytes: &[u8], at: u16) {
        let start = at as usize;
        let len = bytes.len().min(MEMORY_MAX - start);
        self.mem[start..start + len].copy_from_slice(&bytes[..len]);
    }

    /// Fetch, decode, and execute a single instruction.
    pub fn tick(&mut self) -> Result<(), Fault> {
        let at = self.pc;
        let opcode = self.read(at);
        self.pc = self.pc.wrapping_add(1);

        match self.dispatch[opcode as usize] {
            Slot::Illegal => Err(Fault::IllegalOpcode { opcode, addr: at }),
            Slot::Implied(handler) => {
                handler(self);
                Ok(())
            }
            Slot::Addressed(handler, mode) => {
                // Resolve against PC at the operand, then advance past it
                // before the handler runs so an executor that assigns PC
                // (branch taken, JMP, JSR) takes precedence.
                let address = addr::resolve(self, mode);
                self.pc = self.pc.wrapping_add(mode.operand_len());
                handler(self, address);
                Ok(())
            }
        }
    }

    /// Tick until the byte at PC equals the sentinel opcode. The sentinel is
    /// an emulator convenience (commonly 0x00, the BRK encoding), not a
    /// hardware feature; a program that never reaches it runs forever.
    pub fn run(&mut self, stop_opcode: u8) -> Result<(), Fault> {
        while self.read(self.pc) != stop_opcode {
            self.tick()?;
        }
        Ok(())
    }

    /// Like [`Cpu::run`] but bounded, for embedders that cannot trust the
    /// program to halt. Returns the number of instructions executed.
    pub fn run_bounded(&mut self, stop_opcode: u8, limit: u64) -> Result<u64, Fault> {
        let mut executed = 0;
        while self.read(self.pc) != stop_opcode {
            if executed == limit {
                return Err(Fault::InstructionLimit { limit });
            }
            self.tick()?;
            executed += 1;
        }
        Ok(executed)
    }

    pub fn state(&self) -> Snapshot {
        Snapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            negative: self.status.negative(),
            overflow: self.status.overflow(),
            decimal: self.status.decimal(),
            interrupt_disable: self.status.interrupt_disable(),
            zero: self.status.zero(),
            carry: self.status.carry(),
        }
    }

    /// Inspect a single memory cell.
    pub fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }

    /// Little-endian 16-bit read; the high byte wraps around the address
    /// space rather than failing.
    pub(crate) fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        hi << 8 | lo
    }

    /// Write at 0x0100+SP, then decrement. SP wraps at the page boundary
    /// with no overflow detection, matching the hardware.
    pub(crate) fn push(&mut self, value: u8) {
        self.write(STACK_PAGE + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Increment, then read at 0x0100+SP. Exact mirror of [`Cpu::push`].
    pub(crate) fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(STACK_PAGE + self.sp as u16)
    }

    /// 16-bit push: high byte first, so the low byte sits in the
    /// most-recently-pushed slot.
    pub(crate) fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push((value & 0xFF) as u8);
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        hi << 8 | lo
    }
}

/// One-time build step per instance: bind every opcode the instruction table
/// declares to its executor and resolver. Slots the table never mentions stay
/// `Illegal`.
fn build_dispatch() -> Box<[Slot; 256]> {
    let mut dispatch = Box::new([Slot::Illegal; 256]);
    for (mnemonic, variants) in TABLE {
        for (mode, opcode) in *variants {
            dispatch[*opcode as usize] = slot_for(*mnemonic, *mode);
        }
    }
    dispatch
}

fn slot_for(mnemonic: Mnemonic, mode: AddrMode) -> Slot {
    use Mnemonic::*;
    match mode {
        AddrMode::Implied | AddrMode::Accumulator => {
            let handler: fn(&mut Cpu) = match mnemonic {
                Asl => exec::asl_a,
                Lsr => exec::lsr_a,
                Rol => exec::rol_a,
                Ror => exec::ror_a,
                Brk => exec::brk,
                Clc => exec::clc,
                Cld => exec::cld,
                Cli => exec::cli,
                Clv => exec::clv,
                Dex => exec::dex,
                Dey => exec::dey,
                Inx => exec::inx,
                Iny => exec::iny,
                Nop => exec::nop,
                Pha => exec::pha,
                Php => exec::php,
                Pla => exec::pla,
                Plp => exec::plp,
                Rti => exec::rti,
                Rts => exec::rts,
                Sec => exec::sec,
                Sed => exec::sed,
                Sei => exec::sei,
                Tax => exec::tax,
                Tay => exec::tay,
                Tsx => exec::tsx,
                Txa => exec::txa,
                Txs => exec::txs,
                Tya => exec::tya,
                _ => unreachable!("{mnemonic} declares no operand-less variant"),
            };
            Slot::Implied(handler)
        }
        _ => {
            let handler: fn(&mut Cpu, u16) = match mnemonic {
                Adc => exec::adc,
                And => exec::and,
                Asl => exec::asl,
                Bcc => exec::bcc,
                Bcs => exec::bcs,
                Beq => exec::beq,
                Bit => exec::bit,
                Bmi => exec::bmi,
                Bne => exec::bne,
                Bpl => exec::bpl,
                Bvc => exec::bvc,
                Bvs => exec::bvs,
                Cmp => exec::cmp,
                Cpx => exec::cpx,
                Cpy => exec::cpy,
                Dec => exec::dec,
                Eor => exec::eor,
                Inc => exec::inc,
                Jmp => exec::jmp,
                Jsr => exec::jsr,
                Lda => exec::lda,
                Ldx => exec::ldx,
                Ldy => exec::ldy,
                Lsr => exec::lsr,
                Ora => exec::ora,
                Rol => exec::rol,
                Ror => exec::ror,
                Sbc => exec::sbc,
                Sta => exec::sta,
                Stx => exec::stx,
                Sty => exec::sty,
                _ => unreachable!("{mnemonic} declares no addressed variant"),
            };
            Slot::Addressed(handler, mode)
        }
    }
}
