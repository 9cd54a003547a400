use crate::cpu::Cpu;
use crate::isa::AddrMode;

use AddrMode::*;

/// Compute the effective address for an addressing mode, with PC pointing at
/// the first operand byte. Index arithmetic wraps to 8 bits inside the zero
/// page and to 16 bits everywhere else. The operand byte-length consumed is
/// [`AddrMode::operand_len`].
pub(crate) fn resolve(cpu: &Cpu, mode: AddrMode) -> u16 {
    match mode {
        // No operand address exists for these; the executor owns the target.
        AddrMode::Accumulator | AddrMode::Implied => {
            unreachable!("operand-less modes are dispatched without a resolver")
        }

        Absolute => cpu.read_word(cpu.pc),
        AbsoluteX => cpu.read_word(cpu.pc).wrapping_add(cpu.x as u16),
        AbsoluteY => cpu.read_word(cpu.pc).wrapping_add(cpu.y as u16),

        ZeroPage => cpu.read(cpu.pc) as u16,
        ZeroPageX => cpu.read(cpu.pc).wrapping_add(cpu.x) as u16,
        ZeroPageY => cpu.read(cpu.pc).wrapping_add(cpu.y) as u16,

        // The operand value lives inline; the address is PC itself.
        Immediate => cpu.pc,

        // Signed offset from the operand byte's own address. Only branch
        // executors use this, gating whether the jump is taken.
        Relative => {
            let offset = cpu.read(cpu.pc) as i8;
            cpu.pc.wrapping_add(offset as u16)
        }

        // Two-level indirection. The hardware's page-boundary defect is
        // intentionally not modelled.
        Indirect => {
            let pointer = cpu.read_word(cpu.pc);
            cpu.read_word(pointer)
        }

        IndexedIndirect => {
            let zp = cpu.read(cpu.pc).wrapping_add(cpu.x);
            cpu.read_word(zp as u16)
        }

        IndirectIndexed => {
            let zp = cpu.read(cpu.pc);
            cpu.read_word(zp as u16).wrapping_add(cpu.y as u16)
        }
    }
}
