//! Semantic handlers, one per mnemonic. Addressed handlers receive the
//! effective address resolved by the dispatch loop; PC already points past
//! the operand, so assigning PC here (branches, jumps) takes precedence over
//! the normal advance.
//!
//! Decimal mode is a known limitation: the D flag is storable state only and
//! ADC/SBC always perform binary arithmetic.

use crate::cpu::{Cpu, IRQ_VECTOR};
use crate::status::Status;

// Arithmetic

/// A + memory + carry-in. Carry-out on unsigned overflow past 255; the V
/// flag uses the classic two's-complement test on the truncated result.
pub(crate) fn adc(cpu: &mut Cpu, address: u16) {
    let operand = cpu.read(address);
    add_with_carry(cpu, operand);
}

/// A - memory - (1 - carry). Borrow mirrors the ADC carry convention, so
/// subtraction is addition of the operand's complement.
pub(crate) fn sbc(cpu: &mut Cpu, address: u16) {
    let operand = cpu.read(address);
    add_with_carry(cpu, !operand);
}

fn add_with_carry(cpu: &mut Cpu, operand: u8) {
    let carry_in = cpu.status.carry() as u16;
    let sum = cpu.a as u16 + operand as u16 + carry_in;
    let result = sum as u8;
    cpu.status.set_carry(sum > 0xFF);
    cpu.status
        .set_overflow((cpu.a ^ result) & (operand ^ result) & 0x80 != 0);
    cpu.a = result;
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn cmp(cpu: &mut Cpu, address: u16) {
    let register = cpu.a;
    compare(cpu, register, address);
}

pub(crate) fn cpx(cpu: &mut Cpu, address: u16) {
    let register = cpu.x;
    compare(cpu, register, address);
}

pub(crate) fn cpy(cpu: &mut Cpu, address: u16) {
    let register = cpu.y;
    compare(cpu, register, address);
}

/// Carry set when the register is >= the operand (no borrow); NZ on the
/// 8-bit difference.
fn compare(cpu: &mut Cpu, register: u8, address: u16) {
    let operand = cpu.read(address);
    cpu.status.set_carry(register >= operand);
    cpu.status.set_nz(register.wrapping_sub(operand));
}

// Logic

pub(crate) fn and(cpu: &mut Cpu, address: u16) {
    cpu.a &= cpu.read(address);
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn ora(cpu: &mut Cpu, address: u16) {
    cpu.a |= cpu.read(address);
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn eor(cpu: &mut Cpu, address: u16) {
    cpu.a ^= cpu.read(address);
    cpu.status.set_nz(cpu.a);
}

/// Does not modify A. N and V come straight from bits 7/6 of the operand;
/// Z reflects `A AND memory`.
pub(crate) fn bit(cpu: &mut Cpu, address: u16) {
    let operand = cpu.read(address);
    cpu.status.set_negative(operand & 0x80 != 0);
    cpu.status.set_overflow(operand & 0x40 != 0);
    cpu.status.set_zero(cpu.a & operand == 0);
}

// Shifts and rotates

fn shift_left(status: &mut Status, value: u8, carry_in: u8) -> u8 {
    status.set_carry(value & 0x80 != 0);
    let result = value << 1 | carry_in;
    status.set_nz(result);
    result
}

/// Right shifts always clear bit 7 unless the rotate carries one in, so LSR
/// forces Negative = 0 by construction.
fn shift_right(status: &mut Status, value: u8, carry_in: u8) -> u8 {
    status.set_carry(value & 0x01 != 0);
    let result = value >> 1 | carry_in << 7;
    status.set_nz(result);
    result
}

pub(crate) fn asl(cpu: &mut Cpu, address: u16) {
    let value = cpu.read(address);
    let result = shift_left(&mut cpu.status, value, 0);
    cpu.write(address, result);
}

pub(crate) fn asl_a(cpu: &mut Cpu) {
    cpu.a = shift_left(&mut cpu.status, cpu.a, 0);
}

pub(crate) fn lsr(cpu: &mut Cpu, address: u16) {
    let value = cpu.read(address);
    let result = shift_right(&mut cpu.status, value, 0);
    cpu.write(address, result);
}

pub(crate) fn lsr_a(cpu: &mut Cpu) {
    cpu.a = shift_right(&mut cpu.status, cpu.a, 0);
}

pub(crate) fn rol(cpu: &mut Cpu, address: u16) {
    let carry = cpu.status.carry() as u8;
    let value = cpu.read(address);
    let result = shift_left(&mut cpu.status, value, carry);
    cpu.write(address, result);
}

pub(crate) fn rol_a(cpu: &mut Cpu) {
    let carry = cpu.status.carry() as u8;
    cpu.a = shift_left(&mut cpu.status, cpu.a, carry);
}

pub(crate) fn ror(cpu: &mut Cpu, address: u16) {
    let carry = cpu.status.carry() as u8;
    let value = cpu.read(address);
    let result = shift_right(&mut cpu.status, value, carry);
    cpu.write(address, result);
}

pub(crate) fn ror_a(cpu: &mut Cpu) {
    let carry = cpu.status.carry() as u8;
    cpu.a = shift_right(&mut cpu.status, cpu.a, carry);
}

// Increment / decrement

pub(crate) fn inc(cpu: &mut Cpu, address: u16) {
    let result = cpu.read(address).wrapping_add(1);
    cpu.write(address, result);
    cpu.status.set_nz(result);
}

pub(crate) fn dec(cpu: &mut Cpu, address: u16) {
    let result = cpu.read(address).wrapping_sub(1);
    cpu.write(address, result);
    cpu.status.set_nz(result);
}

pub(crate) fn inx(cpu: &mut Cpu) {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.status.set_nz(cpu.x);
}

pub(crate) fn iny(cpu: &mut Cpu) {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.status.set_nz(cpu.y);
}

pub(crate) fn dex(cpu: &mut Cpu) {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.status.set_nz(cpu.x);
}

pub(crate) fn dey(cpu: &mut Cpu) {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.status.set_nz(cpu.y);
}

// Loads and stores

pub(crate) fn lda(cpu: &mut Cpu, address: u16) {
    cpu.a = cpu.read(address);
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn ldx(cpu: &mut Cpu, address: u16) {
    cpu.x = cpu.read(address);
    cpu.status.set_nz(cpu.x);
}

pub(crate) fn ldy(cpu: &mut Cpu, address: u16) {
    cpu.y = cpu.read(address);
    cpu.status.set_nz(cpu.y);
}

pub(crate) fn sta(cpu: &mut Cpu, address: u16) {
    cpu.write(address, cpu.a);
}

pub(crate) fn stx(cpu: &mut Cpu, address: u16) {
    cpu.write(address, cpu.x);
}

pub(crate) fn sty(cpu: &mut Cpu, address: u16) {
    cpu.write(address, cpu.y);
}

// Transfers

pub(crate) fn tax(cpu: &mut Cpu) {
    cpu.x = cpu.a;
    cpu.status.set_nz(cpu.x);
}

pub(crate) fn tay(cpu: &mut Cpu) {
    cpu.y = cpu.a;
    cpu.status.set_nz(cpu.y);
}

pub(crate) fn txa(cpu: &mut Cpu) {
    cpu.a = cpu.x;
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn tya(cpu: &mut Cpu) {
    cpu.a = cpu.y;
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn tsx(cpu: &mut Cpu) {
    cpu.x = cpu.sp;
    cpu.status.set_nz(cpu.x);
}

/// Transfer to the stack pointer does not affect flags.
pub(crate) fn txs(cpu: &mut Cpu) {
    cpu.sp = cpu.x;
}

// Branches. The resolved relative address is only installed when the tested
// flag condition holds; otherwise PC keeps its normal advance.

pub(crate) fn bcc(cpu: &mut Cpu, address: u16) {
    if !cpu.status.carry() {
        cpu.pc = address;
    }
}

pub(crate) fn bcs(cpu: &mut Cpu, address: u16) {
    if cpu.status.carry() {
        cpu.pc = address;
    }
}

pub(crate) fn beq(cpu: &mut Cpu, address: u16) {
    if cpu.status.zero() {
        cpu.pc = address;
    }
}

pub(crate) fn bne(cpu: &mut Cpu, address: u16) {
    if !cpu.status.zero() {
        cpu.pc = address;
    }
}

pub(crate) fn bmi(cpu: &mut Cpu, address: u16) {
    if cpu.status.negative() {
        cpu.pc = address;
    }
}

pub(crate) fn bpl(cpu: &mut Cpu, address: u16) {
    if !cpu.status.negative() {
        cpu.pc = address;
    }
}

pub(crate) fn bvc(cpu: &mut Cpu, address: u16) {
    if !cpu.status.overflow() {
        cpu.pc = address;
    }
}

pub(crate) fn bvs(cpu: &mut Cpu, address: u16) {
    if cpu.status.overflow() {
        cpu.pc = address;
    }
}

// Jumps, subroutine linkage, software interrupt

pub(crate) fn jmp(cpu: &mut Cpu, address: u16) {
    cpu.pc = address;
}

/// Push the address of the instruction after the operand, then jump. RTS
/// resumes at the pushed address directly.
pub(crate) fn jsr(cpu: &mut Cpu, address: u16) {
    cpu.push_word(cpu.pc);
    cpu.pc = address;
}

pub(crate) fn rts(cpu: &mut Cpu) {
    cpu.pc = cpu.pop_word();
}

/// Push the return address (opcode address + 2), then the packed status with
/// the break bit forced set, then load PC from the interrupt vector.
pub(crate) fn brk(cpu: &mut Cpu) {
    cpu.push_word(cpu.pc.wrapping_add(1));
    cpu.push(cpu.status.pushed());
    cpu.pc = cpu.read_word(IRQ_VECTOR);
}

/// Mirror of BRK: status first, then the return address.
pub(crate) fn rti(cpu: &mut Cpu) {
    let packed = cpu.pop();
    cpu.status = Status::from_pushed(packed);
    cpu.pc = cpu.pop_word();
}

// Stack

pub(crate) fn pha(cpu: &mut Cpu) {
    cpu.push(cpu.a);
}

pub(crate) fn pla(cpu: &mut Cpu) {
    cpu.a = cpu.pop();
    cpu.status.set_nz(cpu.a);
}

pub(crate) fn php(cpu: &mut Cpu) {
    cpu.push(cpu.status.pushed());
}

pub(crate) fn plp(cpu: &mut Cpu) {
    let packed = cpu.pop();
    cpu.status = Status::from_pushed(packed);
}

// Flag operations

pub(crate) fn sec(cpu: &mut Cpu) {
    cpu.status.set_carry(true);
}

pub(crate) fn clc(cpu: &mut Cpu) {
    cpu.status.set_carry(false);
}

pub(crate) fn sed(cpu: &mut Cpu) {
    cpu.status.set_decimal(true);
}

pub(crate) fn cld(cpu: &mut Cpu) {
    cpu.status.set_decimal(false);
}

pub(crate) fn sei(cpu: &mut Cpu) {
    cpu.status.set_interrupt_disable(true);
}

pub(crate) fn cli(cpu: &mut Cpu) {
    cpu.status.set_interrupt_disable(false);
}

pub(crate) fn clv(cpu: &mut Cpu) {
    cpu.status.set_overflow(false);
}

pub(crate) fn nop(_cpu: &mut Cpu) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu() -> Cpu {
        Cpu::new(0x0600)
    }

    #[test]
    fn adc_carry_and_overflow_for_all_operand_pairs() {
        for a in 0..=255u8 {
            for operand in 0..=255u8 {
                let mut cpu = cpu();
                cpu.a = a;
                cpu.write(0x10, operand);
                adc(&mut cpu, 0x10);

                let wide = a as u16 + operand as u16;
                assert_eq!(cpu.a, wide as u8);
                assert_eq!(cpu.status.carry(), wide > 0xFF, "carry for {a}+{operand}");
                let signed = a as i8 as i16 + operand as i8 as i16;
                assert_eq!(
                    cpu.status.overflow(),
                    !(-128..=127).contains(&signed),
                    "overflow for {a}+{operand}"
                );
                assert_eq!(cpu.status.zero(), wide as u8 == 0);
                assert_eq!(cpu.status.negative(), wide as u8 & 0x80 != 0);
            }
        }
    }

    #[test]
    fn adc_consumes_carry_in() {
        let mut cpu = cpu();
        cpu.a = 0x10;
        cpu.status.set_carry(true);
        cpu.write(0x10, 0x05);
        adc(&mut cpu, 0x10);
        assert_eq!(cpu.a, 0x16);
        assert!(!cpu.status.carry());
    }

    #[test]
    fn sbc_carry_acts_as_not_borrow() {
        // With carry set, plain subtraction.
        let mut cpu = cpu();
        cpu.a = 0x50;
        cpu.status.set_carry(true);
        cpu.write(0x10, 0x20);
        sbc(&mut cpu, 0x10);
        assert_eq!(cpu.a, 0x30);
        assert!(cpu.status.carry(), "no borrow occurred");

        // Clear carry borrows one.
        let mut cpu = self::cpu();
        cpu.a = 0x50;
        cpu.write(0x10, 0x20);
        sbc(&mut cpu, 0x10);
        assert_eq!(cpu.a, 0x2F);

        // Underflow clears carry.
        let mut cpu = self::cpu();
        cpu.a = 0x10;
        cpu.status.set_carry(true);
        cpu.write(0x10, 0x20);
        sbc(&mut cpu, 0x10);
        assert_eq!(cpu.a, 0xF0);
        assert!(!cpu.status.carry(), "borrow occurred");
    }

    #[test]
    fn compare_sets_carry_zero_negative() {
        let cases = [
            // (register, operand, carry, zero, negative)
            (0x40u8, 0x20u8, true, false, false),
            (0x20, 0x20, true, true, false),
            (0x10, 0x20, false, false, true),
        ];
        for (register, operand, carry, zero, negative) in cases {
            let mut cpu = cpu();
            cpu.a = register;
            cpu.write(0x10, operand);
            cmp(&mut cpu, 0x10);
            assert_eq!(cpu.status.carry(), carry);
            assert_eq!(cpu.status.zero(), zero);
            assert_eq!(cpu.status.negative(), negative);
        }
    }

    #[test]
    fn asl_shifts_bit7_into_carry() {
        let mut cpu = cpu();
        cpu.a = 0b1100_0000;
        asl_a(&mut cpu);
        assert_eq!(cpu.a, 0b1000_0000);
        assert!(cpu.status.carry());
        assert!(cpu.status.negative());
    }

    #[test]
    fn lsr_forces_negative_clear() {
        let mut cpu = cpu();
        cpu.a = 0b0000_0011;
        cpu.status.set_negative(true);
        lsr_a(&mut cpu);
        assert_eq!(cpu.a, 0b0000_0001);
        assert!(cpu.status.carry());
        assert!(!cpu.status.negative());
    }

    #[test]
    fn rol_and_ror_move_carry_through_the_vacated_bit() {
        let mut cpu = cpu();
        cpu.status.set_carry(true);
        cpu.a = 0b0000_0001;
        rol_a(&mut cpu);
        assert_eq!(cpu.a, 0b0000_0011);
        assert!(!cpu.status.carry());

        let mut cpu = self::cpu();
        cpu.status.set_carry(true);
        cpu.a = 0b0000_0010;
        ror_a(&mut cpu);
        assert_eq!(cpu.a, 0b1000_0001);
        assert!(!cpu.status.carry());
        assert!(cpu.status.negative());
    }

    #[test]
    fn rotate_memory_form_writes_back() {
        let mut cpu = cpu();
        cpu.write(0x10, 0b1000_0000);
        rol(&mut cpu, 0x10);
        assert_eq!(cpu.read(0x10), 0);
        assert!(cpu.status.carry());
        assert!(cpu.status.zero());
    }

    #[test]
    fn bit_copies_operand_bits_and_tests_the_mask() {
        let mut cpu = cpu();
        cpu.a = 0x01;
        cpu.write(0x10, 0b1100_0000);
        bit(&mut cpu, 0x10);
        assert!(cpu.status.negative());
        assert!(cpu.status.overflow());
        assert!(cpu.status.zero(), "A AND memory == 0");
        assert_eq!(cpu.a, 0x01, "A is untouched");
    }

    #[test]
    fn increments_and_decrements_wrap() {
        let mut cpu = cpu();
        cpu.write(0x10, 0xFF);
        inc(&mut cpu, 0x10);
        assert_eq!(cpu.read(0x10), 0);
        assert!(cpu.status.zero());

        dec(&mut cpu, 0x10);
        assert_eq!(cpu.read(0x10), 0xFF);
        assert!(cpu.status.negative());

        cpu.y = 0xFF;
        iny(&mut cpu);
        assert_eq!(cpu.y, 0);
        assert!(cpu.status.zero());
    }

    #[test]
    fn transfers_update_nz_except_txs() {
        let mut cpu = cpu();
        cpu.a = 0x80;
        tax(&mut cpu);
        assert_eq!(cpu.x, 0x80);
        assert!(cpu.status.negative());

        let mut cpu = self::cpu();
        cpu.x = 0x00;
        cpu.status.set_zero(false);
        txs(&mut cpu);
        assert_eq!(cpu.sp, 0x00);
        assert!(!cpu.status.zero(), "TXS must not touch flags");
    }

    #[test]
    fn pla_updates_nz() {
        let mut cpu = cpu();
        cpu.push(0x80);
        pla(&mut cpu);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.status.negative());
    }

    #[test]
    fn php_plp_round_trip() {
        let mut cpu = cpu();
        cpu.status.set_carry(true);
        cpu.status.set_negative(true);
        php(&mut cpu);

        let mut other = cpu.status;
        other.set_carry(false);
        cpu.status = other;
        plp(&mut cpu);
        assert!(cpu.status.carry());
        assert!(cpu.status.negative());
    }

    #[test]
    fn flag_ops_touch_exactly_one_flag() {
        let mut cpu = cpu();
        sec(&mut cpu);
        assert_eq!(cpu.status.packed(), 0b0000_0001);
        sed(&mut cpu);
        assert_eq!(cpu.status.packed(), 0b0000_1001);
        sei(&mut cpu);
        assert_eq!(cpu.status.packed(), 0b0000_1101);
        clc(&mut cpu);
        assert_eq!(cpu.status.packed(), 0b0000_1100);
        cld(&mut cpu);
        cli(&mut cpu);
        assert_eq!(cpu.status.packed(), 0);
    }
}
