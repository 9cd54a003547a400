/// Processor status flags, kept in the packed hardware layout `N V - B D I Z C`
/// with named accessors on top. PHP/PLP/BRK/RTI move the packed byte to and
/// from the stack; everything else reads and writes single flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Status(u8);

const NEGATIVE: u8 = 1 << 7;
const OVERFLOW: u8 = 1 << 6;
const UNUSED: u8 = 1 << 5;
const BREAK: u8 = 1 << 4;
const DECIMAL: u8 = 1 << 3;
const INTERRUPT: u8 = 1 << 2;
const ZERO: u8 = 1 << 1;
const CARRY: u8 = 1 << 0;

impl Status {
    pub fn new() -> Self {
        Status(0)
    }

    fn get(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    fn assign(&mut self, mask: u8, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub fn negative(self) -> bool {
        self.get(NEGATIVE)
    }
    pub fn overflow(self) -> bool {
        self.get(OVERFLOW)
    }
    pub fn decimal(self) -> bool {
        self.get(DECIMAL)
    }
    pub fn interrupt_disable(self) -> bool {
        self.get(INTERRUPT)
    }
    pub fn zero(self) -> bool {
        self.get(ZERO)
    }
    pub fn carry(self) -> bool {
        self.get(CARRY)
    }

    pub fn set_negative(&mut self, on: bool) {
        self.assign(NEGATIVE, on);
    }
    pub fn set_overflow(&mut self, on: bool) {
        self.assign(OVERFLOW, on);
    }
    pub fn set_decimal(&mut self, on: bool) {
        self.assign(DECIMAL, on);
    }
    pub fn set_interrupt_disable(&mut self, on: bool) {
        self.assign(INTERRUPT, on);
    }
    pub fn set_zero(&mut self, on: bool) {
        self.assign(ZERO, on);
    }
    pub fn set_carry(&mut self, on: bool) {
        self.assign(CARRY, on);
    }

    /// Negative = bit 7 of the result, Zero = result is 0. Recomputed by
    /// every load/transfer/arithmetic/logic/shift on its primary result.
    pub fn set_nz(&mut self, value: u8) {
        self.set_negative(value & 0x80 != 0);
        self.set_zero(value == 0);
    }

    /// Packed form as pushed by PHP and BRK: bits 5 and 4 read as set.
    pub fn pushed(self) -> u8 {
        self.0 | UNUSED | BREAK
    }

    /// Rebuild from a byte popped by PLP or RTI. Bits 5 and 4 only exist on
    /// the stack and are dropped from the canonical form.
    pub fn from_pushed(byte: u8) -> Self {
        Status(byte & !(UNUSED | BREAK))
    }

    /// Packed form without the stack-only bits, for display.
    pub fn packed(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut status = Status::new();
        status.set_carry(true);
        status.set_negative(true);
        assert!(status.carry());
        assert!(status.negative());
        assert!(!status.zero());
        assert!(!status.overflow());

        status.set_carry(false);
        assert!(!status.carry());
        assert!(status.negative());
    }

    #[test]
    fn pushed_forces_bits_5_and_4() {
        let mut status = Status::new();
        status.set_zero(true);
        status.set_carry(true);
        assert_eq!(status.pushed(), 0b0011_0011);
    }

    #[test]
    fn push_pop_round_trips_the_six_flags() {
        let mut status = Status::new();
        status.set_negative(true);
        status.set_overflow(true);
        status.set_decimal(true);
        status.set_interrupt_disable(true);
        status.set_zero(true);
        status.set_carry(true);
        assert_eq!(Status::from_pushed(status.pushed()), status);
    }

    #[test]
    fn nz_update() {
        let mut status = Status::new();
        status.set_nz(0x84);
        assert!(status.negative());
        assert!(!status.zero());
        status.set_nz(0);
        assert!(!status.negative());
        assert!(status.zero());
        status.set_nz(0x7F);
        assert!(!status.negative());
        assert!(!status.zero());
    }
}
