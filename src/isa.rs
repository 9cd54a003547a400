use std::fmt;
use std::str::FromStr;

/// The rule for deriving an operand's effective address from the bytes
/// following an opcode and the current registers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddrMode {
    Accumulator,
    Implied,
    Immediate,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
}

impl AddrMode {
    /// Canonical operand syntax, for diagnostics.
    pub fn syntax(self) -> &'static str {
        match self {
            AddrMode::Accumulator => "A",
            AddrMode::Implied => "(no operand)",
            AddrMode::Immediate => "#$hh",
            AddrMode::Relative => "a signed decimal offset",
            AddrMode::ZeroPage => "$hh",
            AddrMode::ZeroPageX => "$hh,X",
            AddrMode::ZeroPageY => "$hh,Y",
            AddrMode::Absolute => "$hhhh",
            AddrMode::AbsoluteX => "$hhhh,X",
            AddrMode::AbsoluteY => "$hhhh,Y",
            AddrMode::Indirect => "($hhhh)",
            AddrMode::IndexedIndirect => "($hh,X)",
            AddrMode::IndirectIndexed => "($hh),Y",
        }
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            AddrMode::Accumulator | AddrMode::Implied => 0,
            AddrMode::Immediate
            | AddrMode::Relative
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::IndexedIndirect
            | AddrMode::IndirectIndexed => 1,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => {
                2
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Mnemonic {
    pub fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Pla => "PLA",
            Plp => "PLP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sta => "STA",
            Stx => "STX",
            Sty => "STY",
            Tax => "TAX",
            Tay => "TAY",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
        }
    }

    /// Supported addressing-mode variants in declaration order. The order is
    /// the disambiguation rule the assembler relies on, not a convenience.
    pub fn variants(self) -> &'static [(AddrMode, u8)] {
        TABLE
            .iter()
            .find(|(mnemonic, _)| *mnemonic == self)
            .map(|(_, variants)| *variants)
            .unwrap_or_else(|| unreachable!("every mnemonic has a table entry"))
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Mnemonic::*;
        // Mnemonics are case-insensitive
        let upper = s.to_ascii_uppercase();
        let mnemonic = match upper.as_str() {
            "ADC" => Adc,
            "AND" => And,
            "ASL" => Asl,
            "BCC" => Bcc,
            "BCS" => Bcs,
            "BEQ" => Beq,
            "BIT" => Bit,
            "BMI" => Bmi,
            "BNE" => Bne,
            "BPL" => Bpl,
            "BRK" => Brk,
            "BVC" => Bvc,
            "BVS" => Bvs,
            "CLC" => Clc,
            "CLD" => Cld,
            "CLI" => Cli,
            "CLV" => Clv,
            "CMP" => Cmp,
            "CPX" => Cpx,
            "CPY" => Cpy,
            "DEC" => Dec,
            "DEX" => Dex,
            "DEY" => Dey,
            "EOR" => Eor,
            "INC" => Inc,
            "INX" => Inx,
            "INY" => Iny,
            "JMP" => Jmp,
            "JSR" => Jsr,
            "LDA" => Lda,
            "LDX" => Ldx,
            "LDY" => Ldy,
            "LSR" => Lsr,
            "NOP" => Nop,
            "ORA" => Ora,
            "PHA" => Pha,
            "PHP" => Php,
            "PLA" => Pla,
            "PLP" => Plp,
            "ROL" => Rol,
            "ROR" => Ror,
            "RTI" => Rti,
            "RTS" => Rts,
            "SBC" => Sbc,
            "SEC" => Sec,
            "SED" => Sed,
            "SEI" => Sei,
            "STA" => Sta,
            "STX" => Stx,
            "STY" => Sty,
            "TAX" => Tax,
            "TAY" => Tay,
            "TSX" => Tsx,
            "TXA" => Txa,
            "TXS" => Txs,
            "TYA" => Tya,
            _ => return Err(()),
        };
        Ok(mnemonic)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use AddrMode::*;
use Mnemonic::*;

/// The documented MOS 6502 opcode assignment, shared verbatim by the
/// assembler (mnemonic + mode -> byte) and by CPU dispatch construction
/// (byte -> handler + resolver). Built once, never mutated.
#[rustfmt::skip]
pub const TABLE: &[(Mnemonic, &[(AddrMode, u8)])] = &[
    (Adc, &[
        (Immediate, 0x69), (ZeroPage, 0x65), (ZeroPageX, 0x75), (Absolute, 0x6D),
        (AbsoluteX, 0x7D), (AbsoluteY, 0x79), (IndexedIndirect, 0x61), (IndirectIndexed, 0x71),
    ]),
    (And, &[
        (Immediate, 0x29), (ZeroPage, 0x25), (ZeroPageX, 0x35), (Absolute, 0x2D),
        (AbsoluteX, 0x3D), (AbsoluteY, 0x39), (IndexedIndirect, 0x21), (IndirectIndexed, 0x31),
    ]),
    (Asl, &[
        (Accumulator, 0x0A), (ZeroPage, 0x06), (ZeroPageX, 0x16),
        (Absolute, 0x0E), (AbsoluteX, 0x1E),
    ]),
    (Bcc, &[(Relative, 0x90)]),
    (Bcs, &[(Relative, 0xB0)]),
    (Beq, &[(Relative, 0xF0)]),
    (Bit, &[(ZeroPage, 0x24), (Absolute, 0x2C)]),
    (Bmi, &[(Relative, 0x30)]),
    (Bne, &[(Relative, 0xD0)]),
    (Bpl, &[(Relative, 0x10)]),
    (Brk, &[(Implied, 0x00)]),
    (Bvc, &[(Relative, 0x50)]),
    (Bvs, &[(Relative, 0x70)]),
    (Clc, &[(Implied, 0x18)]),
    (Cld, &[(Implied, 0xD8)]),
    (Cli, &[(Implied, 0x58)]),
    (Clv, &[(Implied, 0xB8)]),
    (Cmp, &[
        (Immediate, 0xC9), (ZeroPage, 0xC5), (ZeroPageX, 0xD5), (Absolute, 0xCD),
        (AbsoluteX, 0xDD), (AbsoluteY, 0xD9), (IndexedIndirect, 0xC1), (IndirectIndexed, 0xD1),
    ]),
    (Cpx, &[(Immediate, 0xE0), (ZeroPage, 0xE4), (Absolute, 0xEC)]),
    (Cpy, &[(Immediate, 0xC0), (ZeroPage, 0xC4), (Absolute, 0xCC)]),
    (Dec, &[
        (ZeroPage, 0xC6), (ZeroPageX, 0xD6), (Absolute, 0xCE), (AbsoluteX, 0xDE),
    ]),
    (Dex, &[(Implied, 0xCA)]),
    (Dey, &[(Implied, 0x88)]),
    (Eor, &[
        (Immediate, 0x49), (ZeroPage, 0x45), (ZeroPageX, 0x55), (Absolute, 0x4D),
        (AbsoluteX, 0x5D), (AbsoluteY, 0x59), (IndexedIndirect, 0x41), (IndirectIndexed, 0x51),
    ]),
    (Inc, &[
        (ZeroPage, 0xE6), (ZeroPageX, 0xF6), (Absolute, 0xEE), (AbsoluteX, 0xFE),
    ]),
    (Inx, &[(Implied, 0xE8)]),
    (Iny, &[(Implied, 0xC8)]),
    (Jmp, &[(Absolute, 0x4C), (Indirect, 0x6C)]),
    (Jsr, &[(Absolute, 0x20)]),
    (Lda, &[
        (Immediate, 0xA9), (ZeroPage, 0xA5), (ZeroPageX, 0xB5), (Absolute, 0xAD),
        (AbsoluteX, 0xBD), (AbsoluteY, 0xB9), (IndexedIndirect, 0xA1), (IndirectIndexed, 0xB1),
    ]),
    (Ldx, &[
        (Immediate, 0xA2), (ZeroPage, 0xA6), (ZeroPageY, 0xB6),
        (Absolute, 0xAE), (AbsoluteY, 0xBE),
    ]),
    (Ldy, &[
        (Immediate, 0xA0), (ZeroPage, 0xA4), (ZeroPageX, 0xB4),
        (Absolute, 0xAC), (AbsoluteX, 0xBC),
    ]),
    (Lsr, &[
        (Accumulator, 0x4A), (ZeroPage, 0x46), (ZeroPageX, 0x56),
        (Absolute, 0x4E), (AbsoluteX, 0x5E),
    ]),
    (Nop, &[(Implied, 0xEA)]),
    (Ora, &[
        (Immediate, 0x09), (ZeroPage, 0x05), (ZeroPageX, 0x15), (Absolute, 0x0D),
        (AbsoluteX, 0x1D), (AbsoluteY, 0x19), (IndexedIndirect, 0x01), (IndirectIndexed, 0x11),
    ]),
    (Pha, &[(Implied, 0x48)]),
    (Php, &[(Implied, 0x08)]),
    (Pla, &[(Implied, 0x68)]),
    (Plp, &[(Implied, 0x28)]),
    (Rol, &[
        (Accumulator, 0x2A), (ZeroPage, 0x26), (ZeroPageX, 0x36),
        (Absolute, 0x2E), (AbsoluteX, 0x3E),
    ]),
    (Ror, &[
        (Accumulator, 0x6A), (ZeroPage, 0x66), (ZeroPageX, 0x76),
        (Absolute, 0x6E), (AbsoluteX, 0x7E),
    ]),
    (Rti, &[(Implied, 0x40)]),
    (Rts, &[(Implied, 0x60)]),
    (Sbc, &[
        (Immediate, 0xE9), (ZeroPage, 0xE5), (ZeroPageX, 0xF5), (Absolute, 0xED),
        (AbsoluteX, 0xFD), (AbsoluteY, 0xF9), (IndexedIndirect, 0xE1), (IndirectIndexed, 0xF1),
    ]),
    (Sec, &[(Implied, 0x38)]),
    (Sed, &[(Implied, 0xF8)]),
    (Sei, &[(Implied, 0x78)]),
    (Sta, &[
        (ZeroPage, 0x85), (ZeroPageX, 0x95), (Absolute, 0x8D), (AbsoluteX, 0x9D),
        (AbsoluteY, 0x99), (IndexedIndirect, 0x81), (IndirectIndexed, 0x91),
    ]),
    (Stx, &[(ZeroPage, 0x86), (ZeroPageY, 0x96), (Absolute, 0x8E)]),
    (Sty, &[(ZeroPage, 0x84), (ZeroPageX, 0x94), (Absolute, 0x8C)]),
    (Tax, &[(Implied, 0xAA)]),
    (Tay, &[(Implied, 0xA8)]),
    (Tsx, &[(Implied, 0xBA)]),
    (Txa, &[(Implied, 0x8A)]),
    (Txs, &[(Implied, 0x9A)]),
    (Tya, &[(Implied, 0x98)]),
];

/// Look up the addressing-mode variants for a textual mnemonic.
/// Case-insensitive; `None` when the mnemonic is unknown.
pub fn variants_for(text: &str) -> Option<(Mnemonic, &'static [(AddrMode, u8)])> {
    let mnemonic: Mnemonic = text.parse().ok()?;
    Some((mnemonic, mnemonic.variants()))
}

/// Inverse of the table: recover the mnemonic and addressing mode an opcode
/// byte encodes. `None` for bytes with no documented instruction.
pub fn decode(opcode: u8) -> Option<(Mnemonic, AddrMode)> {
    for (mnemonic, variants) in TABLE {
        for (mode, byte) in *variants {
            if *byte == opcode {
                return Some((*mnemonic, *mode));
            }
        }
    }
    None
}
