use miette::Result;

use crate::error;
use crate::isa::{variants_for, AddrMode};

/// Machine code grouped per source line: zero bytes for a blank or
/// comment-only line, otherwise an opcode plus 0-2 operand bytes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Program {
    lines: Vec<Vec<u8>>,
}

impl Program {
    /// Per-line byte groups, for diagnostic display.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }

    /// One contiguous byte sequence, ready to load into memory.
    pub fn flatten(&self) -> Vec<u8> {
        self.lines.concat()
    }
}

/// Assemble a complete source text, one instruction per line:
/// `MNEMONIC [OPERAND] [; comment]`. All-or-nothing: the first malformed
/// line aborts the pass with a diagnostic naming it.
pub fn assemble(source: &str) -> Result<Program> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split('\n') {
        lines.push(assemble_line(raw, offset, source)?);
        offset += raw.len() + 1;
    }
    Ok(Program { lines })
}

fn assemble_line(raw: &str, offset: usize, source: &str) -> Result<Vec<u8>> {
    // Everything from the first `;` is commentary.
    let code = raw.split(';').next().unwrap_or("");
    let stmt = code.trim();
    if stmt.is_empty() {
        return Ok(Vec::new());
    }
    let stmt_offs = offset + (code.len() - code.trim_start().len());

    let mut parts = stmt.splitn(2, char::is_whitespace);
    let mnemonic_text = parts.next().unwrap_or_else(|| unreachable!("stmt is non-empty"));
    let operand = parts.next().map(str::trim).filter(|op| !op.is_empty());

    let Some((mnemonic, variants)) = variants_for(mnemonic_text) else {
        return Err(error::asm_unknown_mnemonic(
            stmt_offs,
            mnemonic_text.len(),
            stmt,
            source,
        ));
    };

    // First match in declaration order wins; the order is the
    // disambiguation rule for grammars that overlap.
    for (mode, opcode) in variants {
        if let Some(operand_bytes) = match_operand(*mode, operand) {
            let mut bytes = vec![*opcode];
            bytes.extend_from_slice(&operand_bytes);
            return Ok(bytes);
        }
    }

    Err(error::asm_no_matching_mode(
        stmt_offs,
        stmt.len(),
        stmt,
        mnemonic,
        variants,
        source,
    ))
}

/// Test one addressing-mode grammar against the operand text and extract the
/// encoded operand bytes (little-endian for 16-bit values) on a match.
fn match_operand(mode: AddrMode, operand: Option<&str>) -> Option<Vec<u8>> {
    let bytes = match mode {
        AddrMode::Implied => match operand {
            None => Vec::new(),
            Some(_) => return None,
        },
        AddrMode::Accumulator => match operand {
            Some("A") => Vec::new(),
            _ => return None,
        },
        AddrMode::Immediate => {
            let digits = operand?.strip_prefix("#$")?;
            if digits.is_empty() || digits.len() > 2 {
                return None;
            }
            vec![hex(digits)? as u8]
        }
        AddrMode::Relative => {
            let value: i32 = operand?.parse().ok()?;
            if !(-128..=127).contains(&value) {
                return None;
            }
            // Two's complement: negatives are stored as value + 256.
            vec![value as i8 as u8]
        }
        AddrMode::ZeroPage => vec![hex_byte(operand?.strip_prefix('$')?)?],
        AddrMode::ZeroPageX => {
            vec![hex_byte(operand?.strip_prefix('$')?.strip_suffix(",X")?)?]
        }
        AddrMode::ZeroPageY => {
            vec![hex_byte(operand?.strip_prefix('$')?.strip_suffix(",Y")?)?]
        }
        AddrMode::Absolute => hex_word(operand?.strip_prefix('$')?)?,
        AddrMode::AbsoluteX => hex_word(operand?.strip_prefix('$')?.strip_suffix(",X")?)?,
        AddrMode::AbsoluteY => hex_word(operand?.strip_prefix('$')?.strip_suffix(",Y")?)?,
        AddrMode::Indirect => {
            hex_word(operand?.strip_prefix("($")?.strip_suffix(')')?)?
        }
        AddrMode::IndexedIndirect => {
            vec![hex_byte(operand?.strip_prefix("($")?.strip_suffix(",X)")?)?]
        }
        AddrMode::IndirectIndexed => {
            vec![hex_byte(operand?.strip_prefix("($")?.strip_suffix("),Y")?)?]
        }
    };
    Some(bytes)
}

/// Hex digits are case-insensitive.
fn hex(digits: &str) -> Option<u16> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// Exactly two hex digits.
fn hex_byte(digits: &str) -> Option<u8> {
    if digits.len() != 2 {
        return None;
    }
    Some(hex(digits)? as u8)
}

/// Exactly four hex digits, emitted low byte first.
fn hex_word(digits: &str) -> Option<Vec<u8>> {
    if digits.len() != 4 {
        return None;
    }
    Some(hex(digits)?.to_le_bytes().to_vec())
}
