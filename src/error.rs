use miette::{miette, LabeledSpan, Report, Severity};

use crate::isa::{AddrMode, Mnemonic};

// Assembler errors. Any of these aborts the whole pass; there is no partial
// output.

pub(crate) fn asm_unknown_mnemonic(offs: usize, len: usize, line: &str, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::mnemonic",
        help = "check the list of documented 6502 mnemonics.",
        labels = vec![LabeledSpan::at(offs..offs + len, "unknown mnemonic")],
        "Unknown mnemonic while assembling \"{line}\"",
    )
    .with_source_code(src.to_string())
}

pub(crate) fn asm_no_matching_mode(
    offs: usize,
    len: usize,
    line: &str,
    mnemonic: Mnemonic,
    variants: &[(AddrMode, u8)],
    src: &str,
) -> Report {
    let supported = variants
        .iter()
        .map(|(mode, _)| mode.syntax())
        .collect::<Vec<_>>()
        .join(", ");
    miette!(
        severity = Severity::Error,
        code = "asm::operand",
        help = format!("{mnemonic} accepts: {supported}"),
        labels = vec![LabeledSpan::at(offs..offs + len, "unmatched operand")],
        "No addressing mode of {mnemonic} matches \"{line}\"",
    )
    .with_source_code(src.to_string())
}
