use colored::Colorize;

use crate::asm::Program;
use crate::cpu::Snapshot;

/// Render the final machine state. The minimal form is plain `NAME value`
/// lines suited to blackbox tests; the normal form is a boxed table with
/// hex/decimal/binary columns.
pub fn print_state(state: &Snapshot, minimal: bool) {
    if minimal {
        println!("A 0x{:02x}", state.a);
        println!("X 0x{:02x}", state.x);
        println!("Y 0x{:02x}", state.y);
        println!("SP 0x{:02x}", state.sp);
        println!("PC 0x{:04x}", state.pc);
        for (name, flag) in flags(state) {
            println!("{} {}", name, flag as u8);
        }
        return;
    }

    boxed_top();
    boxed(format!(" {:<3} {:>4}  {:>3}  {:>10}", "", "hex", "dec", "bin"));
    for (name, value) in [("A", state.a), ("X", state.x), ("Y", state.y), ("SP", state.sp)] {
        boxed(format!(
            " {name:<3} 0x{value:02x}  {value:>3}  0b{value:08b}"
        ));
    }
    boxed(format!(" {:<3} 0x{:04x}", "PC", state.pc));
    boxed(format!(" {:<3} 0b{:08b}  NV-BDIZC", "P", packed(state)));
    boxed_bottom();
}

/// Per-line byte groups of an assembled program, for diagnostic display.
pub fn print_listing(program: &Program) {
    for (number, group) in program.lines().enumerate() {
        let bytes = group
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{} {}", format!("{:>4} │", number + 1).dimmed(), bytes);
    }
}

fn flags(state: &Snapshot) -> [(&'static str, bool); 6] {
    [
        ("N", state.negative),
        ("V", state.overflow),
        ("D", state.decimal),
        ("I", state.interrupt_disable),
        ("Z", state.zero),
        ("C", state.carry),
    ]
}

/// Status byte in the N V - B D I Z C layout, stack-only bits clear.
fn packed(state: &Snapshot) -> u8 {
    (state.negative as u8) << 7
        | (state.overflow as u8) << 6
        | (state.decimal as u8) << 3
        | (state.interrupt_disable as u8) << 2
        | (state.zero as u8) << 1
        | state.carry as u8
}

const INNER_WIDTH: usize = 28;

fn boxed_top() {
    println!("{}", format!("┌{}┐", "─".repeat(INNER_WIDTH)).dimmed());
}

fn boxed_bottom() {
    println!("{}", format!("└{}┘", "─".repeat(INNER_WIDTH)).dimmed());
}

fn boxed(content: String) {
    let pad = INNER_WIDTH.saturating_sub(content.chars().count());
    println!(
        "{}{}{}{}",
        "│".dimmed(),
        content,
        " ".repeat(pad),
        "│".dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_uses_the_hardware_layout() {
        let state = Snapshot {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0,
            negative: true,
            overflow: false,
            decimal: false,
            interrupt_disable: false,
            zero: false,
            carry: true,
        };
        assert_eq!(packed(&state), 0b1000_0001);
    }
}
