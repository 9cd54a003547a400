use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{bail, IntoDiagnostic, Result};

use moss::{output, Cpu};

/// Moss is an assembler and software emulator for the MOS 6502 CPU.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble and run a `.asm` file, printing the final machine state
    Run {
        /// `.asm` file to run
        name: PathBuf,
        /// Address the program is loaded at and started from
        #[arg(short, long, default_value = "0x0600", value_parser = parse_addr)]
        load_addr: u16,
        /// Abort after this many executed instructions
        #[arg(long, default_value_t = 1_000_000)]
        limit: u64,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Create a binary `.bin` file to load later or view emitted bytes
    Asm {
        /// `.asm` file to assemble
        name: PathBuf,
        /// Destination to output .bin file
        dest: Option<PathBuf>,
    },
    /// Check a `.asm` file without running or outputting binary
    Check {
        /// File to check
        name: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(3)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                load_addr,
                limit,
                minimal,
            } => {
                run(&name, load_addr, limit, minimal)?;
                Ok(())
            }
            Command::Asm { name, dest } => {
                file_message(Green, "Assembling", &name);
                let source = read_source(&name)?;
                let program = moss::assemble(&source)?;
                output::print_listing(&program);

                let out_file_name =
                    dest.unwrap_or(name.with_extension("bin").file_name().unwrap().into());
                fs::write(&out_file_name, program.flatten()).into_diagnostic()?;

                message(Green, "Finished", "emit binary");
                file_message(Green, "Saved", &out_file_name);
                Ok(())
            }
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let source = read_source(&name)?;
                let _ = moss::assemble(&source)?;
                message(Green, "Success", "no errors found!");
                Ok(())
            }
        }
    } else {
        if let Some(path) = args.path {
            run(&path, moss::DEFAULT_LOAD_ADDR, 1_000_000, false)?;
            Ok(())
        } else {
            println!("\n~ moss v{VERSION} ~");
            println!("{}", LOGO.truecolor(156, 220, 170).bold());
            println!("{SHORT_INFO}");
            std::process::exit(0);
        }
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.to_str().unwrap());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: impl std::fmt::Display) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &PathBuf, load_addr: u16, limit: u64, minimal: bool) -> Result<()> {
    if !minimal {
        file_message(MsgColor::Green, "Assembling", name);
    }
    let source = read_source(name)?;
    let program = moss::assemble(&source)?;

    let mut cpu = Cpu::new(load_addr);
    cpu.load(&program.flatten(), load_addr);

    if !minimal {
        message(MsgColor::Green, "Running", "emitted binary");
    }
    let ticks = cpu
        .run_bounded(moss::STOP_OPCODE, limit)
        .into_diagnostic()?;

    output::print_state(&cpu.state(), minimal);
    if !minimal {
        message(MsgColor::Green, "Completed", format!("{ticks} instructions"));
    }
    Ok(())
}

fn read_source(name: &PathBuf) -> Result<String> {
    match name.extension() {
        Some(ext) if ext == "asm" || ext == "s" => fs::read_to_string(name).into_diagnostic(),
        Some(_) => bail!("File has unknown extension. Exiting..."),
        None => bail!("File has no extension. Exiting..."),
    }
}

/// Addresses are hexadecimal, with or without a `0x` prefix.
fn parse_addr(arg: &str) -> Result<u16, String> {
    let digits = arg.strip_prefix("0x").unwrap_or(arg);
    u16::from_str_radix(digits, 16).map_err(|err| err.to_string())
}

const LOGO: &str = r#"
 _ __ ___   ___  ___ ___
| '_ ` _ \ / _ \/ __/ __|
| | | | | | (_) \__ \__ \
|_| |_| |_|\___/|___/___/"#;

const SHORT_INFO: &str = r"
Welcome to moss, an assembler and software emulator
for the MOS 6502 CPU.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
