use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::Path;

use cds_rs::Catalog;

mod analyze;
mod model;
use analyze::{disassemble, Disassembly, Row};
use model::Image;

#[derive(Parser, Debug)]
#[command(author, version, about = "Emotion Engine disassembler CLI", long_about = None)]
struct Cli {
    /// Load address for the binary in target address space (hex or dec)
    #[arg(long, default_value = "0")]
    base: String,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotated disassembly listing with labels, xrefs and pointer notes
    Listing {
        /// Show raw instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Reconstructed function table with call edges
    Functions {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

/// Word bytes shown most-significant-first, matching the little-endian
/// display convention of the original tooling.
fn fmt_bytes(bytes: [u8; 4]) -> String {
    format!(
        "{:02X} {:02X} {:02X} {:02X}",
        bytes[3], bytes[2], bytes[1], bytes[0]
    )
}

fn render_row(buf: &mut String, row: &Row, show_bytes: bool) {
    if let Some(label) = &row.label {
        let _ = writeln!(buf, "{:08X} <{label}>:", row.addr);
    }
    let mut line = format!("  {:08X}: ", row.addr);
    if show_bytes {
        let _ = write!(line, "{}  ", fmt_bytes(row.bytes));
    }
    let _ = write!(line, "{}", row.mnemonic);
    if !row.operands.is_empty() {
        let _ = write!(line, " {}", row.operands);
    }
    if !row.comment.is_empty() {
        let _ = write!(line, "\t{}", row.comment);
    }
    let _ = writeln!(buf, "{line}");
}

fn render_functions(buf: &mut String, dis: &Disassembly) {
    let _ = writeln!(buf, "functions : {}", dis.functions.len());
    for f in &dis.functions {
        let calls: Vec<String> = f.calls.iter().map(|a| format!("{a:#010x}")).collect();
        let callers: Vec<String> = f.called_from.iter().map(|a| format!("{a:#010x}")).collect();
        let _ = writeln!(
            buf,
            "  {:#010x} {:<20} calls=[{}] called_from=[{}]",
            f.entry,
            f.name,
            calls.join(", "),
            callers.join(", ")
        );
    }
}

fn emit(buf: String, out: Option<String>) -> Result<()> {
    if let Some(path) = out {
        std::fs::write(path, buf)?;
    } else {
        print!("{buf}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base = parse_u32(&cli.base)?;
    let img = Image::load(Path::new(&cli.input), base, cli.skip, cli.len)?;

    let catalog = Catalog::ee();
    let dis = disassemble(&catalog, &img);

    match cli.cmd {
        Command::Listing {
            show_bytes,
            format,
            out,
        } => match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&dis)?;
                emit(json, out)?;
            }
            OutputFormat::Text => {
                let mut buf = String::new();
                for row in &dis.rows {
                    render_row(&mut buf, row, show_bytes);
                }
                emit(buf, out)?;
            }
        },
        Command::Functions { format, out } => match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&dis.functions)?;
                emit(json, out)?;
            }
            OutputFormat::Text => {
                let mut buf = String::new();
                render_functions(&mut buf, &dis);
                emit(buf, out)?;
            }
        },
    }

    Ok(())
}
