use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cds_rs::{compile, Catalog, CdsSource, TracingLog};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compile a CDS source file into cheat-code lines"
)]
struct Opts {
    /// Input .cds source file
    #[arg(value_name = "CDSFILE")]
    input: String,
    /// Write cheat-code output to a file instead of stdout
    #[arg(short, long)]
    out: Option<String>,
    /// Print the per-node debug trace to stderr
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let source = CdsSource::from_file(&opts.input)?;

    let catalog = Catalog::ee();
    let mut logger = TracingLog;
    let compilation = compile(&catalog, &mut logger, &source);

    if opts.trace {
        for line in compilation.debug_trace() {
            eprintln!("{line}");
        }
    }

    let cheat_code = compilation.cheat_code();
    if let Some(path) = opts.out {
        std::fs::write(path, cheat_code)?;
    } else {
        print!("{cheat_code}");
    }

    if !compilation.is_ok() {
        anyhow::bail!("compilation finished with {} error(s)", compilation.errors.len());
    }
    Ok(())
}
