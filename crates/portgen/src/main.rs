//! `portgen`: port C++ numerics headers to explicit-layout C#.
//!
//! ```text
//! portgen                          # .portgen/config.toml or include/ -> generated/
//! portgen --input vendor/hmm --output src/Generated
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use portgen::{DirectorySink, PortgenConfig, init_tracing, run};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "portgen", version, about = "Port C++ numerics headers to C#")]
struct Cli {
    /// Directory scanned for headers (default: include)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory generated C# is written to (default: generated)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("cannot determine working directory")?;
    let config = PortgenConfig::load(&root).with_overrides(cli.input, cli.output);

    let output_dir = config.output_dir();
    let mut sink = DirectorySink::new(&output_dir);
    let report = run(&config, &mut sink)
        .with_context(|| format!("port into {} failed", output_dir.display()))?;

    // Skipped files are reported but do not fail the run.
    println!("{report}");
    Ok(())
}
