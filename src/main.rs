//! Command-line driver: reads a machine description and converts messages.
//!
//! ```text
//! rotorcrypt [--verbose] CONFIG [INPUT [OUTPUT]]
//! ```

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rotorcrypt::config::parse_machine;
use rotorcrypt::Session;

/// Rotor cipher machine simulator.
#[derive(Debug, Parser)]
#[command(name = "rotorcrypt", version, about)]
struct Cli {
    /// Log every converted symbol with the rotor settings.
    #[arg(long)]
    verbose: bool,

    /// Machine description file.
    config: PathBuf,

    /// Message file; standard input when omitted.
    input: Option<PathBuf>,

    /// Output file; standard output when omitted.
    output: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("rotorcrypt=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false),
        )
        .with(env_filter)
        .init();
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("could not open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("could not open {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = fs::read_to_string(&cli.config)
        .with_context(|| format!("could not open {}", cli.config.display()))?;
    let machine = parse_machine(&config)
        .with_context(|| format!("bad configuration in {}", cli.config.display()))?;
    let mut session = Session::new(machine);

    let input = open_input(cli.input.as_ref())?;
    let mut output = open_output(cli.output.as_ref())?;

    let mut empty = true;
    for (number, line) in input.lines().enumerate() {
        let line = line.context("could not read input")?;
        empty = false;
        if let Some(converted) = session
            .process_line(&line)
            .with_context(|| format!("input line {}", number + 1))?
        {
            writeln!(output, "{}", converted)?;
        }
    }
    output.flush()?;

    if empty {
        bail!("empty input");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(?cli, "starting");
    run(&cli)
}
