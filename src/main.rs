use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use seteao::interpreter::{InterpreterConfig, StdinInput, StdoutSink};
use seteao::pipeline::{compile_tac, execute_with};

/// Runs SeteAO programs, or prints their three-address code.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program file; the source is read from stdin when omitted.
    path: Option<PathBuf>,

    /// Print the generated and optimized TAC instead of running the program.
    #[arg(long)]
    tac: bool,

    /// Write the HTML produced by web elements to this file.
    #[arg(long, value_name = "ARQUIVO")]
    html: Option<PathBuf>,

    /// Iterations allowed per loop activation.
    #[arg(long, default_value_t = 10_000)]
    loop_limit: usize,

    /// Nested function calls allowed before the run is aborted.
    #[arg(long, default_value_t = 200)]
    max_call_depth: usize,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let (source, source_file) = match &args.path {
        Some(path) => (
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?,
            path.display().to_string(),
        ),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            (buffer, "<stdin>".to_string())
        }
    };

    if args.tac {
        let listing = compile_tac(&source, &source_file)?;
        println!("; TAC gerado");
        print!("{}", listing.generated);
        println!("; TAC otimizado");
        print!("{}", listing.optimized);
        return Ok(ExitCode::SUCCESS);
    }

    let config = InterpreterConfig {
        source_file,
        loop_limit: args.loop_limit,
        max_call_depth: args.max_call_depth,
    };
    let report = execute_with(&source, config, StdoutSink, StdinInput)?;

    if let Some(path) = &args.html {
        fs::write(path, &report.html).with_context(|| format!("Writing {}", path.display()))?;
    }
    for error in &report.errors {
        eprintln!("{error}");
    }
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
