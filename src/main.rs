use std::process::ExitCode;
use anyhow::{Result, Context};
use clap::Parser;
use colored::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use paper_convert::{colors, Cli, Converter, MappingConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    setup_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bold().color(colors::ERROR), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Nothing is created until the mapping file has loaded.
    let config = MappingConfig::load(&cli.config)?;

    cli.print_summary();
    config.display(&cli.config);

    let converter = Converter::new(&cli.source, &cli.output, &config);

    if cli.dry_run {
        converter.preview().context("Dry run failed")?;
        return Ok(());
    }

    let report = converter.run().context("Error during conversion")?;

    if !report.skipped_semesters.is_empty() {
        println!("{} Skipped unknown semesters: {}",
            "⚠️".color(colors::WARNING),
            report.skipped_semesters.join(", "));
    }

    println!();
    println!("{}", "🎉 Conversion completed successfully!".bold().color(colors::SUCCESS));
    Ok(())
}

fn setup_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
