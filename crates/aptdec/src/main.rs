use anyhow::Context;
use clap::Parser;
use log::{info, LevelFilter};

use aptdemod::AptDecoderBuilder;

mod cli;
mod emit;
mod wav;

use cli::{Args, CliError};

fn main() {
    match aptdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn aptdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    let recording = wav::load(&args.input)?;
    info!(
        "read \"{}\": {} samples at {} Hz",
        args.input,
        recording.samples.len(),
        recording.sample_rate
    );

    let mut decoder = AptDecoderBuilder::new(recording.sample_rate)
        .build()
        .with_context(|| {
            format!(
                "cannot decode at the recording's {} Hz sampling rate",
                recording.sample_rate
            )
        })?;

    let grid = decoder
        .decode(&recording.samples)
        .context("decode failed")?;

    emit::write_image(grid, &args.output)?;
    info!("wrote \"{}\"", args.output);

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("aptdemod", log_filter)
            .filter_module("aptdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}
