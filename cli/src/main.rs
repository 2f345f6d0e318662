//! swfbbox - Report and repair the bounding boxes of SWF documents
//!
//! Reads one document, recomputes its extent from what the main timeline
//! actually places, and optionally writes back a copy with corrected shape,
//! text and frame rectangles.

mod args;

use anyhow::Context;
use args::{parse_args, Command, Options, USAGE};
use bbox_engine::report::{format_movie_size, render_instances};
use bbox_engine::{BboxConfig, BboxEngine, BboxReport};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let options = match command {
        Command::Help => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Command::Version => {
            println!("swfbbox {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Command::Run(options) => options,
    };

    init_logging(options.verbosity);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(1)
        }
    }
}

/// RUST_LOG takes precedence over the verbosity flags
fn init_logging(verbosity: i32) {
    let level = match verbosity {
        v if v < 0 => "error",
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn engine_config(options: &Options) -> anyhow::Result<BboxConfig> {
    let mut config = match &options.config {
        Some(path) => BboxConfig::load(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => BboxConfig::default(),
    };
    config.optimize |= options.optimize;
    config.expand |= options.expand;
    config.collect_placements |= options.swifty;
    Ok(config)
}

fn run(options: &Options) -> anyhow::Result<()> {
    let config = engine_config(options)?;
    tracing::debug!("configuration: {:?}", config);

    let engine = BboxEngine::new(config);
    let report = engine
        .run_file(&options.input, &options.output)
        .with_context(|| format!("processing {}", options.input.display()))?;

    print!("{}", render_output(options, engine.config(), &report));
    Ok(())
}

/// Instance listing (when collected) followed by the requested size lines
fn render_output(options: &Options, config: &BboxConfig, report: &BboxReport) -> String {
    let mut out = String::new();
    if config.collect_placements {
        out.push_str(&render_instances(report));
    }
    if options.show_computed {
        if !options.quiet() {
            out.push_str("Real Movie Size: ");
        }
        out.push_str(&format_movie_size(&report.computed_rect()));
        out.push('\n');
    }
    if options.show_original {
        if !options.quiet() {
            out.push_str("Original Movie Size: ");
        }
        out.push_str(&format_movie_size(&report.declared));
        out.push('\n');
    }
    out
}
