//! Caption Animator
//!
//! Render SRT/ASS subtitles into tightly sized, transparent overlay videos
//! for compositing in a video editor.
//!
//! # Features
//!
//! - Built-in, file and multi-document presets
//! - Animation effects injected as ASS override tags
//! - Tight overlay sizing from measured text
//! - ProRes 4444 alpha, ProRes 422 HQ or H.264 output via ffmpeg
//!
//! # Usage
//!
//! ```bash
//! caption-animator input.srt --preset modern_box --out overlay.mov
//! caption-animator input.ass --reskin --strip-overrides --preset clean_outline
//! caption-animator input.srt --interactive
//! caption-animator --list-presets
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use caption_animator::cli::interactive::{self, InteractiveSession};
use caption_animator::cli::{commands, Cli};
use caption_animator::config_initialization::initialize_configuration_hierarchy;
use caption_animator::utils::logging::{LoggingConfig, LoggingSystem};
use caption_animator::utils::path::{default_output_path, ensure_parent_dir};

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_MISSING_INPUT: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// Main entry point for the Caption Animator CLI
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = LoggingSystem::new(LoggingConfig::from_cli(cli.log_level, cli.log_format, cli.quiet));
    if let Err(e) = logging.initialize() {
        eprintln!("WARNING: failed to initialize logging: {}", e);
    }
    logging.log_system_info();

    let code = tokio::select! {
        result = run(cli) => match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("ERROR: {:#}", e);
                EXIT_FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user");
            EXIT_INTERRUPTED
        }
    };

    // A pending stdin read would keep the runtime from shutting down
    if code == EXIT_INTERRUPTED {
        std::process::exit(i32::from(code));
    }
    ExitCode::from(code)
}

async fn run(cli: Cli) -> Result<u8> {
    let settings = initialize_configuration_hierarchy(&cli)?;
    if let Some(path) = &settings.config_path {
        info!("Configuration file: {}", path.display());
    }

    if cli.list_presets {
        commands::list_presets(&settings.preset_loader())?;
        return Ok(EXIT_OK);
    }
    if cli.list_animations {
        commands::list_animations()?;
        return Ok(EXIT_OK);
    }

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("Input subtitle file is required unless a listing flag is used");
    };
    if !input.exists() {
        eprintln!("ERROR: Input file not found: {}", input.display());
        return Ok(EXIT_MISSING_INPUT);
    }

    let output = cli
        .out
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    ensure_parent_dir(&output)?;

    let loaded = settings.load_preset(&settings.preset_ref)?;
    info!("Using preset {}", loaded.source);
    let pipeline = commands::build_pipeline(&settings)?;

    if cli.interactive {
        let session = InteractiveSession::new(
            input.to_path_buf(),
            output,
            loaded,
            settings.options.clone(),
        );
        interactive::run(session, &pipeline).await?;
        return Ok(EXIT_OK);
    }

    commands::render(&pipeline, input, &output, &loaded.config, &settings.options).await?;
    Ok(EXIT_OK)
}
