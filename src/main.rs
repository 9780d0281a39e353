//! guildplay - per-guild media queue player
//!
//! # Usage
//!
//! ```bash
//! # Interactive session
//! guildplay --guild home --voice-channel Lounge
//!
//! # Script mode
//! guildplay play dQw4w9WgXcQ --voice-channel Lounge
//! guildplay resolve dQw4w9WgXcQ --json
//! ```

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use guildplay::api::{MediaResolver, OEmbedResolver, ResolveError};
use guildplay::app::{App, LineResult, Settings};
use guildplay::cli::{Cli, Command, ExitCode, Output, PlayCmd, ResolveCmd};
use guildplay::commands::failure_message;
use guildplay::config::Config;
use guildplay::logging;
use guildplay::player::PlayError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    logging::init_logging(cli.log_level.as_deref(), config.log_level.as_deref())?;

    let settings = merge_settings(&cli, &config);
    let output = Output::new(&cli);
    info!(guild = %settings.guild, player = %settings.player, "starting");

    let exit_code = match cli.command {
        None | Some(Command::Repl) => run_repl(settings, &output).await,
        Some(Command::Play(cmd)) => play_cmd(cmd, settings, &output).await,
        Some(Command::Resolve(cmd)) => resolve_cmd(cmd, &settings, &output).await,
    };
    std::process::exit(exit_code.into());
}

/// Apply CLI flags over the config file
fn merge_settings(cli: &Cli, config: &Config) -> Settings {
    let mut settings = Settings::from_config(config);
    if let Some(guild) = &cli.guild {
        settings.guild = guild.clone();
    }
    if let Some(channel) = &cli.voice_channel {
        settings.voice_channel = Some(channel.clone());
    }
    if let Some(player) = cli.player {
        settings.player = player.into();
    }
    if let Some(secs) = cli.grace_delay {
        settings.grace_delay = Duration::from_secs(secs);
    }
    settings.json = cli.should_json();
    settings
}

// =============================================================================
// Interactive session
// =============================================================================

async fn run_repl(settings: Settings, output: &Output) -> ExitCode {
    let mut app = App::new(&settings);
    output.info(format!(
        "guildplay: guild '{}'. Commands: play <locator> (p), stop (s), queue, guild <id>, quit",
        app.guild()
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if app.handle_line(&line).await == LineResult::Quit {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    app.player().stop_all().await;
                    return output.error(format!("Failed to read input: {}", e), ExitCode::Error);
                }
            },
            _ = tokio::signal::ctrl_c() => {
                output.info("Interrupted");
                break;
            }
        }
    }

    app.player().stop_all().await;
    ExitCode::Success
}

// =============================================================================
// Play Command
// =============================================================================

async fn play_cmd(cmd: PlayCmd, settings: Settings, output: &Output) -> ExitCode {
    let app = App::new(&settings);
    let player = app.player();

    for locator in &cmd.locators {
        if let Err(e) = player.play(app.user(), locator).await {
            if let Some(msg) = failure_message(&e) {
                output.info(msg);
            }
            player.stop(app.guild()).await;
            return output.error(e.to_string(), play_error_code(&e));
        }
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if player.snapshot(app.guild()).await.is_idle() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                output.info("Interrupted");
                break;
            }
        }
    }

    player.stop(app.guild()).await;
    ExitCode::Success
}

fn play_error_code(err: &PlayError) -> ExitCode {
    match err {
        PlayError::NoVoiceChannel => ExitCode::NoVoiceChannel,
        PlayError::Resolve(ResolveError::NotFound(_)) => ExitCode::NotFound,
        PlayError::Resolve(_) => ExitCode::NetworkError,
        PlayError::Sink(_) => ExitCode::SinkFailed,
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

async fn resolve_cmd(cmd: ResolveCmd, settings: &Settings, output: &Output) -> ExitCode {
    let resolver = OEmbedResolver::with_base_url(settings.resolver_url.clone());
    output.info(format!("Resolving: {}", cmd.locator));

    match resolver.resolve(&cmd.locator).await {
        Ok(media) => {
            if let Err(e) = output.print(&media) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(ResolveError::NotFound(locator)) => {
            output.error(format!("Nothing found for '{}'", locator), ExitCode::NotFound)
        }
        Err(e) => output.error(format!("Resolve failed: {}", e), ExitCode::NetworkError),
    }
}
