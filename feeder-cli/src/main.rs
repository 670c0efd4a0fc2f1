//! aifeeder - AI-controlled pet feeder
//! Command-line interface: watch the bowl, check once, feed manually

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::*;
use feeder_actuator::{FeedCommand, HarReplayActuator, HarRequest, ReplayConfig};
use feeder_core::config::{mask_secret, CameraSource, FeederConfig};
use feeder_core::traits::{BowlVerdict, Classifier};
use feeder_orchestration::{CheckCycle, FeederSession, LogEntry, LogKind, SessionConfig};
use feeder_photonic::{CameraConfig, CameraSensor};
use feeder_vision::{GeminiClassifier, GeminiConfig};
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aifeeder")]
#[command(author = "SIL Contributors")]
#[command(version = "2026.10.16")]
#[command(about = "AI-controlled pet feeder", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "FEEDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the bowl periodically and feed when it is low
    Watch {
        /// Seconds between checks (default: 300)
        #[arg(short, long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Take one photo and ask the model, without feeding
    Check,

    /// Trigger the feeder now (manual feed)
    Feed,

    /// Save one photo to disk, to aim the camera
    Snapshot {
        /// Output image file
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Show the effective configuration
    Info,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aifeeder=info,feeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Watch { interval } => watch_command(config, interval),
        Commands::Check => check_command(config),
        Commands::Feed => feed_command(config),
        Commands::Snapshot { output } => snapshot_command(config, &output),
        Commands::Info => info_command(config),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

// ============================================================================
// Component wiring
// ============================================================================

fn load_config(path: Option<&Path>) -> anyhow::Result<FeederConfig> {
    let config = FeederConfig::load(path).context("failed to load configuration")?;
    tracing::debug!(file = ?path, model = %config.vision.model, "configuration loaded");
    Ok(config)
}

/// `--interval` overrides file and environment
fn apply_overrides(config: &mut FeederConfig, interval: Option<u64>) -> anyhow::Result<()> {
    if let Some(secs) = interval {
        if secs == 0 {
            bail!("--interval must be greater than zero");
        }
        config.schedule.interval_secs = secs;
    }
    Ok(())
}

fn build_camera(config: &FeederConfig) -> anyhow::Result<CameraSensor> {
    CameraSensor::with_config(CameraConfig::from(&config.camera)).context("camera setup failed")
}

fn build_classifier(config: &FeederConfig) -> anyhow::Result<GeminiClassifier> {
    let gemini = GeminiConfig::from_settings(&config.vision)?;
    Ok(GeminiClassifier::new(gemini)?)
}

fn build_feeder(config: &FeederConfig) -> anyhow::Result<HarReplayActuator> {
    let har = config.har_content()?;
    HarReplayActuator::from_har(&har, ReplayConfig::from(&config.feeder))
        .context("feeder setup failed")
}

// ============================================================================
// Commands
// ============================================================================

fn watch_command(config_path: Option<&Path>, interval: Option<u64>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, interval)?;

    let cycle = CheckCycle::new(
        build_camera(&config)?,
        build_classifier(&config)?,
        build_feeder(&config)?,
    );
    let session = FeederSession::new(cycle, SessionConfig::from(&config))?;
    session.log().subscribe(print_entry)?;

    println!(
        "{} bowl every {}s (press Enter to stop)",
        "Watching".green().bold(),
        config.schedule.interval_secs
    );
    session.start()?;

    // Enter ou fim do stdin
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    session.stop()?;

    let stats = session.stats()?;
    println!(
        "{} {} checks, {} feeds, {} errors",
        "Summary".bold(),
        stats.cycles,
        stats.fed,
        stats.errors + stats.photo_failures
    );
    Ok(())
}

fn check_command(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut camera = build_camera(&config)?;
    let mut classifier = build_classifier(&config)?;

    let image = camera.capture().context("Failed to take photo.")?;
    println!(
        "{} {} ({} bytes)",
        "    Captured".green().bold(),
        image.mime_type(),
        image.len()
    );

    let verdict = classifier.classify(&image)?;
    println!(
        "{} {}",
        "   AI answer".green().bold(),
        classifier.last_answer().unwrap_or("").cyan()
    );

    let verdict_text = match verdict {
        BowlVerdict::NeedsFood => "Need to feed.".yellow().bold(),
        BowlVerdict::Sufficient => "No need to feed.".green(),
    };
    println!("{} {}", "     Verdict".bold(), verdict_text);
    Ok(())
}

fn feed_command(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let feeder = build_feeder(&config)?;

    println!("{} {}", "     Sending".green().bold(), feeder.request().to_string().cyan());
    let receipt = feeder.feed(FeedCommand::Manual)?;

    println!("{} HTTP {}", "Manual feed sent.".green().bold(), receipt.status);
    if !receipt.body.is_empty() {
        println!("{}", receipt.body.dimmed());
    }
    Ok(())
}

fn snapshot_command(config_path: Option<&Path>, output: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut camera = build_camera(&config)?;

    let image = camera.capture().context("Failed to take photo.")?;
    fs::write(output, image.bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} {} ({}, {} bytes)",
        "       Saved".green().bold(),
        output.display().to_string().cyan(),
        image.mime_type(),
        image.len()
    );

    let expected = image.format().extension();
    if output.extension().and_then(|e| e.to_str()) != Some(expected) {
        println!("{} image is {}, consider a .{} extension", "warning:".yellow().bold(), image.format(), expected);
    }
    Ok(())
}

fn info_command(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    println!("{}", "aifeeder - AI-controlled pet feeder".bold());
    println!();
    println!("{}", "Camera:".bold());
    println!("  source      {}", describe_source(&config.camera.source));
    println!("  resolution  {}x{}", config.camera.width, config.camera.height);
    println!("  timeout     {}s", config.camera.timeout_secs);
    println!();
    println!("{}", "Vision:".bold());
    println!("  model       {}", config.vision.model);
    println!("  endpoint    {}", config.vision.endpoint);
    let key = match config.api_key() {
        Ok(key) => mask_secret(key).green(),
        Err(_) => "not set (GEMINI_API_KEY)".red(),
    };
    println!("  api key     {}", key);
    println!();
    println!("{}", "Feeder:".bold());
    match config.har_content() {
        Ok(har) => match HarRequest::from_har(&har) {
            Ok(request) => println!("  request     {}", request.to_string().green()),
            Err(e) => println!("  request     {}", e.to_string().red()),
        },
        Err(e) => println!("  request     {}", e.to_string().red()),
    }
    println!("  timeout     {}s", config.feeder.timeout_secs);
    println!();
    println!("{}", "Schedule:".bold());
    println!("  interval    {}s", config.schedule.interval_secs);
    println!("  history     {} lines", config.schedule.log_capacity);
    println!();
    println!("{}", "Commands:".bold());
    println!("  aifeeder watch                   # Check every 5 minutes, feed when low");
    println!("  aifeeder watch --interval 60     # Custom interval");
    println!("  aifeeder check                   # One photo + verdict, no feeding");
    println!("  aifeeder feed                    # Feed Now (manual)");
    println!("  aifeeder snapshot -o bowl.jpg    # Save a photo to aim the camera");
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn print_entry(entry: &LogEntry) {
    let line = entry.to_string();
    let line = match entry.kind {
        LogKind::NeedToFeed | LogKind::ManualFeed => line.green(),
        LogKind::Started | LogKind::Stopped => line.dimmed(),
        ref kind if kind.is_error() => line.red(),
        _ => line.normal(),
    };
    println!("{}", line);
}

fn describe_source(source: &CameraSource) -> String {
    match source {
        CameraSource::Command { program, args } if args.is_empty() => {
            format!("command `{}`", program)
        }
        CameraSource::Command { program, args } => {
            format!("command `{} {}`", program, args.join(" "))
        }
        CameraSource::File { path } => format!("file {}", path.display()),
        CameraSource::Url { url } => format!("url {}", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_interval() {
        let cli = Cli::try_parse_from(["aifeeder", "watch", "--interval", "60"]).unwrap();
        assert!(matches!(cli.command, Commands::Watch { interval: Some(60) }));
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["aifeeder", "check", "--config", "feeder.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("feeder.toml")));
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_snapshot_requires_output() {
        assert!(Cli::try_parse_from(["aifeeder", "snapshot"]).is_err());
        let cli = Cli::try_parse_from(["aifeeder", "snapshot", "-o", "bowl.jpg"]).unwrap();
        assert!(matches!(cli.command, Commands::Snapshot { .. }));
    }

    #[test]
    fn test_interval_override() {
        let mut config = FeederConfig::default();
        apply_overrides(&mut config, Some(30)).unwrap();
        assert_eq!(config.schedule.interval_secs, 30);

        apply_overrides(&mut config, None).unwrap();
        assert_eq!(config.schedule.interval_secs, 30);

        assert!(apply_overrides(&mut config, Some(0)).is_err());
    }

    #[test]
    fn test_describe_source() {
        let source = CameraSource::Command {
            program: "fswebcam".into(),
            args: vec!["-".into()],
        };
        assert_eq!(describe_source(&source), "command `fswebcam -`");
        assert_eq!(
            describe_source(&CameraSource::Url {
                url: "http://cam.local/snap.jpg".into()
            }),
            "url http://cam.local/snap.jpg"
        );
    }
}
