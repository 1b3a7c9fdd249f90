use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use kokoro_batch::catalog::{LANGUAGES, VOICES};
use kokoro_batch::config::Config;
use kokoro_batch::{ConsoleProgress, FileQueue, OutputFormat, ProcessingParams, Session};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kokoro-batch")]
#[command(about = "Queue text files and synthesize them with the Kokoro TTS launcher")]
#[command(version)]
struct Args {
    /// Files or glob patterns to process, in order (supports **)
    files: Vec<String>,

    /// Voice to use (see --list-voices)
    #[arg(short, long)]
    voice: Option<String>,

    /// Language code or name, e.g. en-us or "English (American)"
    #[arg(short, long)]
    lang: Option<String>,

    /// Speaking speed, 0.5 to 2.0
    #[arg(short, long)]
    speed: Option<f64>,

    /// Output audio format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory for split output segments
    #[arg(long)]
    split_output: Option<PathBuf>,

    /// Path to the Kokoro launcher (overrides the configured path)
    #[arg(short, long)]
    tool: Option<PathBuf>,

    /// List available voices
    #[arg(long)]
    list_voices: bool,

    /// List available languages
    #[arg(long)]
    list_languages: bool,

    /// Show debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (tool_path, voice, language, speed, format, split_dir)
        key: String,
        /// Value to set
        value: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Some(Commands::Config { action }) = args.command {
        return handle_config_command(action);
    }

    if args.list_voices {
        list_voices();
        return Ok(());
    }

    if args.list_languages {
        list_languages();
        return Ok(());
    }

    // Show help if no file argument provided
    if args.files.is_empty() {
        Args::command().print_long_help()?;
        return Ok(());
    }

    let config = Config::load().context("Failed to load configuration")?;

    let mut queue = FileQueue::new();
    queue.add_patterns(&args.files);
    log::debug!("Queued {} file(s)", queue.len());

    let split_dir = args
        .split_output
        .or_else(|| config.split_dir.as_ref().map(PathBuf::from));
    let params = ProcessingParams::new(
        args.voice.as_deref().unwrap_or(&config.voice),
        args.lang.as_deref().unwrap_or(&config.language),
        args.speed.unwrap_or(config.speed),
        args.format.unwrap_or(config.format),
        split_dir,
    )?;

    let tool = args
        .tool
        .unwrap_or_else(|| PathBuf::from(&config.tool_path));

    if args.debug {
        eprintln!("Launcher: {}", tool.display());
        eprintln!("Voice: {}", params.voice);
        eprintln!("Language: {}", params.language);
        eprintln!("Speed: {}", params.speed_arg());
        eprintln!("Format: {}", params.format);
    }

    let session = Session::new(queue, params, tool);
    let report = session.run(&ConsoleProgress::new())?;

    if !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn list_voices() {
    println!("Available voices:");
    println!();
    for voice in VOICES {
        println!("  {}", voice);
    }
}

fn list_languages() {
    println!("Available languages:");
    println!();
    for language in LANGUAGES {
        println!("  {:<6} {}", language.code, language.name);
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            let path = Config::config_path()?;

            println!("Config file: {}", path.display());
            println!();
            println!("tool_path = \"{}\"", config.tool_path);
            println!("voice = \"{}\"", config.voice);
            println!("language = \"{}\"", config.language);
            println!("speed = {}", config.speed);
            println!("format = \"{}\"", config.format);
            match &config.split_dir {
                Some(dir) => println!("split_dir = \"{}\"", dir),
                None => println!("split_dir = (none)"),
            }

            // Show status of the launcher
            println!();
            let found = PathBuf::from(&config.tool_path).exists();
            println!("launcher: {}", if found { "found" } else { "NOT FOUND" });

            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuration updated");
            Ok(())
        }
    }
}
