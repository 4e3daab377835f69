// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{error, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use sublrc::app_config::{self, Config};
use sublrc::app_controller::Controller;
use sublrc::lrc::TimeWindow;
use sublrc::subtitle_processor::SubtitleFormat;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Vtt,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
            CliSubtitleFormat::Vtt => SubtitleFormat::Vtt,
        }
    }
}

/// Optional time range shared by all conversion commands
#[derive(Args, Debug, Clone)]
struct WindowArgs {
    /// Trim start time (MM:SS or HH:MM:SS[.mmm])
    #[arg(short, long, requires = "end")]
    start: Option<String>,

    /// Trim end time (MM:SS or HH:MM:SS[.mmm])
    #[arg(short, long, requires = "start")]
    end: Option<String>,
}

impl WindowArgs {
    // @parses: Window, failing on malformed boundaries
    fn to_window(&self) -> Result<Option<TimeWindow>> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Ok(Some(TimeWindow::parse(start, end)?)),
            _ => Ok(None),
        }
    }
}

/// Directory options shared by merge and download
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Output directory for final MP3 files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for downloaded files and generated LRC
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Keep all intermediate files in the source directory
    #[arg(long)]
    no_cleanup: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an SRT/VTT file (or every one in a directory) to LRC
    Convert {
        /// Subtitle file or directory
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Output .lrc file (single file input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Subtitle grammar, detected from extension and content when omitted
        #[arg(long, value_enum)]
        format: Option<CliSubtitleFormat>,

        /// Print the lyrics instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Combine an existing audio file and subtitle file
    Merge {
        /// Audio file (mp3, mp4, wav, ...)
        #[arg(long)]
        audio: PathBuf,

        /// Subtitle file (.srt or .vtt)
        #[arg(long)]
        subtitle: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        dirs: OutputArgs,
    },

    /// Download a video's audio and subtitles and embed them as lyrics
    Download {
        /// Complete URL of the target video
        #[arg(value_name = "URL")]
        url: String,

        /// Subtitle language code (e.g. 'en', 'zh-Hans')
        #[arg(short, long)]
        lang: Option<String>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        dirs: OutputArgs,
    },

    /// Generate shell completions for sublrc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// sublrc - Subtitles to embedded LRC lyrics
#[derive(Parser, Debug)]
#[command(name = "sublrc")]
#[command(version)]
#[command(about = "Convert video subtitles into LRC lyrics embedded in MP3 files")]
#[command(long_about = "sublrc turns SRT/WebVTT subtitles into LRC lyrics, optionally cut to a time window.

EXAMPLES:
    sublrc convert talk.en.srt                          # Write talk.en.lrc next to the input
    sublrc convert talk.vtt -s 1:00 -e 2:30 --stdout    # Print a 90 second excerpt
    sublrc convert ./subs/                              # Convert a whole directory
    sublrc merge --audio song.mp4 --subtitle song.srt   # Tag a local file
    sublrc download \"URL\" -s 0:00 -e 2:21 -o ./music   # Download, trim and tag
    sublrc completions bash > sublrc.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "⚠️ ",
            Level::Info => "",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {}{}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    // Command line log level wins over the config file
    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "sublrc", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    match cli.command {
        Commands::Convert { input_path, output, format, stdout, force_overwrite, window } => {
            let controller = Controller::with_config(config)?;
            let window = window.to_window()?;
            let format = format.map(SubtitleFormat::from);

            if input_path.is_dir() {
                if output.is_some() || stdout {
                    return Err(anyhow!("--output and --stdout require a single input file"));
                }
                controller.convert_folder(&input_path, format, window.as_ref(), force_overwrite)?;
            } else if input_path.is_file() {
                if stdout {
                    let document = controller.convert_subtitle_file(&input_path, format, window.as_ref())?;
                    println!("{}", document);
                } else {
                    controller.convert_to_file(
                        &input_path,
                        output.as_deref(),
                        format,
                        window.as_ref(),
                        force_overwrite,
                    )?;
                }
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", input_path));
            }
        }
        Commands::Merge { audio, subtitle, window, dirs } => {
            apply_output_args(&mut config, &dirs);
            let controller = Controller::with_config(config)?;
            let window = window.to_window()?;

            let output = controller.merge(&audio, &subtitle, window.as_ref()).await
                .map_err(|e| anyhow!("Merge failed: {:#}", e))?;
            info!("Success: {}", output.display());
        }
        Commands::Download { url, lang, window, dirs } => {
            apply_output_args(&mut config, &dirs);
            if let Some(lang) = lang {
                config.language = lang;
            }
            let controller = Controller::with_config(config)?;
            let window = window.to_window()?;

            let output = controller.download(&url, window.as_ref()).await?;
            info!("Success: {}", output.display());
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

// @applies: Directory overrides from the command line
fn apply_output_args(config: &mut Config, dirs: &OutputArgs) {
    if let Some(output) = &dirs.output {
        config.output_dir = output.clone();
    }
    if let Some(source_dir) = &dirs.source_dir {
        config.source_dir = source_dir.clone();
    }
    if dirs.no_cleanup {
        config.keep_intermediate = true;
    }
}
