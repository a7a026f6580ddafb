use clap::Parser;
use eyre::{Context, Result, eyre};
use inbox_extract::config::{DEFAULT_FILE_PREFIX, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};
use inbox_extract::{ExtractConfig, FailurePolicy};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Extract one participant's messages from an exported chat archive
/// into a flat, ASCII-only text file (one message per line, append-only).
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Exact sender name whose messages are extracted (case-sensitive).
    #[arg(value_name = "SENDER")]
    sender: Option<String>,

    /// Archive root holding one directory per conversation.
    /// Defaults to ./messages/inbox if not set in config.
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// File to append extracted lines to.
    /// Defaults to ./output.txt if not set in config.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Only files whose name starts with this prefix are read.
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// What to do when a message file is malformed.
    #[arg(long, value_enum, value_name = "POLICY")]
    on_error: Option<FailurePolicy>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/inbox-extract/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log each conversation and file processed.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress the progress bar and the final summary.
    #[arg(short, long)]
    quiet: bool,
}

/// Settings persisted in `config.toml`.
///
/// Unknown keys are rejected: a misspelt `sender` or `on_error` would otherwise
/// fall back to a default and quietly extract the wrong thing.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    input_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    sender: Option<String>,
    prefix: Option<String>,
    on_error: Option<FailurePolicy>,
}

impl FileConfig {
    /// Load from `--config` if given, else from the per-user config dir if a
    /// file exists there, else use an empty config.
    fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::locate(explicit_path)? else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse config: {}", path.display()))
    }

    fn locate(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit_path {
            Some(p) if p.is_file() => Ok(Some(p.to_path_buf())),
            Some(p) => Err(eyre!("Config file not found: {}", p.display())),
            None => Ok(dirs::config_dir()
                .map(|d| d.join(env!("CARGO_PKG_NAME")).join("config.toml"))
                .filter(|p| p.is_file())),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "inbox_extract=debug"
    } else {
        "inbox_extract=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 1. Load config file (CLI path > default path)
    let file_cfg = FileConfig::load(cli.config.as_deref())?;

    // 2. Resolve sender (CLI > Config); there is no sensible default
    let sender = cli.sender.or(file_cfg.sender).ok_or_else(|| {
        eyre!("No sender given.\nPass SENDER on the command line, or set sender in config.toml.")
    })?;

    // 3. Build the Extract Config (CLI > Config > Default)
    let config = ExtractConfig {
        input_dir: cli
            .input
            .or(file_cfg.input_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
        output_path: cli
            .output
            .or(file_cfg.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        sender,
        file_prefix: cli
            .prefix
            .or(file_cfg.prefix)
            .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string()),
        on_error: cli.on_error.or(file_cfg.on_error).unwrap_or_default(),
        quiet: cli.quiet,
    };

    // 4. Run the extraction
    let summary = inbox_extract::execute(&config).wrap_err("Extraction failed")?;

    if !config.quiet {
        let mut line = format!(
            "Done. {} line(s) from {} file(s) in {} conversation(s) appended to {}.",
            summary.lines_written,
            summary.files_parsed,
            summary.conversations,
            config.output_path.display()
        );
        if summary.empty_lines > 0 {
            line.push_str(&format!(" {} line(s) were empty after stripping.", summary.empty_lines));
        }
        if summary.files_skipped > 0 {
            line.push_str(&format!(" Skipped {} malformed file(s).", summary.files_skipped));
        }
        eprintln!("{}", line);
    }

    Ok(())
}
