use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_INPUT_DIR: &str = "messages/inbox";
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";
pub const DEFAULT_FILE_PREFIX: &str = "message";

/// What to do when a single message file cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run on the first bad file.
    #[default]
    Abort,
    /// Log the bad file and carry on with the next one.
    Skip,
}

/// Configuration required to run the extraction.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub sender: String,
    pub file_prefix: String,
    pub on_error: FailurePolicy,
    pub quiet: bool,
}

impl ExtractConfig {
    /// Builds a config with the documented defaults for everything but the sender.
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            sender: sender.into(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            on_error: FailurePolicy::default(),
            quiet: false,
        }
    }
}
