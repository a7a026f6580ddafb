use crate::config::{ExtractConfig, FailurePolicy};
use crate::error::Result;
use crate::filter;
use crate::sanitize::ascii_fold;
use crate::sink::OutputSink;
use crate::thread;
use crate::walker::{self, Conversation};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub conversations: usize,
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub lines_written: usize,
    pub empty_lines: usize,
}

/// The main entry point: one sequential pass over the archive.
///
/// The archive root is listed before the output file is opened, so a missing
/// root never creates an empty output. Once opened, the sink is dropped on
/// every early return, which flushes everything appended so far.
pub fn execute(config: &ExtractConfig) -> Result<ExtractSummary> {
    debug!(root = %config.input_dir.display(), "walking archive");
    let conversations = walker::conversations(&config.input_dir)?;

    let mut sink = OutputSink::open(&config.output_path)?;
    let pb = progress_bar(conversations.len() as u64, config.quiet);
    let mut summary = ExtractSummary {
        conversations: conversations.len(),
        ..ExtractSummary::default()
    };

    for conversation in &conversations {
        extract_conversation(conversation, config, &mut sink, &mut summary, &pb)?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    summary.lines_written = sink.lines_written();
    summary.empty_lines = sink.empty_lines_written();
    sink.finish()?;

    info!(
        conversations = summary.conversations,
        files = summary.files_parsed,
        skipped = summary.files_skipped,
        lines = summary.lines_written,
        "extraction complete"
    );
    Ok(summary)
}

fn extract_conversation(
    conversation: &Conversation,
    config: &ExtractConfig,
    sink: &mut OutputSink,
    summary: &mut ExtractSummary,
    pb: &ProgressBar,
) -> Result<()> {
    let files = walker::message_files(conversation, &config.file_prefix)?;
    debug!(conversation = %conversation.name, files = files.len(), "entering conversation");
    extract_files(&files, config, sink, summary, pb)
}

/// Run each file through the pipeline, applying the failure policy to
/// parse and schema errors. I/O errors always end the run.
fn extract_files(
    files: &[PathBuf],
    config: &ExtractConfig,
    sink: &mut OutputSink,
    summary: &mut ExtractSummary,
    pb: &ProgressBar,
) -> Result<()> {
    for path in files {
        match extract_file(path, &config.sender, sink) {
            Ok(lines) => {
                summary.files_parsed += 1;
                debug!(file = %path.display(), lines, "file done");
            }
            Err(e) if e.is_file_local() && config.on_error == FailurePolicy::Skip => {
                summary.files_skipped += 1;
                pb.suspend(|| warn!("Skipping {}: {}", path.display(), e));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Parse, filter, fold and append one message file. Returns the number of
/// lines appended.
fn extract_file(path: &Path, sender: &str, sink: &mut OutputSink) -> Result<usize> {
    let messages = thread::parse_file(path)?;
    let mut appended = 0usize;
    for message in &messages {
        let Some(text) = filter::select(message, sender, path)? else {
            continue;
        };
        let line = ascii_fold(text);
        if line.is_empty() {
            debug!(file = %path.display(), "message folded to an empty line");
        }
        sink.append_line(&line)?;
        appended += 1;
    }
    Ok(appended)
}

fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} conversations ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use std::fs;
    use tempfile::TempDir;

    const TARGET: &str = "Target Name";

    struct Fixture {
        tmp: TempDir,
        config: ExtractConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let root = tmp.path().join("inbox");
            fs::create_dir(&root).unwrap();
            let mut config = ExtractConfig::new(TARGET);
            config.input_dir = root;
            config.output_path = tmp.path().join("output.txt");
            config.quiet = true;
            Self { tmp, config }
        }

        fn file(&self, conversation: &str, name: &str, body: &str) {
            let dir = self.config.input_dir.join(conversation);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(name), body).unwrap();
        }

        fn output(&self) -> String {
            fs::read_to_string(&self.config.output_path).unwrap_or_default()
        }
    }

    #[test]
    fn emoji_is_stripped_and_trailing_space_kept() {
        let fx = Fixture::new();
        fx.file(
            "conv_1",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"Hello 👋"}]}"#,
        );

        let summary = execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "Hello \n");
        assert_eq!(summary.lines_written, 1);
        assert_eq!(summary.conversations, 1);
        assert_eq!(summary.files_parsed, 1);
    }

    #[test]
    fn only_target_messages_with_content_are_written() {
        let fx = Fixture::new();
        fx.file(
            "conv_1",
            "message_1.json",
            r#"{"messages":[
                {"sender_name":"Other","content":"not me"},
                {"sender_name":"Target Name","photos":[]},
                {"sender_name":"Target Name","content":"mine"}
            ]}"#,
        );

        execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "mine\n");
    }

    #[test]
    fn order_follows_sorted_directories_files_and_array() {
        let fx = Fixture::new();
        let one = |text: &str| {
            format!(r#"{{"messages":[{{"sender_name":"Target Name","content":"{text}"}}]}}"#)
        };
        fx.file("b_conv", "message_1.json", &one("b1"));
        fx.file("a_conv", "message_2.json", &one("a2"));
        fx.file("a_conv", "message_1.json", &one("a1"));
        fx.file("a_conv", "other.json", &one("ignored"));

        execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "a1\na2\nb1\n");
    }

    #[test]
    fn all_non_ascii_content_yields_empty_line() {
        let fx = Fixture::new();
        fx.file(
            "conv_1",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"🎉🎉"}]}"#,
        );

        let summary = execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "\n");
        assert_eq!(summary.empty_lines, 1);
    }

    #[test]
    fn rerun_duplicates_every_line() {
        let fx = Fixture::new();
        fx.file(
            "conv_1",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"a"},{"sender_name":"Target Name","content":"b"}]}"#,
        );

        execute(&fx.config).unwrap();
        execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "a\nb\na\nb\n");
    }

    #[test]
    fn abort_policy_keeps_earlier_lines() {
        let fx = Fixture::new();
        fx.file(
            "a_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"before"}]}"#,
        );
        fx.file("b_conv", "message_1.json", r#"{"participants":[]}"#);
        fx.file(
            "c_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"after"}]}"#,
        );

        let err = execute(&fx.config).unwrap_err();
        assert!(matches!(err, ExtractError::Schema { .. }));
        assert_eq!(fx.output(), "before\n");
    }

    #[test]
    fn skip_policy_continues_past_bad_files() {
        let mut fx = Fixture::new();
        fx.config.on_error = FailurePolicy::Skip;
        fx.file(
            "a_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"before"}]}"#,
        );
        fx.file("b_conv", "message_1.json", "not json at all");
        fx.file(
            "b_conv",
            "message_2.json",
            r#"{"messages":[{"sender_name":"Target Name","content":7}]}"#,
        );
        fx.file(
            "c_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"after"}]}"#,
        );

        let summary = execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "before\nafter\n");
        assert_eq!(summary.files_skipped, 2);
        assert_eq!(summary.files_parsed, 2);
    }

    #[test]
    fn non_string_sender_is_a_non_match() {
        let fx = Fixture::new();
        fx.file(
            "conv_1",
            "message_1.json",
            r#"{"messages":[
                {"sender_name":null,"content":"system notice"},
                {"sender_name":42,"content":7},
                {"sender_name":"Target Name","content":"mine"}
            ]}"#,
        );

        let summary = execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "mine\n");
        assert_eq!(summary.files_parsed, 1);
    }

    #[test]
    fn skip_policy_keeps_lines_written_before_a_bad_record() {
        let mut fx = Fixture::new();
        fx.config.on_error = FailurePolicy::Skip;
        fx.file(
            "a_conv",
            "message_1.json",
            r#"{"messages":[
                {"sender_name":"Target Name","content":"kept"},
                {"sender_name":"Target Name","content":["not","text"]},
                {"sender_name":"Target Name","content":"abandoned"}
            ]}"#,
        );
        fx.file(
            "b_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"next file"}]}"#,
        );

        let summary = execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "kept\nnext file\n");
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.lines_written, 2);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_aborts_even_under_skip() {
        use std::os::unix::fs::PermissionsExt;

        let mut fx = Fixture::new();
        fx.config.on_error = FailurePolicy::Skip;
        fx.file(
            "a_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"before"}]}"#,
        );
        fx.file("b_conv", "message_1.json", r#"{"messages":[]}"#);
        let locked = fx.config.input_dir.join("b_conv/message_1.json");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Running as root: permissions are not enforced.
            return;
        }

        let err = execute(&fx.config).unwrap_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert_eq!(fx.output(), "before\n");
    }

    #[test]
    fn io_error_on_a_message_file_is_not_skipped() {
        let mut fx = Fixture::new();
        fx.config.on_error = FailurePolicy::Skip;
        fx.file(
            "a_conv",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"before"}]}"#,
        );
        let good = fx.config.input_dir.join("a_conv/message_1.json");
        let not_a_file = fx.config.input_dir.join("a_conv");

        let mut sink = OutputSink::open(&fx.config.output_path).unwrap();
        let mut summary = ExtractSummary::default();
        let err = extract_files(
            &[good, not_a_file],
            &fx.config,
            &mut sink,
            &mut summary,
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        sink.finish().unwrap();

        assert!(matches!(err, ExtractError::Io { .. }));
        assert_eq!(summary.files_skipped, 0);
        assert_eq!(fx.output(), "before\n");
    }

    #[test]
    fn missing_root_fails_without_creating_output() {
        let mut fx = Fixture::new();
        fx.config.input_dir = fx.tmp.path().join("does-not-exist");

        let err = execute(&fx.config).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert!(!fx.config.output_path.exists());
    }

    #[test]
    fn custom_prefix_selects_other_files() {
        let mut fx = Fixture::new();
        fx.config.file_prefix = "thread".to_string();
        fx.file(
            "conv_1",
            "thread_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"picked"}]}"#,
        );
        fx.file(
            "conv_1",
            "message_1.json",
            r#"{"messages":[{"sender_name":"Target Name","content":"ignored"}]}"#,
        );

        execute(&fx.config).unwrap();
        assert_eq!(fx.output(), "picked\n");
    }
}
