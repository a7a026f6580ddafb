use crate::error::{ExtractError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only writer over the output file.
///
/// Opened once per run. Dropping the sink flushes whatever is buffered and
/// closes the handle, so lines already appended survive a failed run.
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
    empty_lines: usize,
}

impl OutputSink {
    /// Open `path` for appending, creating it if absent. Never truncates.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ExtractError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            lines: 0,
            empty_lines: 0,
        })
    }

    /// Append `line` followed by a single `\n`.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|e| ExtractError::io(&self.path, e))?;
        self.lines += 1;
        if line.is_empty() {
            self.empty_lines += 1;
        }
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn empty_lines_written(&self) -> usize {
        self.empty_lines
    }

    /// Flush buffered lines and release the handle, reporting flush failures.
    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| ExtractError::io(&self.path, e))
    }
}
