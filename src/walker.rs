use crate::error::{ExtractError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One chat thread's directory inside the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub name: String,
    pub path: PathBuf,
}

/// List the conversation directories under `root`, sorted by name.
/// Plain files at the root (e.g. `.DS_Store`) are ignored.
pub fn conversations(root: &Path) -> Result<Vec<Conversation>> {
    Ok(sorted_entries(root)?
        .into_iter()
        .filter(|(_, path)| path.is_dir())
        .map(|(name, path)| Conversation { name, path })
        .collect())
}

/// List the message-archive files of one conversation: regular files whose
/// name starts with `prefix`, sorted by name.
pub fn message_files(conversation: &Conversation, prefix: &str) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(&conversation.path)?
        .into_iter()
        .filter(|(name, path)| name.starts_with(prefix) && path.is_file())
        .map(|(_, path)| path)
        .collect())
}

fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| ExtractError::io(dir, e))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExtractError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        out.push((name, entry.path()));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
