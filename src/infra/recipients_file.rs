//! Recipient repository backed by a plain text file.
//!
//! One chat id per line; blank lines and `#` comments are skipped. The file
//! is re-read on every lookup so edits apply to the next broadcast.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::broadcast::Recipient,
    usecases::contracts::{RecipientSource, RecipientSourceError},
};

#[derive(Debug, Clone)]
pub struct FileRecipientSource {
    path: PathBuf,
}

impl FileRecipientSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecipientSource for FileRecipientSource {
    fn find_all(&self) -> Result<Vec<Recipient>, RecipientSourceError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            RecipientSourceError::Unavailable(format!("{}: {source}", self.path.display()))
        })?;

        parse_recipients(&raw)
    }
}

fn parse_recipients(raw: &str) -> Result<Vec<Recipient>, RecipientSourceError> {
    let mut recipients = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        let entry = line
            .split_once('#')
            .map_or(line, |(before, _)| before)
            .trim();
        if entry.is_empty() {
            continue;
        }

        let id = entry.parse::<i64>().map_err(|_| {
            RecipientSourceError::InvalidData(format!(
                "line {}: `{entry}` is not a chat id",
                index + 1
            ))
        })?;
        recipients.push(Recipient::new(id));
    }

    Ok(recipients)
}
