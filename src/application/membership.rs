//! # Membership Store
//!
//! Durable record of the rooms the bot has joined, one room id per line in
//! `joined-rooms.txt`. Loaded once at startup and appended to whenever an
//! invite is accepted. Every append is flushed to disk before returning.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::types::JoinRecord;

#[derive(Debug)]
pub struct MembershipStore {
    path: PathBuf,
    file: File,
    rooms: Vec<String>,
    index: HashSet<String>,
    /// Set when an externally written file does not end with a newline.
    needs_newline: bool,
}

impl MembershipStore {
    /// Opens the file for read-and-append, creating it on first run.
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("Failed to open membership file {}", path.display()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read membership file {}", path.display()))?;

        let mut rooms = Vec::new();
        let mut index = HashSet::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if index.insert(line.to_string()) {
                rooms.push(line.to_string());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            rooms,
            index,
            needs_newline: !content.is_empty() && !content.ends_with('\n'),
        })
    }

    /// Same contents as `load`, but every append fails.
    #[cfg(test)]
    pub(crate) fn read_only(path: &Path) -> Result<Self> {
        let mut store = Self::load(path)?;
        store.file = File::open(path)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All known rooms in the order they were first recorded.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.index.contains(room_id)
    }

    /// Append-if-absent. The in-memory set only changes once the line is on disk.
    pub fn record_join(&mut self, room_id: &str) -> Result<JoinRecord> {
        if self.contains(room_id) {
            return Ok(JoinRecord::AlreadyRecorded);
        }

        let line = if self.needs_newline {
            format!("\n{room_id}\n")
        } else {
            format!("{room_id}\n")
        };
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.sync_data())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        self.needs_newline = false;
        self.rooms.push(room_id.to_string());
        self.index.insert(room_id.to_string());
        Ok(JoinRecord::Recorded)
    }
}
