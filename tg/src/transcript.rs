//! Conversation transcripts
//!
//! With `debug.log-conversations = true`, each chat session is written as
//! JSONL to ~/.tripguide/conversations/. Only settled messages are
//! recorded; placeholders are skipped.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::chat::{Message, MessageId, Role};

/// One transcript line
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub event: TranscriptEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum TranscriptEvent {
    SessionStart,
    Message { id: MessageId, role: Role, text: String },
    Truncated { after: MessageId },
    Reset,
    SessionEnd,
}

/// Writes transcript entries; a disabled logger drops everything
pub struct TranscriptLogger {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl TranscriptLogger {
    pub fn disabled() -> Self {
        Self {
            writer: None,
            path: None,
        }
    }

    /// Start a transcript in the default directory
    ///
    /// Failure to open the file is logged and leaves the logger disabled.
    pub fn enabled() -> Self {
        Self::open_in(&Self::conversations_dir()).unwrap_or_else(|e| {
            error!("Failed to start conversation transcript: {}", e);
            Self::disabled()
        })
    }

    /// Start a transcript file in `dir`
    pub fn open_in(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let filename = format!("conversation-{}.jsonl", Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f"));
        let path = dir.join(filename);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Started conversation transcript at: {}", path.display());

        let mut logger = Self {
            writer: Some(BufWriter::new(file)),
            path: Some(path),
        };
        logger.record(TranscriptEvent::SessionStart);
        Ok(logger)
    }

    fn conversations_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tripguide")
            .join("conversations")
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log_message(&mut self, message: &Message) {
        if message.is_placeholder() {
            return;
        }
        self.record(TranscriptEvent::Message {
            id: message.id.clone(),
            role: message.role,
            text: message.text.clone(),
        });
    }

    pub fn log_truncated(&mut self, after: &MessageId) {
        self.record(TranscriptEvent::Truncated { after: after.clone() });
    }

    pub fn log_reset(&mut self) {
        self.record(TranscriptEvent::Reset);
    }

    fn record(&mut self, event: TranscriptEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        let entry = TranscriptEntry {
            timestamp: Utc::now(),
            event,
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = writeln!(writer, "{}", json) {
                    warn!("Failed to write transcript entry: {}", e);
                }
                if let Err(e) = writer.flush() {
                    warn!("Failed to flush transcript: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize transcript entry: {}", e),
        }
    }
}

impl Drop for TranscriptLogger {
    fn drop(&mut self) {
        if self.writer.is_some() {
            self.record(TranscriptEvent::SessionEnd);
            if let Some(path) = &self.path {
                debug!("Conversation transcript saved to: {}", path.display());
            }
        }
    }
}
