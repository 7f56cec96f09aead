//! Conversation state and its durable single-slot store.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::api::ChatMessage;
use crate::core::constants::CONVERSATION_FILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn to_api(&self) -> ChatMessage {
        ChatMessage {
            role: self.role.as_str().to_string(),
            content: self.content.clone(),
        }
    }
}

/// One conversation: the message sequence replayed to the provider on
/// every turn, and the model pinned to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Pinned model id; absent means "select on next ask".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The exact sequence sent to the provider, in stored order.
    pub fn api_messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_api).collect()
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The conversation file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The conversation file exists but does not decode.
    /// `load_or_default` recovers this as an empty conversation.
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The conversation file could not be written or removed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Read { path, source } => {
                write!(f, "Failed to read conversation at {}: {source}", path.display())
            }
            StoreError::Corrupt { path, source } => {
                write!(
                    f,
                    "Failed to decode conversation at {}: {source}",
                    path.display()
                )
            }
            StoreError::Write { path, source } => {
                write!(
                    f,
                    "Failed to update conversation at {}: {source}",
                    path.display()
                )
            }
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Read { source, .. } => Some(source),
            StoreError::Corrupt { source, .. } => Some(source),
            StoreError::Write { source, .. } => Some(source),
        }
    }
}

/// Durable single-slot conversation storage.
///
/// The store exclusively owns the persisted state; the engine mutates a
/// working copy and commits it back only on success. Constructed from an
/// explicit path so a multi-slot layout stays a path-per-identifier change.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    path: PathBuf,
}

impl ConversationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store rooted at the platform data directory.
    pub fn default_location() -> Self {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "gratis")
            .expect("Failed to determine data directory");
        Self::new(proj_dirs.data_dir().join(CONVERSATION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted conversation, or an empty one when no state exists.
    pub fn load(&self) -> Result<Conversation, StoreError> {
        if !self.path.exists() {
            return Ok(Conversation::default());
        }
        let contents = fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Load, recovering a corrupt slot as an empty conversation. A corrupt
    /// local cache must never block the user.
    pub fn load_or_default(&self) -> Result<Conversation, StoreError> {
        match self.load() {
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "stored conversation unreadable, starting empty"
                );
                Ok(Conversation::default())
            }
            other => other,
        }
    }

    /// Atomically replace the persisted state. An interrupted save never
    /// leaves a truncated file behind.
    pub fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let contents =
            serde_json::to_vec_pretty(conversation).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source: source.into(),
            })?;

        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file.write_all(&contents).map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| StoreError::Write {
                path: self.path.clone(),
                source: err.error,
            })?;
        Ok(())
    }

    /// Delete the persisted state. A missing file is not an error.
    pub fn reset(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
