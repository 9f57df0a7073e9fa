use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::conversation::Conversation;

const CONVERSATIONS_FILE: &str = "conversations.json";
const DARK_MODE_FILE: &str = "dark_mode.json";

/// Durable local storage: two independent JSON records under one directory.
///
/// The root is injected so tests can point it at a temp directory; the real
/// application uses [`Storage::default_dir`].
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn default_dir() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("could not determine config directory"))?;
        Ok(config_dir.join("causerie"))
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Load the persisted conversation list.
    ///
    /// `None` means "start fresh": the file is absent, or it exists but does
    /// not parse. A corrupt file is logged and treated as absent rather than
    /// crashing without an active conversation.
    pub fn load_conversations(&self) -> Option<Vec<Conversation>> {
        let path = self.root.join(CONVERSATIONS_FILE);
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("could not read {}: {}", path.display(), err);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(conversations) => Some(conversations),
            Err(err) => {
                log::warn!(
                    "corrupt conversation store at {}, resetting: {}",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    pub fn save_conversations(&self, conversations: &[Conversation]) -> Result<()> {
        let content = serde_json::to_string_pretty(conversations)?;
        self.write(CONVERSATIONS_FILE, &content)
    }

    pub fn load_dark_mode(&self) -> Option<bool> {
        let path = self.root.join(DARK_MODE_FILE);
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save_dark_mode(&self, dark_mode: bool) -> Result<()> {
        self.write(DARK_MODE_FILE, &serde_json::to_string(&dark_mode)?)
    }

    fn write(&self, file: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;
        let path = self.root.join(file);
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
