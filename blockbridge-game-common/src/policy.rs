use std::{
    collections::{BTreeSet, HashSet},
    io::Write,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to access player lists: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid player list file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to replace player list file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Who may join and who may run commands. Names compare case-insensitively.
pub trait PlayerPolicy: Send + Sync {
    fn is_banned(&self, name: &str) -> bool;
    fn is_kicked(&self, name: &str) -> bool;
    fn is_op(&self, name: &str) -> bool;

    fn ban(&mut self, name: &str) -> Result<(), PolicyError>;
    fn unban(&mut self, name: &str) -> Result<(), PolicyError>;
    fn kick(&mut self, name: &str);
    fn unkick(&mut self, name: &str);
    fn op(&mut self, name: &str) -> Result<(), PolicyError>;
    fn deop(&mut self, name: &str) -> Result<(), PolicyError>;

    /// Reason for refusing a login, if any.
    fn login_rejection(&self, name: &str) -> Option<&'static str> {
        if self.is_banned(name) {
            Some("You are banned from this server")
        } else if self.is_kicked(name) {
            Some("You have been kicked from this server")
        } else {
            None
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct PlayerListsFile {
    #[serde(default)]
    banned: BTreeSet<String>,
    #[serde(default)]
    ops: BTreeSet<String>,
}

/// Bans and ops are saved to a JSON file after every change; kicks only
/// last until the process exits.
#[derive(Default)]
pub struct PlayerLists {
    path: Option<PathBuf>,
    lists: PlayerListsFile,
    kicked: HashSet<String>,
}

fn normalise(name: &str) -> String {
    name.to_lowercase()
}

impl PlayerLists {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A missing file starts empty lists.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let lists = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        } else {
            PlayerListsFile::default()
        };
        info!(
            "loaded {} bans and {} ops from {}",
            lists.banned.len(),
            lists.ops.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            lists,
            kicked: HashSet::new(),
        })
    }

    pub fn banned(&self) -> impl Iterator<Item = &str> {
        self.lists.banned.iter().map(String::as_str)
    }

    pub fn ops(&self) -> impl Iterator<Item = &str> {
        self.lists.ops.iter().map(String::as_str)
    }

    fn save(&self) -> Result<(), PolicyError> {
        let path = match self.path.as_ref() {
            Some(path) => path,
            None => return Ok(()),
        };
        let directory = match path.parent() {
            Some(directory) if !directory.as_os_str().is_empty() => directory,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory)?;

        let json = serde_json::to_string_pretty(&self.lists)?;
        let mut file = tempfile::Builder::new().tempfile_in(directory)?;
        file.write_all(json.as_bytes())?;
        file.persist(path)?;
        Ok(())
    }
}

impl PlayerPolicy for PlayerLists {
    fn is_banned(&self, name: &str) -> bool {
        self.lists.banned.contains(&normalise(name))
    }

    fn is_kicked(&self, name: &str) -> bool {
        self.kicked.contains(&normalise(name))
    }

    fn is_op(&self, name: &str) -> bool {
        self.lists.ops.contains(&normalise(name))
    }

    fn ban(&mut self, name: &str) -> Result<(), PolicyError> {
        if self.lists.banned.insert(normalise(name)) {
            self.save()?;
        }
        Ok(())
    }

    fn unban(&mut self, name: &str) -> Result<(), PolicyError> {
        if self.lists.banned.remove(&normalise(name)) {
            self.save()?;
        }
        Ok(())
    }

    fn kick(&mut self, name: &str) {
        self.kicked.insert(normalise(name));
    }

    fn unkick(&mut self, name: &str) {
        self.kicked.remove(&normalise(name));
    }

    fn op(&mut self, name: &str) -> Result<(), PolicyError> {
        if self.lists.ops.insert(normalise(name)) {
            self.save()?;
        }
        Ok(())
    }

    fn deop(&mut self, name: &str) -> Result<(), PolicyError> {
        if self.lists.ops.remove(&normalise(name)) {
            self.save()?;
        }
        Ok(())
    }
}
