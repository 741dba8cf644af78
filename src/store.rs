//! Local persistence for the authentication session.
//!
//! The store is the terminal analog of browser-local storage: a small JSON
//! file holding the bearer token and user profile under fixed keys. Storage
//! is assumed to be available; when it is not, `save` becomes a no-op and the
//! caller proceeds optimistically with its in-memory session.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};

use crate::observability::{STORE_CLEAR_FAILURES, STORE_SAVE_FAILURES};
use crate::types::{Session, UserProfile};

/// On-disk layout of the session file.
#[derive(Serialize, Deserialize)]
struct SessionFile {
    version: u8,
    token: Option<String>,
    user: Option<serde_json::Value>,
}

impl SessionFile {
    fn new(session: &Session) -> Result<Self, serde_json::Error> {
        let user = match &session.user {
            Some(user) => Some(serde_json::to_value(user)?),
            None => None,
        };
        Ok(Self {
            version: 1,
            token: session.token.clone(),
            user,
        })
    }
}

/// Persists the session to a JSON file across process runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default per-user location.
    pub fn at_default_path() -> Self {
        Self::new(Self::default_path())
    }

    /// The default session file location under the user config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("caremind")
            .join("session.json")
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the session, overwriting any prior contents.
    ///
    /// Storage failure is not an error condition for callers: the write is
    /// skipped and counted, and the in-memory session stays authoritative.
    pub fn save(&self, session: &Session) {
        if self.try_save(session).is_err() {
            STORE_SAVE_FAILURES.click();
        }
    }

    fn try_save(&self, session: &Session) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        let contents = SessionFile::new(session).map_err(std::io::Error::other)?;
        to_writer_pretty(writer, &contents).map_err(std::io::Error::other)
    }

    /// Load the persisted session.
    ///
    /// A missing or unreadable file yields an empty session. An unparseable
    /// user profile yields a session with the token but no user.
    pub fn load(&self) -> Session {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(_) => return Session::empty(),
        };
        let reader = BufReader::new(file);
        let contents: SessionFile = match from_reader(reader) {
            Ok(contents) => contents,
            Err(_) => return Session::empty(),
        };
        let user = contents
            .user
            .and_then(|value| serde_json::from_value::<UserProfile>(value).ok());
        Session {
            token: contents.token,
            user,
        }
    }

    /// Remove the token and user unconditionally.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(_) => STORE_CLEAR_FAILURES.click(),
        }
    }
}
