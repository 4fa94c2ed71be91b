use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Fixed file name the operator token is mirrored under.
const TOKEN_FILE_NAME: &str = "admin_token";

/// Process-wide holder of the operator bearer credential.
///
/// The token lives in memory and is mirrored to a file so a login
/// survives process restarts. Persistence failures are logged and never
/// fail the operation; the in-memory value is authoritative for the
/// current process. Shared via `Arc` by the HTTP client and the auth
/// gate; access is read-many/write-rare.
#[derive(Debug)]
pub struct CredentialStore {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Store backed by a token file in the given directory, loading any
    /// token persisted by a previous run.
    pub fn with_dir(dir: PathBuf) -> Self {
        let path = dir.join(TOKEN_FILE_NAME);
        let token = match fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        };

        CredentialStore {
            token: RwLock::new(token),
            path: Some(path),
        }
    }

    /// Store backed by the platform data directory.
    pub fn open_default() -> Self {
        match dirs::data_dir() {
            Some(data_dir) => CredentialStore::with_dir(data_dir.join("ecocharge")),
            None => {
                tracing::warn!("No platform data directory, credential will not persist");
                CredentialStore::in_memory()
            }
        }
    }

    /// Store with no durable backing, for tests and ephemeral use.
    pub fn in_memory() -> Self {
        CredentialStore {
            token: RwLock::new(None),
            path: None,
        }
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().expect("credential lock poisoned").clone()
    }

    pub fn set(&self, token: String) {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if let Err(err) = fs::create_dir_all(parent) {
                    tracing::warn!("Could not create credential directory: {}", err);
                }
            }
            if let Err(err) = fs::write(path, &token) {
                tracing::warn!("Could not persist credential: {}", err);
            }
        }
        *self.token.write().expect("credential lock poisoned") = Some(token);
    }

    pub fn clear(&self) {
        if let Some(path) = &self.path {
            if path.exists() {
                if let Err(err) = fs::remove_file(path) {
                    tracing::warn!("Could not remove persisted credential: {}", err);
                }
            }
        }
        *self.token.write().expect("credential lock poisoned") = None;
    }
}
