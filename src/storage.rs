//! 凭证存储
//! 持久化保存 bearer token，收到 401 时清除

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// token 在持久化文件中的键名
pub const TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<Secret<String>>;
    fn save(&self, token: Secret<String>) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// 进程内 token 存储
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<Secret<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(Secret::new(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<Secret<String>> {
        self.token
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| Secret::new(t.expose_secret().clone())))
    }

    fn save(&self, token: Secret<String>) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ClientError::Config("token store poisoned".to_string()))?;
        *guard = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ClientError::Config("token store poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: Option<String>,
}

/// 文件 token 存储，内容为 `{"token": "..."}`
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, token: Option<String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ClientError::Config(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let body = serde_json::to_string(&TokenFile { token })?;
        write_private(&self.path, body.as_bytes()).map_err(|e| {
            ClientError::Config(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// token 文件仅允许当前用户读写
#[cfg(unix)]
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode 只在新建时生效，已有文件需要单独收紧
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(body)
}

#[cfg(not(unix))]
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, body)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<Secret<String>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let file: TokenFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring malformed token file");
                return None;
            }
        };

        file.token
            .filter(|t| !t.trim().is_empty())
            .map(Secret::new)
    }

    fn save(&self, token: Secret<String>) -> Result<(), ClientError> {
        self.write(Some(token.expose_secret().clone()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.write(None)
    }
}
