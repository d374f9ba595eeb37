//! Credential persistence between process runs.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::domain::credentials::Credential;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("session file {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// JSON file holding the last known [`Credential`].
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential. A missing file is an empty credential.
    pub async fn load(&self) -> Result<Credential, SessionError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored session");
                return Ok(Credential::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_slice(&bytes).map_err(|source| SessionError::Format {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist `credential`, readable by the owner only. An empty credential
    /// removes the file instead.
    pub async fn save(&self, credential: &Credential) -> Result<(), SessionError> {
        if credential.is_empty() {
            return self.remove().await;
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(credential).map_err(|source| {
            SessionError::Format {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json)
            .await
            .map_err(|source| self.io_error(source))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    pub async fn remove(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "session removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
