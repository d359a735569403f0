use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::collaborators::DeviceIdentity;
use crate::error::DeviceIdError;

/// Device identity persisted as a UUID in a small text file.
#[derive(Debug, Clone)]
pub struct FileDeviceIdentity {
    path: PathBuf,
}

impl FileDeviceIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> DeviceIdError {
        DeviceIdError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl DeviceIdentity for FileDeviceIdentity {
    async fn device_id(&self) -> Result<String, DeviceIdError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(stored) if !stored.trim().is_empty() => return Ok(stored.trim().to_string()),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(self.io_error(err)),
        }

        let id = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.io_error(err))?;
        }
        tokio::fs::write(&self.path, &id)
            .await
            .map_err(|err| self.io_error(err))?;
        tracing::info!(path = %self.path.display(), "generated new device id");
        Ok(id)
    }
}
