//! File Storage - 文件系统音频存储实现
//!
//! 每个任务的音频保存为 `<base_dir>/<job_id>.<ext>`，文件修改时间即存储时间

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::sync::RwLock;

use crate::application::ports::{AudioStorageError, AudioStoragePort, StoredAudio};
use crate::domain::AudioFormat;

/// 文件系统音频存储
pub struct FileAudioStorage {
    /// 存储根目录
    base_dir: PathBuf,
    /// 写入/删除/清理互斥，读取共享
    lock: RwLock<()>,
}

impl FileAudioStorage {
    /// 创建新的文件存储（目录不存在时创建）
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir).await?;

        tracing::info!(path = %base_dir.display(), "File audio storage initialized");

        Ok(Self {
            base_dir,
            lock: RwLock::new(()),
        })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 音频文件路径；job_id 含路径分隔符时返回 None
    fn audio_path(&self, job_id: &str, format: AudioFormat) -> Option<PathBuf> {
        if job_id.is_empty() || job_id.contains(['/', '\\']) || job_id.contains("..") {
            return None;
        }
        Some(
            self.base_dir
                .join(format!("{}.{}", job_id, format.extension())),
        )
    }

    /// 按 mp3、wav 顺序查找已存在的文件
    async fn find_existing(&self, job_id: &str) -> Option<(PathBuf, AudioFormat)> {
        for format in AudioFormat::ALL {
            let Some(path) = self.audio_path(job_id, format) else {
                return None;
            };
            if fs::try_exists(&path).await.unwrap_or(false) {
                return Some((path, format));
            }
        }
        None
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    async fn store(
        &self,
        job_id: &str,
        data: &[u8],
        format: AudioFormat,
    ) -> Result<String, AudioStorageError> {
        let path = self
            .audio_path(job_id, format)
            .ok_or_else(|| AudioStorageError::IoError(format!("Invalid job id: {}", job_id)))?;
        let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));

        let _guard = self.lock.write().await;

        // 先写临时文件再重命名，读取方不会看到写了一半的文件
        fs::write(&tmp_path, data).await?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::debug!(
            job_id = %job_id,
            path = %path.display(),
            size = data.len(),
            "Audio stored"
        );

        Ok(path.to_string_lossy().into_owned())
    }

    async fn retrieve(&self, job_id: &str) -> Result<StoredAudio, AudioStorageError> {
        let _guard = self.lock.read().await;

        let (path, format) = self
            .find_existing(job_id)
            .await
            .ok_or_else(|| AudioStorageError::NotFound(job_id.to_string()))?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AudioStorageError::NotFound(job_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let size_bytes = file.metadata().await?.len();

        Ok(StoredAudio {
            stream: Box::pin(file),
            format,
            size_bytes,
        })
    }

    async fn delete(&self, job_id: &str) -> Result<(), AudioStorageError> {
        let _guard = self.lock.write().await;

        for format in AudioFormat::ALL {
            let Some(path) = self.audio_path(job_id, format) else {
                return Ok(());
            };
            match fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::debug!(job_id = %job_id, path = %path.display(), "Audio deleted");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    async fn exists(&self, job_id: &str) -> bool {
        let _guard = self.lock.read().await;
        self.find_existing(job_id).await.is_some()
    }

    async fn location(&self, job_id: &str) -> Option<String> {
        let _guard = self.lock.read().await;
        self.find_existing(job_id)
            .await
            .map(|(path, _)| path.to_string_lossy().into_owned())
    }

    async fn sweep_expired(&self, retention: Duration) -> Result<usize, AudioStorageError> {
        let _guard = self.lock.write().await;

        let Some(cutoff) = SystemTime::now().checked_sub(retention) else {
            return Ok(0);
        };

        let mut deleted = 0usize;
        let mut entries = fs::read_dir(&self.base_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };

            if modified < cutoff {
                let path = entry.path();
                match fs::remove_file(&path).await {
                    Ok(()) => {
                        deleted += 1;
                        tracing::debug!(path = %path.display(), "Deleted expired audio file");
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to delete expired audio file"
                        );
                    }
                }
            }
        }

        if deleted > 0 {
            tracing::info!(
                deleted = deleted,
                retention_secs = retention.as_secs(),
                "Expired audio sweep completed"
            );
        }

        Ok(deleted)
    }
}
