//! Job Command Handlers

use std::sync::Arc;

use super::request::resolve_request;
use crate::application::commands::job_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioStoragePort, JobQueuePort};
use crate::application::provider_registry::ProviderRegistry;
use crate::domain::Job;

/// SubmitJob Handler - 提交异步合成任务
///
/// 队列满时立即返回 `QueueFull`，不阻塞调用方
pub struct SubmitJobHandler {
    queue: Arc<dyn JobQueuePort>,
    providers: Arc<ProviderRegistry>,
    default_voice_id: String,
}

impl SubmitJobHandler {
    pub fn new(
        queue: Arc<dyn JobQueuePort>,
        providers: Arc<ProviderRegistry>,
        default_voice_id: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            providers,
            default_voice_id: default_voice_id.into(),
        }
    }

    pub fn handle(&self, cmd: SubmitJobCommand) -> Result<SubmitJobResponse, ApplicationError> {
        let resolved = resolve_request(
            &self.providers,
            &self.default_voice_id,
            &cmd.text,
            cmd.voice_id.as_deref(),
            cmd.provider.as_deref(),
            cmd.output_format.as_deref(),
            cmd.voice_settings,
        )?;

        let job = Job::new(
            cmd.text,
            resolved.voice_id,
            resolved.provider.name(),
            resolved.format,
            resolved.settings,
        )?;

        let response = SubmitJobResponse {
            job_id: job.id().to_string(),
            status: job.status(),
            created_at: job.created_at(),
        };
        let text_length = job.text_len();

        self.queue.try_enqueue(job).map_err(|e| {
            tracing::warn!(error = %e, "Failed to enqueue job");
            ApplicationError::from(e)
        })?;

        tracing::info!(
            job_id = %response.job_id,
            provider = %resolved.provider.name(),
            text_length = text_length,
            "Job created"
        );

        Ok(response)
    }
}

/// DeleteJob Handler - 删除任务记录与已存储音频
///
/// 不存在的任务视为已删除
pub struct DeleteJobHandler {
    queue: Arc<dyn JobQueuePort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl DeleteJobHandler {
    pub fn new(queue: Arc<dyn JobQueuePort>, storage: Arc<dyn AudioStoragePort>) -> Self {
        Self { queue, storage }
    }

    pub async fn handle(&self, cmd: DeleteJobCommand) -> Result<(), ApplicationError> {
        self.queue.delete_job(&cmd.job_id);
        self.storage.delete(&cmd.job_id).await?;

        tracing::info!(job_id = %cmd.job_id, "Job deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::QueueError;
    use crate::domain::{AudioFormat, JobStatus, VoiceSettings};
    use crate::infrastructure::adapters::{
        FakeTtsProvider, FakeTtsProviderConfig, FileAudioStorage, DEFAULT_VOICE_ID,
    };
    use crate::infrastructure::memory::InMemoryJobQueue;

    fn registry() -> Arc<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();
        registry
            .register(Arc::new(FakeTtsProvider::with_defaults()))
            .register(Arc::new(FakeTtsProvider::new(FakeTtsProviderConfig {
                name: "backup".to_string(),
                ..Default::default()
            })));
        Arc::new(registry)
    }

    fn submit_handler(queue: Arc<InMemoryJobQueue>) -> SubmitJobHandler {
        SubmitJobHandler::new(queue, registry(), DEFAULT_VOICE_ID)
    }

    fn command(text: &str) -> SubmitJobCommand {
        SubmitJobCommand {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_applies_defaults() {
        let queue = Arc::new(InMemoryJobQueue::new(10));
        let handler = submit_handler(queue.clone());

        let response = handler.handle(command("Hello")).unwrap();
        assert_eq!(response.status, JobStatus::Queued);

        // 提交后立即可查询
        let job = queue.get_job(&response.job_id).unwrap();
        assert_eq!(job.provider_name(), "fake");
        assert_eq!(job.voice_id(), DEFAULT_VOICE_ID);
        assert_eq!(job.output_format(), AudioFormat::Mp3);
        assert_eq!(job.created_at(), response.created_at);
    }

    #[test]
    fn test_submit_explicit_options() {
        let queue = Arc::new(InMemoryJobQueue::new(10));
        let handler = submit_handler(queue.clone());

        let response = handler
            .handle(SubmitJobCommand {
                text: "Hello".to_string(),
                voice_id: Some("custom".to_string()),
                provider: Some("backup".to_string()),
                output_format: Some("WAV".to_string()),
                voice_settings: Some(VoiceSettings {
                    stability: Some(0.4),
                    ..Default::default()
                }),
            })
            .unwrap();

        let job = queue.get_job(&response.job_id).unwrap();
        assert_eq!(job.provider_name(), "backup");
        assert_eq!(job.voice_id(), "custom");
        assert_eq!(job.output_format(), AudioFormat::Wav);
        assert_eq!(job.voice_settings().unwrap().stability, Some(0.4));
    }

    #[test]
    fn test_submit_validation_errors() {
        let queue = Arc::new(InMemoryJobQueue::new(10));
        let handler = submit_handler(queue.clone());

        assert!(matches!(
            handler.handle(command("   ")),
            Err(ApplicationError::ValidationError(_))
        ));

        let mut cmd = command("Hello");
        cmd.output_format = Some("ogg".to_string());
        assert!(matches!(
            handler.handle(cmd),
            Err(ApplicationError::InvalidFormat(_))
        ));

        let mut cmd = command("Hello");
        cmd.provider = Some("unknown".to_string());
        assert!(matches!(
            handler.handle(cmd),
            Err(ApplicationError::ValidationError(_))
        ));

        let mut cmd = command("Hello");
        cmd.voice_settings = Some(VoiceSettings {
            stability: Some(1.5),
            ..Default::default()
        });
        assert!(matches!(
            handler.handle(cmd),
            Err(ApplicationError::ValidationError(_))
        ));

        assert_eq!(queue.stats().total_jobs, 0);
    }

    #[test]
    fn test_submit_queue_full() {
        let queue = Arc::new(InMemoryJobQueue::new(1));
        let handler = submit_handler(queue.clone());

        handler.handle(command("first")).unwrap();
        assert!(matches!(
            handler.handle(command("second")),
            Err(ApplicationError::QueueFull)
        ));
        assert_eq!(queue.stats().total_jobs, 1);
    }

    #[test]
    fn test_submit_after_close() {
        let queue = Arc::new(InMemoryJobQueue::new(1));
        queue.close();
        let handler = submit_handler(queue);

        assert!(matches!(
            handler.handle(command("late")),
            Err(ApplicationError::ShuttingDown)
        ));
    }

    #[tokio::test]
    async fn test_delete_job_removes_record_and_audio() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileAudioStorage::new(temp_dir.path()).await.unwrap());
        let queue = Arc::new(InMemoryJobQueue::new(10));

        let response = submit_handler(queue.clone()).handle(command("Hello")).unwrap();
        storage
            .store(&response.job_id, b"audio", AudioFormat::Mp3)
            .await
            .unwrap();

        let handler = DeleteJobHandler::new(queue.clone(), storage.clone());
        handler
            .handle(DeleteJobCommand {
                job_id: response.job_id.clone(),
            })
            .await
            .unwrap();

        assert_eq!(
            queue.get_job(&response.job_id),
            Err(QueueError::NotFound(response.job_id.clone()))
        );
        assert!(!storage.exists(&response.job_id).await);

        // 幂等
        handler
            .handle(DeleteJobCommand {
                job_id: response.job_id,
            })
            .await
            .unwrap();
    }
}
