//! In-Memory Job Queue Implementation
//!
//! 任务表使用 DashMap（按 id 分片加锁），分发路径是独立的有界 mpsc 通道，
//! 领取任务不会与无关任务的状态读取争用同一把锁。

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{JobQueuePort, QueueError, QueueStats};
use crate::domain::{Job, JobStatus};

/// 内存任务队列
pub struct InMemoryJobQueue {
    /// job_id -> Job
    jobs: DashMap<String, Job>,
    /// 分发通道发送端，关闭后置为 None
    sender: RwLock<Option<mpsc::Sender<String>>>,
    /// 分发通道接收端，同一时刻只有一个领取者在等待
    receiver: Mutex<mpsc::Receiver<String>>,
    /// 关闭信号，用于唤醒等待空位的提交方
    closed: CancellationToken,
    capacity: usize,
}

impl InMemoryJobQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            jobs: DashMap::new(),
            sender: RwLock::new(Some(tx)),
            receiver: Mutex::new(rx),
            closed: CancellationToken::new(),
            capacity,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 分发队列容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn sender(&self) -> Result<mpsc::Sender<String>, QueueError> {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(QueueError::Closed)
    }

    fn register(&self, job: Job) -> Result<Registration<'_>, QueueError> {
        let job_id = job.id().to_string();
        match self.jobs.entry(job_id.clone()) {
            Entry::Occupied(_) => Err(QueueError::AlreadyExists(job_id)),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(Registration {
                    jobs: &self.jobs,
                    job_id,
                    committed: false,
                })
            }
        }
    }
}

/// 已登记但尚未进入分发通道的任务
///
/// 未 commit 即被丢弃时撤销登记，保证不会留下永远处于 queued 的记录
struct Registration<'a> {
    jobs: &'a DashMap<String, Job>,
    job_id: String,
    committed: bool,
}

impl Registration<'_> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.jobs.remove(&self.job_id);
            tracing::debug!(job_id = %self.job_id, "Job admission rolled back");
        }
    }
}

#[async_trait]
impl JobQueuePort for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        let sender = self.sender()?;
        let registration = self.register(job)?;
        let job_id = registration.job_id.clone();

        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(QueueError::Closed),
            result = sender.send(job_id) => match result {
                Ok(()) => {
                    tracing::debug!(job_id = %registration.job_id, "Job enqueued");
                    registration.commit();
                    Ok(())
                }
                Err(_) => Err(QueueError::Closed),
            },
        }
    }

    fn try_enqueue(&self, job: Job) -> Result<(), QueueError> {
        let sender = self.sender()?;
        let registration = self.register(job)?;

        match sender.try_send(registration.job_id.clone()) {
            Ok(()) => {
                tracing::debug!(job_id = %registration.job_id, "Job enqueued");
                registration.commit();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    job_id = %registration.job_id,
                    capacity = self.capacity,
                    "Job queue full, rejecting job"
                );
                Err(QueueError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    async fn dequeue(&self) -> Option<Job> {
        let mut receiver = self.receiver.lock().await;

        loop {
            let job_id = receiver.recv().await?;

            match self.jobs.get(&job_id).map(|job| job.clone()) {
                Some(job) if job.status() == JobStatus::Queued => return Some(job),
                Some(job) => {
                    tracing::warn!(
                        job_id = %job_id,
                        status = %job.status(),
                        "Dequeued job is no longer queued, skipping"
                    );
                }
                None => {
                    tracing::debug!(job_id = %job_id, "Job deleted before claim, skipping");
                }
            }
        }
    }

    fn get_job(&self, job_id: &str) -> Result<Job, QueueError> {
        self.jobs
            .get(job_id)
            .map(|job| job.clone())
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))
    }

    fn update_job(&self, job: &Job) -> Result<(), QueueError> {
        let mut stored = self
            .jobs
            .get_mut(job.id())
            .ok_or_else(|| QueueError::NotFound(job.id().to_string()))?;

        let (from, to) = (stored.status(), job.status());
        if !from.can_transition_to(to) {
            return Err(QueueError::InvalidStateTransition {
                job_id: job.id().to_string(),
                from,
                to,
            });
        }
        if from == to && job.progress() < stored.progress() {
            return Err(QueueError::ProgressRegression {
                job_id: job.id().to_string(),
                current: stored.progress(),
                requested: job.progress(),
            });
        }

        *stored = job.clone();

        tracing::debug!(
            job_id = %job.id(),
            old_status = %from,
            new_status = %to,
            progress = job.progress(),
            "Job updated"
        );
        Ok(())
    }

    fn list_jobs(&self, status: JobStatus) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|entry| entry.status() == status)
            .map(|entry| entry.value().clone())
            .collect();
        jobs.sort_by_key(|job| job.created_at());
        jobs
    }

    fn delete_job(&self, job_id: &str) {
        if self.jobs.remove(job_id).is_some() {
            tracing::debug!(job_id = %job_id, "Job deleted");
        }
    }

    fn close(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closed.cancel();
        if sender.is_some() {
            tracing::info!("Job queue closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn stats(&self) -> QueueStats {
        let mut stats = QueueStats::default();
        for entry in self.jobs.iter() {
            stats.record(entry.status());
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioFormat;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn new_job(text: &str) -> Job {
        Job::new(text, "voice", "provider", AudioFormat::Mp3, None).unwrap()
    }

    #[tokio::test]
    async fn test_enqueue_and_get() {
        let queue = InMemoryJobQueue::new(10);
        let job = new_job("test");
        let job_id = job.id().to_string();

        queue.enqueue(job).await.unwrap();

        let stored = queue.get_job(&job_id).unwrap();
        assert_eq!(stored.id(), job_id);
        assert_eq!(stored.status(), JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_enqueue_duplicate_id() {
        let queue = InMemoryJobQueue::new(10);
        let job = new_job("test");
        queue.enqueue(job.clone()).await.unwrap();

        assert_eq!(
            queue.try_enqueue(job.clone()),
            Err(QueueError::AlreadyExists(job.id().to_string()))
        );
    }

    #[tokio::test]
    async fn test_enqueue_closed_queue() {
        let queue = InMemoryJobQueue::new(10);
        queue.close();

        let job = new_job("test");
        let job_id = job.id().to_string();
        assert_eq!(queue.enqueue(job).await, Err(QueueError::Closed));
        assert_eq!(queue.try_enqueue(new_job("other")), Err(QueueError::Closed));
        assert!(queue.get_job(&job_id).is_err());
    }

    #[tokio::test]
    async fn test_try_enqueue_full_queue() {
        let queue = InMemoryJobQueue::new(1);
        queue.try_enqueue(new_job("first")).unwrap();

        let job = new_job("second");
        let job_id = job.id().to_string();
        let err = queue.try_enqueue(job).unwrap_err();
        assert_eq!(err, QueueError::Full);
        assert!(err.is_retriable());

        // 被拒绝的任务不会留在注册表中
        assert_eq!(queue.get_job(&job_id), Err(QueueError::NotFound(job_id)));
        assert_eq!(queue.stats().queued_jobs, 1);
    }

    #[tokio::test]
    async fn test_enqueue_cancelled_while_waiting_rolls_back() {
        let queue = InMemoryJobQueue::new(1);
        queue.enqueue(new_job("first")).await.unwrap();

        let job = new_job("second");
        let job_id = job.id().to_string();
        let result = tokio::time::timeout(Duration::from_millis(20), queue.enqueue(job)).await;
        assert!(result.is_err(), "enqueue should block on a full queue");

        assert!(queue.get_job(&job_id).is_err());
        assert_eq!(queue.stats().total_jobs, 1);
    }

    #[tokio::test]
    async fn test_enqueue_waits_for_capacity() {
        let queue = Arc::new(InMemoryJobQueue::new(1));
        queue.enqueue(new_job("first")).await.unwrap();

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(new_job("second")).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = queue.dequeue().await.unwrap();
        assert_eq!(first.text(), "first");

        producer.await.unwrap().unwrap();
        let second = queue.dequeue().await.unwrap();
        assert_eq!(second.text(), "second");
    }

    #[tokio::test]
    async fn test_close_unblocks_waiting_producer() {
        let queue = Arc::new(InMemoryJobQueue::new(1));
        queue.enqueue(new_job("first")).await.unwrap();

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.enqueue(new_job("second")).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();

        assert_eq!(producer.await.unwrap(), Err(QueueError::Closed));
        assert_eq!(queue.stats().total_jobs, 1);
    }

    #[tokio::test]
    async fn test_dequeue() {
        let queue = InMemoryJobQueue::new(10);
        let job = new_job("test");
        let job_id = job.id().to_string();
        queue.enqueue(job).await.unwrap();

        let dequeued = queue.dequeue().await.unwrap();
        assert_eq!(dequeued.id(), job_id);
    }

    #[tokio::test]
    async fn test_dequeue_fifo_order() {
        let queue = InMemoryJobQueue::new(10);
        for i in 0..5 {
            queue.enqueue(new_job(&format!("job {}", i))).await.unwrap();
        }

        for i in 0..5 {
            let job = queue.dequeue().await.unwrap();
            assert_eq!(job.text(), format!("job {}", i));
        }
    }

    #[tokio::test]
    async fn test_dequeue_closed_queue() {
        let queue = InMemoryJobQueue::new(10);
        queue.close();
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_dequeue_drains_before_reporting_closed() {
        let queue = InMemoryJobQueue::new(10);
        queue.enqueue(new_job("pending")).await.unwrap();
        queue.close();

        assert_eq!(queue.dequeue().await.unwrap().text(), "pending");
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_dequeue_blocks_until_cancelled() {
        let queue = InMemoryJobQueue::new(10);
        let result = tokio::time::timeout(Duration::from_millis(10), queue.dequeue()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dequeue_skips_deleted_job() {
        let queue = InMemoryJobQueue::new(10);
        let deleted = new_job("deleted");
        let deleted_id = deleted.id().to_string();
        queue.enqueue(deleted).await.unwrap();
        queue.enqueue(new_job("kept")).await.unwrap();

        queue.delete_job(&deleted_id);

        assert_eq!(queue.dequeue().await.unwrap().text(), "kept");
    }

    #[tokio::test]
    async fn test_concurrent_claims_single_job() {
        let queue = Arc::new(InMemoryJobQueue::new(10));

        let claimers: Vec<_> = (0..2)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.dequeue().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let job = new_job("only one");
        let job_id = job.id().to_string();
        queue.enqueue(job).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();

        let mut results = Vec::new();
        for claimer in claimers {
            results.push(claimer.await.unwrap());
        }
        let claimed: Vec<_> = results.iter().flatten().collect();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].id(), job_id);
        assert_eq!(results.iter().filter(|r| r.is_none()).count(), 1);
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let queue = InMemoryJobQueue::new(10);
        assert_eq!(
            queue.get_job("non-existent-id"),
            Err(QueueError::NotFound("non-existent-id".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_job() {
        let queue = InMemoryJobQueue::new(10);
        let mut job = new_job("test");
        queue.enqueue(job.clone()).await.unwrap();

        job.start_processing().unwrap();
        queue.update_job(&job).unwrap();

        let updated = queue.get_job(job.id()).unwrap();
        assert_eq!(updated.status(), JobStatus::Processing);
        assert!(updated.started_at().is_some());
    }

    #[tokio::test]
    async fn test_update_job_not_found() {
        let queue = InMemoryJobQueue::new(10);
        let job = new_job("test");
        assert_eq!(
            queue.update_job(&job),
            Err(QueueError::NotFound(job.id().to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_job_rejects_regression() {
        let queue = InMemoryJobQueue::new(10);
        let queued = new_job("test");
        queue.enqueue(queued.clone()).await.unwrap();

        let mut job = queued.clone();
        job.start_processing().unwrap();
        job.update_progress(30, None).unwrap();
        queue.update_job(&job).unwrap();

        // 回退到 queued
        assert!(matches!(
            queue.update_job(&queued),
            Err(QueueError::InvalidStateTransition { .. })
        ));

        // 进度回退
        let mut stale = queued.clone();
        stale.start_processing().unwrap();
        stale.update_progress(10, None).unwrap();
        assert!(matches!(
            queue.update_job(&stale),
            Err(QueueError::ProgressRegression {
                current: 30,
                requested: 10,
                ..
            })
        ));

        // 终态不可逆
        job.fail("boom").unwrap();
        queue.update_job(&job).unwrap();
        let mut completed = queued.clone();
        completed.start_processing().unwrap();
        completed.complete("/path", ChronoDuration::hours(24)).unwrap();
        assert!(queue.update_job(&completed).is_err());
        assert_eq!(queue.get_job(job.id()).unwrap().status(), JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let queue = InMemoryJobQueue::new(10);
        let job1 = new_job("test1");
        let mut job2 = new_job("test2");
        let mut job3 = new_job("test3");

        for job in [&job1, &job2, &job3] {
            queue.enqueue(job.clone()).await.unwrap();
        }

        job2.start_processing().unwrap();
        queue.update_job(&job2).unwrap();

        job3.start_processing().unwrap();
        job3.complete("/path/to/result", ChronoDuration::hours(24))
            .unwrap();
        queue.update_job(&job3).unwrap();

        let queued = queue.list_jobs(JobStatus::Queued);
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].id(), job1.id());
        assert_eq!(queue.list_jobs(JobStatus::Processing).len(), 1);
        assert_eq!(queue.list_jobs(JobStatus::Completed).len(), 1);
        assert!(queue.list_jobs(JobStatus::Failed).is_empty());
    }

    #[tokio::test]
    async fn test_delete_job_is_idempotent() {
        let queue = InMemoryJobQueue::new(10);
        let job = new_job("test");
        let job_id = job.id().to_string();
        queue.enqueue(job).await.unwrap();

        queue.delete_job(&job_id);
        queue.delete_job(&job_id);
        assert!(queue.get_job(&job_id).is_err());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let queue = InMemoryJobQueue::new(10);
        assert!(!queue.is_closed());
        queue.close();
        queue.close();
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_stats() {
        let queue = InMemoryJobQueue::new(10);
        let jobs: Vec<Job> = (1..=4).map(|i| new_job(&format!("test{}", i))).collect();
        for job in &jobs {
            queue.enqueue(job.clone()).await.unwrap();
        }

        let mut processing = jobs[1].clone();
        processing.start_processing().unwrap();
        queue.update_job(&processing).unwrap();

        let mut completed = jobs[2].clone();
        completed.start_processing().unwrap();
        completed.complete("/path", ChronoDuration::hours(24)).unwrap();
        queue.update_job(&completed).unwrap();

        let mut failed = jobs[3].clone();
        failed.fail("error").unwrap();
        queue.update_job(&failed).unwrap();

        assert_eq!(
            queue.stats(),
            QueueStats {
                total_jobs: 4,
                queued_jobs: 1,
                processing_jobs: 1,
                completed_jobs: 1,
                failed_jobs: 1,
            }
        );
    }
}
