//! Job Queries

use crate::domain::JobStatus;

/// 查询任务状态
#[derive(Debug, Clone)]
pub struct GetJobStatusQuery {
    pub job_id: String,
}

/// 获取任务结果音频
#[derive(Debug, Clone)]
pub struct GetJobResultQuery {
    pub job_id: String,
}

/// 按状态列出任务
#[derive(Debug, Clone)]
pub struct ListJobsQuery {
    pub status: JobStatus,
}
