//! Job Handlers - 异步合成任务

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};
use http::header;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{
    DeleteJobCommand, GetJobResultQuery, GetJobStatusQuery, ListJobsQuery, SubmitJobCommand,
};
use crate::domain::JobStatus;
use crate::infrastructure::http::dto::{
    CreateJobRequest, CreateJobResponse, JobListResponse, JobStatusResponse, ListJobsParams,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 提交任务，立即返回 201
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateJobResponse>), ApiError> {
    let Json(req) = payload?;
    let created = state
        .submit_job_handler
        .handle(SubmitJobCommand::from(req))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListJobsParams>, QueryRejection>,
) -> Result<Json<JobListResponse>, ApiError> {
    let Query(params) = params?;
    let status = params
        .status
        .ok_or_else(|| ApiError::validation("Query parameter 'status' is required"))?
        .parse::<JobStatus>()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let jobs = state.list_jobs_handler.handle(ListJobsQuery { status });
    Ok(Json(JobListResponse::from_jobs(&jobs)))
}

pub async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state
        .get_job_status_handler
        .handle(GetJobStatusQuery { job_id })?;

    Ok(Json(JobStatusResponse::from(&job)))
}

/// 以流的方式返回结果音频
pub async fn get_job_result(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = state
        .get_job_result_handler
        .handle(GetJobResultQuery { job_id })
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", result.filename());
    let content_type = result.audio.content_type();
    let size_bytes = result.audio.size_bytes;
    let body = Body::from_stream(ReaderStream::new(result.audio.stream));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size_bytes)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build result response");
            ApiError::internal()
        })
}

/// 删除任务及其音频，任务不存在时同样返回 204
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .delete_job_handler
        .handle(DeleteJobCommand { job_id })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
