//! OpenAPI Document

use axum::Json;
use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/Error" } }
        }
    })
}

fn job_id_param() -> Value {
    json!({
        "name": "job_id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn audio_content() -> Value {
    json!({
        "audio/mpeg": { "schema": { "type": "string", "format": "binary" } },
        "audio/wav": { "schema": { "type": "string", "format": "binary" } }
    })
}

fn synthesis_request() -> Value {
    json!({
        "type": "object",
        "required": ["text"],
        "properties": {
            "text": { "type": "string" },
            "voice_id": { "type": "string" },
            "provider": { "type": "string" },
            "output_format": { "type": "string", "enum": ["mp3", "wav"], "default": "mp3" },
            "voice_settings": { "$ref": "#/components/schemas/VoiceSettings" }
        }
    })
}

fn voices_path() -> Value {
    json!({
        "get": {
            "summary": "List voices of a provider",
            "parameters": [{
                "name": "provider",
                "in": "query",
                "required": false,
                "schema": { "type": "string" }
            }],
            "responses": {
                "200": { "description": "Voice list" },
                "422": error_response("Unknown provider")
            }
        }
    })
}

fn tts_path() -> Value {
    json!({
        "post": {
            "summary": "Synthesize short text synchronously",
            "requestBody": {
                "required": true,
                "content": { "application/json": { "schema": synthesis_request() } }
            },
            "responses": {
                "200": { "description": "Audio", "content": audio_content() },
                "413": error_response("Text too long"),
                "422": error_response("Validation error"),
                "503": error_response("Provider unavailable")
            }
        }
    })
}

fn jobs_path() -> Value {
    let submit = json!({
        "summary": "Submit an asynchronous synthesis job",
        "requestBody": {
            "required": true,
            "content": { "application/json": { "schema": synthesis_request() } }
        },
        "responses": {
            "201": { "description": "Job accepted" },
            "422": error_response("Validation error"),
            "503": error_response("Queue full")
        }
    });
    let list = json!({
        "summary": "List jobs by status",
        "parameters": [{
            "name": "status",
            "in": "query",
            "required": true,
            "schema": {
                "type": "string",
                "enum": ["queued", "processing", "completed", "failed"]
            }
        }],
        "responses": {
            "200": { "description": "Job list" },
            "422": error_response("Missing or invalid status")
        }
    });

    json!({ "post": submit, "get": list })
}

fn job_path() -> Value {
    let status = json!({
        "summary": "Job status",
        "parameters": [job_id_param()],
        "responses": {
            "200": { "description": "Job status" },
            "404": error_response("Job not found")
        }
    });
    let delete = json!({
        "summary": "Delete a job and its audio",
        "parameters": [job_id_param()],
        "responses": { "204": { "description": "Deleted" } }
    });

    json!({ "get": status, "delete": delete })
}

fn job_result_path() -> Value {
    json!({
        "get": {
            "summary": "Download the synthesized audio",
            "parameters": [job_id_param()],
            "responses": {
                "200": { "description": "Audio", "content": audio_content() },
                "404": error_response("Job not found"),
                "410": error_response("Result expired"),
                "425": error_response("Job not complete")
            }
        }
    })
}

fn schemas() -> Value {
    let voice_settings = json!({
        "type": "object",
        "properties": {
            "stability": { "type": "number", "minimum": 0, "maximum": 1 },
            "similarity_boost": { "type": "number", "minimum": 0, "maximum": 1 },
            "style": { "type": "number", "minimum": 0, "maximum": 1 },
            "speed": { "type": "number", "minimum": 0.5, "maximum": 2 },
            "use_speaker_boost": { "type": "boolean" }
        }
    });
    let error = json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "object" }
                }
            }
        }
    });

    json!({ "VoiceSettings": voice_settings, "Error": error })
}

/// 生成 OpenAPI 3 文档
pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Vocalis TTS API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Text-to-speech with synchronous synthesis and asynchronous jobs"
        },
        "paths": {
            "/api/v1/health": {
                "get": {
                    "summary": "Service and provider health",
                    "responses": { "200": { "description": "Health report" } }
                }
            },
            "/api/v1/providers": {
                "get": {
                    "summary": "List registered TTS providers",
                    "responses": { "200": { "description": "Provider list" } }
                }
            },
            "/api/v1/voices": voices_path(),
            "/api/v1/tts": tts_path(),
            "/api/v1/jobs": jobs_path(),
            "/api/v1/jobs/{job_id}": job_path(),
            "/api/v1/jobs/{job_id}/result": job_result_path()
        },
        "components": { "schemas": schemas() }
    })
}

pub async fn openapi_json() -> Json<Value> {
    Json(openapi_document())
}
