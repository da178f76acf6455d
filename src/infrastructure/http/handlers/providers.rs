//! Provider Handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::application::{ListProvidersQuery, ListVoicesQuery, ProviderList, VoiceList};
use crate::infrastructure::http::dto::ListVoicesParams;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProviderList> {
    Json(state.list_providers_handler.handle(ListProvidersQuery).await)
}

pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListVoicesParams>, QueryRejection>,
) -> Result<Json<VoiceList>, ApiError> {
    let Query(params) = params?;
    let query = ListVoicesQuery {
        provider: params.provider,
    };

    let voices = state.list_voices_handler.handle(query).await?;
    Ok(Json(voices))
}
