use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Language, SnapshotSummary},
    routes::AppState,
};

/// Rebuilds a language snapshot from its source and publishes it
pub async fn reload(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(language): Path<String>,
) -> AppResult<Json<SnapshotSummary>> {
    let language: Language = language.parse()?;

    tracing::info!(request_id = %request_id, language = %language, "Catalog reload requested");
    let snapshot = state.snapshots.reload(language).await?;

    Ok(Json(snapshot.summary()))
}
