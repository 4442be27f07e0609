use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::PageQuery;
use crate::storage::{Filter, ReadStore};

fn filter(params: &PageQuery) -> Result<Filter, (StatusCode, String)> {
    params
        .to_filter()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Невалидный search: {}", e)))
}

pub async fn list_scalar_readings(
    State(store): State<Arc<dyn ReadStore>>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let filter = filter(&params)?;
    let data = store
        .scalars(&filter)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "data": data })))
}

pub async fn list_disk_readings(
    State(store): State<Arc<dyn ReadStore>>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let filter = filter(&params)?;
    let data = store
        .disks(&filter)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({ "data": data })))
}
