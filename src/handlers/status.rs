// handlers/status.rs - GET /api/v1/status

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn show(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let database = DatabaseManager::status(&state.pool).await?;

    Ok(Json(json!({
        "updated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "dependencies": {
            "database": database,
        },
    })))
}
