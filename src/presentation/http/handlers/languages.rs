//! Language Handlers

use std::collections::BTreeMap;

use axum::{extract::State, Json};

use crate::shared::error::AppError;
use crate::startup::AppState;

/// `GET /supported_languages` - `{code: name}` as reported by the translation backend
pub async fn supported_languages(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let languages = state
        .translator
        .supported_languages()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(
        languages
            .into_iter()
            .map(|language| (language.code, language.name))
            .collect(),
    ))
}
