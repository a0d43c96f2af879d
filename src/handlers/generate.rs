//! Cover letter endpoint handler
//!
//! Handles POST /api/generate: validates the request, relays one prompt to
//! the upstream chat-completion API and returns the generated text.

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::metrics::Outcome;
use crate::middleware::RequestId;
use crate::prompt::CoverLetterBrief;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Body of a generation request, as sent by the client
///
/// Fields are kept as raw JSON so a number or boolean in any of them is
/// turned into text instead of failing the whole body. `null` means absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub resume_text: Option<Value>,
    #[serde(default)]
    pub vacancy_description: Option<Value>,
    #[serde(default)]
    pub tone: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub length: Option<Value>,
}

/// Whether a field counts as supplied: not empty, zero, false or null
fn is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text embedded in the prompt; strings verbatim, anything else as JSON
fn field_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl GenerationRequest {
    /// Check required fields and turn the request into a brief
    ///
    /// `resumeText` and `vacancyDescription` must be present and supplied.
    pub fn into_brief(self) -> AppResult<CoverLetterBrief> {
        let resume_text = self.resume_text.filter(is_supplied).map(field_text);
        let vacancy_description = self.vacancy_description.filter(is_supplied).map(field_text);

        match (resume_text, vacancy_description) {
            (Some(resume_text), Some(vacancy_description)) => Ok(CoverLetterBrief::new(
                resume_text,
                vacancy_description,
                self.tone.map(field_text),
                self.language.map(field_text),
                self.length.map(field_text),
            )),
            _ => Err(AppError::MissingFields),
        }
    }
}

/// Successful generation response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    cover_letter: String,
}

/// POST /api/generate handler
///
/// The upstream call is the only await point and is not bounded by a
/// timeout. Every outcome is counted in the generations metric.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> AppResult<Json<GenerationResponse>> {
    let result = generate(&state, request_id, body).await;

    let outcome = match &result {
        Ok(_) => Outcome::Success,
        Err(e) => Outcome::from(e),
    };
    state.metrics().record_outcome(outcome);

    result.map(Json)
}

/// Fallback for every verb other than POST on the generate route
pub async fn method_not_allowed(State(state): State<AppState>) -> AppError {
    state.metrics().record_outcome(Outcome::MethodNotAllowed);
    AppError::MethodNotAllowed
}

async fn generate(
    state: &AppState,
    request_id: RequestId,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> AppResult<GenerationResponse> {
    let Json(request) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!(
                request_id = %request_id,
                rejection = %rejection.body_text(),
                "Request body exceeds size limit"
            );
            return AppError::PayloadTooLarge;
        }
        // An unreadable body carries no fields at all
        tracing::debug!(
            request_id = %request_id,
            rejection = %rejection.body_text(),
            "Request body could not be parsed"
        );
        AppError::MissingFields
    })?;

    let brief = request.into_brief()?;

    let api_key = state.api_key();
    tracing::debug!(
        request_id = %request_id,
        api_key_present = api_key.is_some(),
        api_key_length = api_key.map_or(0, |k| k.len()),
        "Checked upstream credential"
    );
    let api_key = api_key.ok_or(AppError::MissingCredential)?;

    tracing::debug!(
        request_id = %request_id,
        resume_length = brief.resume_text().len(),
        vacancy_length = brief.vacancy_description().len(),
        tone = %brief.tone(),
        language = %brief.language(),
        length = %brief.length(),
        "Generating cover letter"
    );

    let started = Instant::now();
    let result = state.client().generate(api_key, &brief).await;
    let elapsed = started.elapsed();

    if let Err(e) = state
        .metrics()
        .record_upstream_duration(elapsed.as_secs_f64())
    {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to record upstream latency");
    }

    let cover_letter = result.map_err(|e| {
        tracing::warn!(
            request_id = %request_id,
            error = %e,
            elapsed_ms = elapsed.as_millis() as u64,
            "Cover letter generation failed"
        );
        AppError::from(e)
    })?;

    tracing::info!(
        request_id = %request_id,
        cover_letter_length = cover_letter.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Cover letter generated"
    );

    Ok(GenerationResponse { cover_letter })
}
