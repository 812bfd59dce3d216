use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{ChatMessage, Place, TimeBucket};
use crate::services::{
    recommendations::{self, NOT_FOUND_MESSAGE},
    AnswerSource, ChatSession, Recommendation,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub category: String,
    pub time_bucket: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub found: bool,
    pub message: Option<String>,
    pub places: Vec<Place>,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(recommendation: Recommendation) -> Self {
        match recommendation {
            Recommendation::Found(places) => Self {
                found: true,
                message: None,
                places,
            },
            Recommendation::NotFound => Self {
                found: false,
                message: Some(NOT_FOUND_MESSAGE.to_string()),
                places: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub source: AnswerSource,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceSearchRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub history: Vec<ChatMessage>,
    pub last_recommendations: Vec<Place>,
}

impl From<ChatSession> for SessionResponse {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id,
            history: session.history,
            last_recommendations: session.last_recommendations,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Distinct categories for the category selector
pub async fn get_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.dataset().await?.categories()))
}

/// Time bucket labels for the time selector
pub async fn get_time_buckets() -> Json<Vec<&'static str>> {
    Json(TimeBucket::ALL.iter().map(TimeBucket::label).collect())
}

/// Runs the filter without touching any session
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let bucket: TimeBucket = request.time_bucket.parse()?;
    let dataset = state.dataset().await?;
    let recommendation = recommendations::recommend(&dataset, &request.category, bucket);
    Ok(Json(recommendation.into()))
}

/// Starts a session with the welcome message
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.into()))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.into()))
}

/// Discards a session and everything it holds
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Answers a free-text message and records both turns
pub async fn post_message(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> AppResult<Json<MessageResponse>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("Message cannot be empty".to_string()));
    }

    // Fail fast on an unknown session before any API call
    state.sessions.get(id).await?;

    let answer = state.answerer.answer(text).await;

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        source = ?answer.source,
        "Message answered"
    );

    let history = state
        .sessions
        .update(id, |session| {
            session.push_exchange(text, answer.text.clone());
            session.history.clone()
        })
        .await?;

    Ok(Json(MessageResponse {
        reply: answer.text,
        source: answer.source,
        history,
    }))
}

/// Runs the filter and replaces the session's last recommendations
pub async fn recommend_for_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let bucket: TimeBucket = request.time_bucket.parse()?;
    let dataset = state.dataset().await?;
    let recommendation = recommendations::recommend(&dataset, &request.category, bucket);

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        category = %request.category,
        bucket = %bucket,
        found = recommendation.is_found(),
        "Recommendations drawn"
    );

    let places = recommendation.places().to_vec();
    state
        .sessions
        .update(id, |session| session.last_recommendations = places)
        .await?;

    Ok(Json(recommendation.into()))
}

/// Asks about one of the places recommended last in this session
pub async fn search_place(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<PlaceSearchRequest>,
) -> AppResult<Json<MessageResponse>> {
    let session = state.sessions.get(id).await?;
    if session.recommended(&request.name).is_none() {
        return Err(AppError::NotFound(format!(
            "{} is not among the last recommendations",
            request.name
        )));
    }

    let (question, answer) = state.answerer.answer_place_search(&request.name).await;

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        place = %request.name,
        source = ?answer.source,
        "Place search answered"
    );

    let history = state
        .sessions
        .update(id, |session| {
            session.push_exchange(question, answer.text.clone());
            session.history.clone()
        })
        .await?;

    Ok(Json(MessageResponse {
        reply: answer.text,
        source: answer.source,
        history,
    }))
}
