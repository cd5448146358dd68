//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::analysis;
use crate::domain::PageContent;
use crate::grader;
use crate::protocol::*;
use crate::router::{RouterResponse, TaskKind};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(body), fields(title = %body.title, body_len = body.body.len()))]
pub async fn http_post_analyze(Json(body): Json<AnalyzeIn>) -> impl IntoResponse {
  let analysis = analysis::analyze(&body.body, &body.title);
  info!(target: "coachlens_backend", content_type = ?analysis.content_type, domain = ?analysis.domain, "HTTP analyze served");
  Json(analysis)
}

#[instrument(level = "info", skip(state, page), fields(title = %page.title))]
pub async fn http_post_quiz(
  State(state): State<Arc<AppState>>,
  Json(page): Json<PageContent>,
) -> impl IntoResponse {
  let mut session = state.new_session().await;
  let (items, origin) = state.generate_quiz(&mut session, &page).await;
  info!(target: "quiz", title = %page.title, %origin, "HTTP quiz served");
  Json(QuizOut { items, origin: origin.to_string() })
}

#[instrument(level = "info", skip(body), fields(answer_len = body.answer.len()))]
pub async fn http_post_grade(Json(body): Json<GradeIn>) -> impl IntoResponse {
  let correct = grader::grade(&body.answer, &body.reference);
  info!(target: "quiz", %correct, "HTTP grade evaluated");
  Json(GradeOut { correct })
}

#[instrument(level = "info", skip(state, body), fields(kind = ?body.kind, content_len = body.content.len()))]
pub async fn http_post_respond(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RespondIn>,
) -> impl IntoResponse {
  if body.kind == TaskKind::Quiz {
    let message = "quiz generation is served by /api/v1/quiz".to_string();
    return (StatusCode::BAD_REQUEST, Json(ErrorOut { message })).into_response();
  }

  let mut session = state.new_session().await;
  match session.respond(body.kind, &body.content, &body.context).await {
    Ok(RouterResponse::Text(response)) => Json(RespondOut { response }).into_response(),
    Ok(RouterResponse::Quiz(_)) => {
      let message = "unexpected quiz payload for a text request".to_string();
      (StatusCode::BAD_GATEWAY, Json(ErrorOut { message })).into_response()
    }
    Err(message) => (StatusCode::BAD_GATEWAY, Json(ErrorOut { message })).into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title, kind = ?body.kind))]
pub async fn http_post_library(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SaveLibraryIn>,
) -> impl IntoResponse {
  let item = state.library.save(body.kind, body.title, body.content, body.url).await;
  Json(item)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_library(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.library.list().await)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_library_similar(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  let similar = state.library.similar(&id).await;
  info!(target: "coachlens_backend", %id, related = similar.len(), "HTTP similar items served");
  Json(similar)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_library_grouped(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.library.grouped().await)
}

#[instrument(level = "info", skip(state, body), fields(score = body.score, total = body.total))]
pub async fn http_post_quiz_result(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuizResultIn>,
) -> impl IntoResponse {
  let record = state.library.record_quiz_result(body.score, body.total, body.title).await;
  info!(target: "quiz", percentage = record.percentage, "HTTP quiz result recorded");
  Json(record)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.library.quiz_history().await)
}
