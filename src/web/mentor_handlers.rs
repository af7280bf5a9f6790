// src/web/mentor_handlers.rs
use crate::{
    error::AppResult,
    models::{
        mentor::{MentorEstatisticas, MentorPayload, MentorResumo},
        BuscaNomeParams,
    },
    services::mentor_service,
    state::AppState,
    web::extractors::{Path, Query, ValidatedJson},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

pub async fn listar_todos(State(state): State<AppState>) -> AppResult<Json<Vec<MentorResumo>>> {
    tracing::debug!("GET /api/mentores");
    Ok(Json(mentor_service::listar_todos(&state.db_pool).await?))
}

pub async fn listar_ativos(State(state): State<AppState>) -> AppResult<Json<Vec<MentorResumo>>> {
    Ok(Json(mentor_service::listar_ativos(&state.db_pool).await?))
}

pub async fn listar_por_tipo(
    State(state): State<AppState>,
    Path(tipo): Path<String>,
) -> AppResult<Json<Vec<MentorResumo>>> {
    Ok(Json(mentor_service::listar_por_tipo(&state.db_pool, &tipo).await?))
}

pub async fn buscar_por_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MentorResumo>> {
    Ok(Json(mentor_service::buscar_por_id(&state.db_pool, id).await?))
}

pub async fn buscar_por_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<MentorResumo>> {
    Ok(Json(mentor_service::buscar_por_email(&state.db_pool, &email).await?))
}

pub async fn buscar_por_nome(
    State(state): State<AppState>,
    Query(params): Query<BuscaNomeParams>,
) -> AppResult<Json<Vec<MentorResumo>>> {
    Ok(Json(mentor_service::buscar_por_nome(&state.db_pool, &params.nome).await?))
}

pub async fn criar(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<MentorPayload>,
) -> AppResult<(StatusCode, Json<MentorResumo>)> {
    tracing::debug!("POST /api/mentores: {:?}", payload);
    let mentor = mentor_service::criar(&state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(mentor)))
}

pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<MentorPayload>,
) -> AppResult<Json<MentorResumo>> {
    Ok(Json(mentor_service::atualizar(&state.db_pool, id, &payload).await?))
}

pub async fn remover(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    mentor_service::remover(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reativar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MentorResumo>> {
    Ok(Json(mentor_service::reativar(&state.db_pool, id).await?))
}

pub async fn estatisticas(State(state): State<AppState>) -> AppResult<Json<MentorEstatisticas>> {
    Ok(Json(mentor_service::obter_estatisticas(&state.db_pool).await?))
}
