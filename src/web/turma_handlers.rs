// src/web/turma_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{turma::{TurmaPayload, TurmaResumo}, BuscaNomeParams},
    services::turma_service,
    state::AppState,
    web::extractors::{Path, Query, ValidatedJson},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

pub async fn listar_ativas(State(state): State<AppState>) -> AppResult<Json<Vec<TurmaResumo>>> {
    tracing::debug!("GET /turmas");
    Ok(Json(turma_service::listar_turmas_ativas(&state.db_pool).await?))
}

pub async fn listar_todas(State(state): State<AppState>) -> AppResult<Json<Vec<TurmaResumo>>> {
    tracing::debug!("GET /turmas/todas");
    Ok(Json(turma_service::listar_todas_turmas(&state.db_pool).await?))
}

pub async fn buscar_por_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TurmaResumo>> {
    turma_service::buscar_por_id(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Turma não encontrada com ID: {}", id)))
}

pub async fn buscar_por_codigo(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> AppResult<Json<TurmaResumo>> {
    turma_service::buscar_por_codigo(&state.db_pool, &codigo)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Turma não encontrada com código: {}", codigo)))
}

pub async fn buscar_por_nome(
    State(state): State<AppState>,
    Query(params): Query<BuscaNomeParams>,
) -> AppResult<Json<Vec<TurmaResumo>>> {
    Ok(Json(turma_service::buscar_por_nome(&state.db_pool, &params.nome).await?))
}

pub async fn criar(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TurmaPayload>,
) -> AppResult<(StatusCode, Json<TurmaResumo>)> {
    tracing::debug!("POST /turmas: {:?}", payload);
    let turma = turma_service::criar_turma(&state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(turma)))
}

pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<TurmaPayload>,
) -> AppResult<Json<TurmaResumo>> {
    Ok(Json(turma_service::atualizar_turma(&state.db_pool, id, &payload).await?))
}

pub async fn remover(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    turma_service::remover_turma(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn excluir(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    tracing::debug!("DELETE /turmas/{}/permanente", id);
    turma_service::excluir_turma(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
