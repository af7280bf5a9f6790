// src/web/chamada_mentor_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        chamada_mentor::{ChamadaMentorDetalhe, ChamadaMentorEstatisticas, ChamadaMentorPayload},
        PeriodoParams,
    },
    services::chamada_mentor_service,
    state::AppState,
    web::extractors::{Path, Query, ValidatedJson},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;

fn data_obrigatoria(payload: &ChamadaMentorPayload) -> AppResult<NaiveDate> {
    payload
        .data_chamada
        .ok_or_else(|| AppError::validation("Data da chamada é obrigatória"))
}

pub async fn criar(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChamadaMentorPayload>,
) -> AppResult<(StatusCode, Json<ChamadaMentorDetalhe>)> {
    tracing::debug!("POST /api/chamadas-mentores: {:?}", payload);
    let chamada = chamada_mentor_service::criar_chamada(
        &state.db_pool,
        data_obrigatoria(&payload)?,
        payload.observacoes.as_deref(),
        &payload.participantes,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(chamada)))
}

pub async fn listar(State(state): State<AppState>) -> AppResult<Json<Vec<ChamadaMentorDetalhe>>> {
    Ok(Json(chamada_mentor_service::listar_todas(&state.db_pool).await?))
}

pub async fn buscar_por_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ChamadaMentorDetalhe>> {
    Ok(Json(chamada_mentor_service::buscar_por_id(&state.db_pool, id).await?))
}

pub async fn buscar_por_data(
    State(state): State<AppState>,
    Path(data): Path<NaiveDate>,
) -> AppResult<Json<ChamadaMentorDetalhe>> {
    chamada_mentor_service::buscar_por_data(&state.db_pool, data)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Nenhuma chamada de mentor na data {}", data)))
}

pub async fn listar_por_periodo(
    State(state): State<AppState>,
    Query(periodo): Query<PeriodoParams>,
) -> AppResult<Json<Vec<ChamadaMentorDetalhe>>> {
    let chamadas =
        chamada_mentor_service::listar_por_periodo(&state.db_pool, periodo.data_inicio, periodo.data_fim)
            .await?;
    Ok(Json(chamadas))
}

pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ChamadaMentorPayload>,
) -> AppResult<Json<ChamadaMentorDetalhe>> {
    let chamada = chamada_mentor_service::atualizar(
        &state.db_pool,
        id,
        data_obrigatoria(&payload)?,
        payload.observacoes.as_deref(),
        &payload.participantes,
    )
    .await?;
    Ok(Json(chamada))
}

pub async fn remover(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    chamada_mentor_service::remover(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn estatisticas(State(state): State<AppState>) -> AppResult<Json<ChamadaMentorEstatisticas>> {
    Ok(Json(chamada_mentor_service::obter_estatisticas(&state.db_pool).await?))
}
