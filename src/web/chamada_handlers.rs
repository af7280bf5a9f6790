// src/web/chamada_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        chamada::{AtualizarChamadaPayload, ChamadaDetalhe, CriarChamadaPayload},
        PeriodoParams,
    },
    services::chamada_service,
    state::AppState,
    web::extractors::{Path, Query, ValidatedJson},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;

pub async fn criar(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CriarChamadaPayload>,
) -> AppResult<(StatusCode, Json<ChamadaDetalhe>)> {
    tracing::debug!("POST /api/chamadas: {:?}", payload);

    // Já garantidos pelo `validator`
    let (Some(turma_id), Some(data_chamada)) = (payload.turma_id, payload.data_chamada) else {
        return Err(AppError::validation("Turma e data da chamada são obrigatórias"));
    };

    let chamada = chamada_service::criar_chamada(
        &state.db_pool,
        turma_id,
        data_chamada,
        payload.observacoes.as_deref(),
        &payload.alunos,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(chamada)))
}

pub async fn listar(State(state): State<AppState>) -> AppResult<Json<Vec<ChamadaDetalhe>>> {
    tracing::debug!("GET /api/chamadas");
    Ok(Json(chamada_service::listar_chamadas(&state.db_pool).await?))
}

pub async fn buscar_por_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ChamadaDetalhe>> {
    Ok(Json(chamada_service::buscar_chamada_por_id(&state.db_pool, id).await?))
}

pub async fn listar_por_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<Vec<ChamadaDetalhe>>> {
    Ok(Json(chamada_service::listar_chamadas_por_turma(&state.db_pool, turma_id).await?))
}

pub async fn listar_por_periodo(
    State(state): State<AppState>,
    Query(periodo): Query<PeriodoParams>,
) -> AppResult<Json<Vec<ChamadaDetalhe>>> {
    let chamadas =
        chamada_service::listar_chamadas_por_periodo(&state.db_pool, periodo.data_inicio, periodo.data_fim)
            .await?;
    Ok(Json(chamadas))
}

pub async fn listar_por_turma_e_periodo(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Query(periodo): Query<PeriodoParams>,
) -> AppResult<Json<Vec<ChamadaDetalhe>>> {
    let chamadas = chamada_service::listar_chamadas_por_turma_e_periodo(
        &state.db_pool,
        turma_id,
        periodo.data_inicio,
        periodo.data_fim,
    )
    .await?;
    Ok(Json(chamadas))
}

pub async fn buscar_por_turma_e_data(
    State(state): State<AppState>,
    Path((turma_id, data)): Path<(i64, NaiveDate)>,
) -> AppResult<Json<ChamadaDetalhe>> {
    chamada_service::buscar_chamada_por_turma_e_data(&state.db_pool, turma_id, data)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Chamada não encontrada"))
}

pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<AtualizarChamadaPayload>,
) -> AppResult<Json<ChamadaDetalhe>> {
    let chamada = chamada_service::atualizar_chamada(
        &state.db_pool,
        id,
        payload.observacoes.as_deref(),
        &payload.alunos,
    )
    .await?;
    Ok(Json(chamada))
}

pub async fn remover(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    chamada_service::remover_chamada(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
