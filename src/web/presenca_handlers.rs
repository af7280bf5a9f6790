// src/web/presenca_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        presenca::{PresencaDetalhe, PresencaPayload, PresencaRapidaPayload, RelatorioParams},
        PeriodoParams,
    },
    services::presenca_service,
    state::AppState,
    web::extractors::{Path, Query, ValidatedJson},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;

// Campos obrigatórios já verificados pelo `validator`
fn aluno_e_turma(payload: &PresencaPayload) -> AppResult<(i64, i64)> {
    match (payload.aluno_id, payload.turma_id) {
        (Some(aluno_id), Some(turma_id)) => Ok((aluno_id, turma_id)),
        _ => Err(AppError::validation("ID do aluno e da turma são obrigatórios")),
    }
}

pub async fn listar_todas(State(state): State<AppState>) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    tracing::debug!("GET /presencas");
    Ok(Json(presenca_service::listar_todas(&state.db_pool).await?))
}

pub async fn listar_por_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    Ok(Json(presenca_service::listar_por_turma(&state.db_pool, turma_id).await?))
}

pub async fn listar_por_aluno(
    State(state): State<AppState>,
    Path(aluno_id): Path<i64>,
) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    Ok(Json(presenca_service::listar_por_aluno(&state.db_pool, aluno_id).await?))
}

pub async fn listar_por_data(
    State(state): State<AppState>,
    Path(data): Path<NaiveDate>,
) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    Ok(Json(presenca_service::listar_por_data(&state.db_pool, data).await?))
}

pub async fn listar_por_turma_e_data(
    State(state): State<AppState>,
    Path((turma_id, data)): Path<(i64, NaiveDate)>,
) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    Ok(Json(
        presenca_service::listar_por_turma_e_data(&state.db_pool, turma_id, data).await?,
    ))
}

pub async fn listar_por_periodo(
    State(state): State<AppState>,
    Query(periodo): Query<PeriodoParams>,
) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    let presencas =
        presenca_service::listar_por_periodo(&state.db_pool, periodo.data_inicio, periodo.data_fim).await?;
    Ok(Json(presencas))
}

pub async fn buscar_por_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PresencaDetalhe>> {
    Ok(Json(presenca_service::buscar_por_id(&state.db_pool, id).await?))
}

pub async fn registrar(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PresencaPayload>,
) -> AppResult<(StatusCode, Json<PresencaDetalhe>)> {
    tracing::debug!("POST /presencas: {:?}", payload);
    let (aluno_id, turma_id) = aluno_e_turma(&payload)?;
    let presenca = presenca_service::registrar_presenca(
        &state.db_pool,
        aluno_id,
        turma_id,
        payload.data_presenca,
        payload.hora_presenca,
        payload.observacoes.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(presenca)))
}

pub async fn registrar_rapida(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PresencaRapidaPayload>,
) -> AppResult<(StatusCode, Json<PresencaDetalhe>)> {
    let (Some(aluno_id), Some(turma_id)) = (payload.aluno_id, payload.turma_id) else {
        return Err(AppError::validation("ID do aluno e da turma são obrigatórios"));
    };
    let presenca = presenca_service::registrar_presenca_rapida(&state.db_pool, aluno_id, turma_id).await?;
    Ok((StatusCode::CREATED, Json(presenca)))
}

pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PresencaPayload>,
) -> AppResult<Json<PresencaDetalhe>> {
    let (aluno_id, turma_id) = aluno_e_turma(&payload)?;
    let presenca = presenca_service::atualizar_presenca(
        &state.db_pool,
        id,
        aluno_id,
        turma_id,
        payload.data_presenca,
        payload.hora_presenca,
        payload.observacoes.as_deref(),
    )
    .await?;
    Ok(Json(presenca))
}

pub async fn remover(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    presenca_service::remover_presenca(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn relatorio(
    State(state): State<AppState>,
    Query(filtros): Query<RelatorioParams>,
) -> AppResult<Json<Vec<PresencaDetalhe>>> {
    Ok(Json(presenca_service::gerar_relatorio(&state.db_pool, &filtros).await?))
}

pub async fn contar_por_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<i64>> {
    Ok(Json(presenca_service::contar_por_turma(&state.db_pool, turma_id).await?))
}

pub async fn contar_por_aluno(
    State(state): State<AppState>,
    Path(aluno_id): Path<i64>,
) -> AppResult<Json<i64>> {
    Ok(Json(presenca_service::contar_por_aluno(&state.db_pool, aluno_id).await?))
}
