// src/web/aluno_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{aluno::{AlunoPayload, AlunoResumo}, BuscaNomeParams},
    services::aluno_service,
    state::AppState,
    web::extractors::{Path, Query, ValidatedJson},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

pub async fn listar_ativos(State(state): State<AppState>) -> AppResult<Json<Vec<AlunoResumo>>> {
    tracing::debug!("GET /alunos");
    Ok(Json(aluno_service::listar_alunos_ativos(&state.db_pool).await?))
}

pub async fn listar_todos(State(state): State<AppState>) -> AppResult<Json<Vec<AlunoResumo>>> {
    Ok(Json(aluno_service::listar_todos_alunos(&state.db_pool).await?))
}

pub async fn listar_por_turma(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
) -> AppResult<Json<Vec<AlunoResumo>>> {
    Ok(Json(aluno_service::listar_alunos_por_turma(&state.db_pool, turma_id).await?))
}

fn nao_encontrado(campo: &str, valor: impl std::fmt::Display) -> AppError {
    AppError::not_found(format!("Aluno não encontrado com {}: {}", campo, valor))
}

pub async fn buscar_por_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AlunoResumo>> {
    aluno_service::buscar_por_id(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| nao_encontrado("ID", id))
}

pub async fn buscar_por_matricula(
    State(state): State<AppState>,
    Path(matricula): Path<String>,
) -> AppResult<Json<AlunoResumo>> {
    aluno_service::buscar_por_matricula(&state.db_pool, &matricula)
        .await?
        .map(Json)
        .ok_or_else(|| nao_encontrado("matrícula", &matricula))
}

pub async fn buscar_por_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<AlunoResumo>> {
    aluno_service::buscar_por_email(&state.db_pool, &email)
        .await?
        .map(Json)
        .ok_or_else(|| nao_encontrado("email", &email))
}

pub async fn buscar_por_nome(
    State(state): State<AppState>,
    Query(params): Query<BuscaNomeParams>,
) -> AppResult<Json<Vec<AlunoResumo>>> {
    Ok(Json(aluno_service::buscar_por_nome(&state.db_pool, &params.nome).await?))
}

pub async fn buscar_por_turma_e_nome(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Query(params): Query<BuscaNomeParams>,
) -> AppResult<Json<Vec<AlunoResumo>>> {
    let alunos = aluno_service::buscar_por_turma_e_nome(&state.db_pool, turma_id, &params.nome).await?;
    Ok(Json(alunos))
}

pub async fn criar(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AlunoPayload>,
) -> AppResult<(StatusCode, Json<AlunoResumo>)> {
    tracing::debug!("POST /alunos: {:?}", payload);
    let aluno = aluno_service::criar_aluno(&state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(aluno)))
}

pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<AlunoPayload>,
) -> AppResult<Json<AlunoResumo>> {
    Ok(Json(aluno_service::atualizar_aluno(&state.db_pool, id, &payload).await?))
}

pub async fn remover(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    aluno_service::remover_aluno(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn excluir(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    aluno_service::excluir_aluno(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
