// src/web/relatorio_handlers.rs
use crate::{
    error::AppResult,
    models::presenca::RelatorioParams,
    services::relatorio_service::{self, Formato},
    state::AppState,
    web::extractors::Query,
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurmaFiltro {
    pub turma_id: Option<i64>,
}

fn anexo(formato: Formato, nome_ficheiro: &str, conteudo: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, formato.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", nome_ficheiro),
            ),
        ],
        conteudo,
    )
        .into_response()
}

async fn presencas(db_pool: &SqlitePool, filtros: &RelatorioParams, formato: Formato) -> AppResult<Response> {
    let conteudo = relatorio_service::exportar_presencas(db_pool, filtros, formato).await?;
    let nome = relatorio_service::nome_ficheiro_presencas(filtros, formato);
    Ok(anexo(formato, &nome, conteudo))
}

async fn alunos(db_pool: &SqlitePool, turma_id: Option<i64>, formato: Formato) -> AppResult<Response> {
    let conteudo = relatorio_service::exportar_alunos(db_pool, turma_id, formato).await?;
    Ok(anexo(formato, &relatorio_service::nome_ficheiro_alunos(turma_id, formato), conteudo))
}

async fn turmas(db_pool: &SqlitePool, formato: Formato) -> AppResult<Response> {
    let conteudo = relatorio_service::exportar_turmas(db_pool, formato).await?;
    Ok(anexo(formato, &relatorio_service::nome_ficheiro_turmas(formato), conteudo))
}

pub async fn presencas_csv(
    State(state): State<AppState>,
    Query(filtros): Query<RelatorioParams>,
) -> AppResult<Response> {
    tracing::debug!("GET /relatorios/presencas/csv: {:?}", filtros);
    presencas(&state.db_pool, &filtros, Formato::Csv).await
}

pub async fn presencas_excel(
    State(state): State<AppState>,
    Query(filtros): Query<RelatorioParams>,
) -> AppResult<Response> {
    tracing::debug!("GET /relatorios/presencas/excel: {:?}", filtros);
    presencas(&state.db_pool, &filtros, Formato::Excel).await
}

pub async fn alunos_csv(
    State(state): State<AppState>,
    Query(filtro): Query<TurmaFiltro>,
) -> AppResult<Response> {
    alunos(&state.db_pool, filtro.turma_id, Formato::Csv).await
}

pub async fn alunos_excel(
    State(state): State<AppState>,
    Query(filtro): Query<TurmaFiltro>,
) -> AppResult<Response> {
    alunos(&state.db_pool, filtro.turma_id, Formato::Excel).await
}

pub async fn turmas_csv(State(state): State<AppState>) -> AppResult<Response> {
    turmas(&state.db_pool, Formato::Csv).await
}

pub async fn turmas_excel(State(state): State<AppState>) -> AppResult<Response> {
    turmas(&state.db_pool, Formato::Excel).await
}
