// src/services/presenca_service.rs
use crate::{
    error::{violacao_unicidade, AppError, AppResult},
    models::{
        aluno::Aluno,
        presenca::{PresencaDetalhe, RelatorioParams},
    },
    services::{aluno_service, turma_service},
};
use chrono::{Local, NaiveDate, NaiveTime};
use sqlx::SqlitePool;

const SELECT_PRESENCA: &str = r#"
    SELECT
        p.id, p.aluno_id, p.turma_id,
        a.nome AS aluno_nome, a.matricula AS aluno_matricula,
        t.nome AS turma_nome, t.codigo AS turma_codigo,
        p.data_presenca, p.hora_presenca, p.data_hora_registro, p.observacoes
    FROM presencas p
    JOIN alunos a ON a.id = p.aluno_id
    JOIN turmas t ON t.id = p.turma_id
"#;

const ORDEM_RECENTES: &str = "ORDER BY p.data_presenca DESC, p.hora_presenca DESC";

fn conflito_presenca(data: NaiveDate) -> AppError {
    AppError::conflict(format!(
        "Aluno já possui presença registrada para a data {}",
        data
    ))
}

/// Aluno e turma têm de existir e o aluno tem de estar matriculado na turma.
async fn validar_aluno_e_turma(db_pool: &SqlitePool, aluno_id: i64, turma_id: i64) -> AppResult<Aluno> {
    let aluno = aluno_service::find_aluno(db_pool, aluno_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Aluno não encontrado com ID: {}", aluno_id)))?;

    let turma = turma_service::find_turma(db_pool, turma_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Turma não encontrada com ID: {}", turma_id)))?;

    if aluno.turma_id != turma.id {
        return Err(AppError::validation(format!(
            "Aluno {} não pertence à turma {}",
            aluno.nome, turma.nome
        )));
    }
    Ok(aluno)
}

async fn ja_registada(
    db_pool: &SqlitePool,
    aluno_id: i64,
    data: NaiveDate,
    excluir_id: Option<i64>,
) -> AppResult<bool> {
    let existe: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM presencas
            WHERE aluno_id = ?1 AND data_presenca = ?2 AND (?3 IS NULL OR id <> ?3)
        )
        "#,
    )
    .bind(aluno_id)
    .bind(data)
    .bind(excluir_id)
    .fetch_one(db_pool)
    .await?;
    Ok(existe)
}

/// Regista a presença de um aluno. Sem data/hora assume hoje e agora.
pub async fn registrar_presenca(
    db_pool: &SqlitePool,
    aluno_id: i64,
    turma_id: i64,
    data_presenca: Option<NaiveDate>,
    hora_presenca: Option<NaiveTime>,
    observacoes: Option<&str>,
) -> AppResult<PresencaDetalhe> {
    // 1. Aluno, turma e matrícula
    let aluno = validar_aluno_e_turma(db_pool, aluno_id, turma_id).await?;

    // 2. Data e hora por omissão
    let agora = Local::now().naive_local();
    let data = data_presenca.unwrap_or_else(|| agora.date());
    let hora = hora_presenca.unwrap_or_else(|| agora.time());

    // 3. Uma presença por aluno e por dia
    if ja_registada(db_pool, aluno.id, data, None).await? {
        tracing::warn!("Presença duplicada: aluno {} em {}", aluno.id, data);
        return Err(conflito_presenca(data));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO presencas
            (aluno_id, turma_id, data_presenca, hora_presenca, data_hora_registro, observacoes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(aluno.id)
    .bind(turma_id)
    .bind(data)
    .bind(hora)
    .bind(agora)
    .bind(observacoes)
    .execute(db_pool)
    .await
    .map_err(|e| {
        if violacao_unicidade(&e) {
            conflito_presenca(data)
        } else {
            e.into()
        }
    })?
    .last_insert_rowid();

    tracing::info!("✅ Presença {} registada para o aluno '{}' em {}.", id, aluno.nome, data);
    buscar_por_id(db_pool, id).await
}

/// Marcação rápida: hoje, agora, sem observações.
pub async fn registrar_presenca_rapida(
    db_pool: &SqlitePool,
    aluno_id: i64,
    turma_id: i64,
) -> AppResult<PresencaDetalhe> {
    registrar_presenca(db_pool, aluno_id, turma_id, None, None, None).await
}

/// Substitui aluno, turma, data, hora e observações. Data/hora em falta mantêm o valor atual.
pub async fn atualizar_presenca(
    db_pool: &SqlitePool,
    id: i64,
    aluno_id: i64,
    turma_id: i64,
    data_presenca: Option<NaiveDate>,
    hora_presenca: Option<NaiveTime>,
    observacoes: Option<&str>,
) -> AppResult<PresencaDetalhe> {
    tracing::info!("Atualizando presença {}", id);

    let atual = buscar_por_id(db_pool, id).await?;
    let aluno = validar_aluno_e_turma(db_pool, aluno_id, turma_id).await?;

    let data = data_presenca.unwrap_or(atual.data_presenca);
    let hora = hora_presenca.unwrap_or(atual.hora_presenca);

    if ja_registada(db_pool, aluno.id, data, Some(id)).await? {
        return Err(conflito_presenca(data));
    }

    sqlx::query(
        r#"
        UPDATE presencas
        SET aluno_id = ?1, turma_id = ?2, data_presenca = ?3, hora_presenca = ?4, observacoes = ?5
        WHERE id = ?6
        "#,
    )
    .bind(aluno.id)
    .bind(turma_id)
    .bind(data)
    .bind(hora)
    .bind(observacoes)
    .bind(id)
    .execute(db_pool)
    .await
    .map_err(|e| {
        if violacao_unicidade(&e) {
            conflito_presenca(data)
        } else {
            e.into()
        }
    })?;

    buscar_por_id(db_pool, id).await
}

pub async fn remover_presenca(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM presencas WHERE id = ?")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(format!("Presença não encontrada com ID: {}", id)));
    }
    tracing::info!("Presença {} removida.", id);
    Ok(())
}

pub async fn buscar_por_id(db_pool: &SqlitePool, id: i64) -> AppResult<PresencaDetalhe> {
    let sql = format!("{SELECT_PRESENCA} WHERE p.id = ?");
    sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presença não encontrada com ID: {}", id)))
}

pub async fn listar_todas(db_pool: &SqlitePool) -> AppResult<Vec<PresencaDetalhe>> {
    let sql = format!("{SELECT_PRESENCA} {ORDEM_RECENTES}");
    let presencas = sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .fetch_all(db_pool)
        .await?;
    Ok(presencas)
}

pub async fn listar_por_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<Vec<PresencaDetalhe>> {
    let sql = format!("{SELECT_PRESENCA} WHERE p.turma_id = ? {ORDEM_RECENTES}");
    let presencas = sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .bind(turma_id)
        .fetch_all(db_pool)
        .await?;
    Ok(presencas)
}

pub async fn listar_por_aluno(db_pool: &SqlitePool, aluno_id: i64) -> AppResult<Vec<PresencaDetalhe>> {
    let sql = format!("{SELECT_PRESENCA} WHERE p.aluno_id = ? {ORDEM_RECENTES}");
    let presencas = sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .bind(aluno_id)
        .fetch_all(db_pool)
        .await?;
    Ok(presencas)
}

/// Presenças de um dia, pela hora de chegada.
pub async fn listar_por_data(db_pool: &SqlitePool, data: NaiveDate) -> AppResult<Vec<PresencaDetalhe>> {
    let sql = format!("{SELECT_PRESENCA} WHERE p.data_presenca = ? ORDER BY p.hora_presenca ASC");
    let presencas = sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .bind(data)
        .fetch_all(db_pool)
        .await?;
    Ok(presencas)
}

pub async fn listar_por_turma_e_data(
    db_pool: &SqlitePool,
    turma_id: i64,
    data: NaiveDate,
) -> AppResult<Vec<PresencaDetalhe>> {
    let sql = format!(
        "{SELECT_PRESENCA} WHERE p.turma_id = ? AND p.data_presenca = ? ORDER BY a.nome ASC"
    );
    let presencas = sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .bind(turma_id)
        .bind(data)
        .fetch_all(db_pool)
        .await?;
    Ok(presencas)
}

pub async fn listar_por_periodo(
    db_pool: &SqlitePool,
    inicio: NaiveDate,
    fim: NaiveDate,
) -> AppResult<Vec<PresencaDetalhe>> {
    gerar_relatorio(
        db_pool,
        &RelatorioParams {
            turma_id: None,
            data_inicio: Some(inicio),
            data_fim: Some(fim),
        },
    )
    .await
}

/// Relatório com filtros opcionais; filtros ausentes não restringem nada.
pub async fn gerar_relatorio(db_pool: &SqlitePool, filtros: &RelatorioParams) -> AppResult<Vec<PresencaDetalhe>> {
    tracing::debug!("Gerando relatório de presenças: {:?}", filtros);
    let sql = format!(
        r#"{SELECT_PRESENCA}
        WHERE (?1 IS NULL OR p.turma_id = ?1)
          AND (?2 IS NULL OR p.data_presenca >= ?2)
          AND (?3 IS NULL OR p.data_presenca <= ?3)
        {ORDEM_RECENTES}"#
    );
    let presencas = sqlx::query_as::<_, PresencaDetalhe>(&sql)
        .bind(filtros.turma_id)
        .bind(filtros.data_inicio)
        .bind(filtros.data_fim)
        .fetch_all(db_pool)
        .await?;
    Ok(presencas)
}

pub async fn contar_por_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM presencas WHERE turma_id = ?")
        .bind(turma_id)
        .fetch_one(db_pool)
        .await?;
    Ok(total)
}

pub async fn contar_por_aluno(db_pool: &SqlitePool, aluno_id: i64) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM presencas WHERE aluno_id = ?")
        .bind(aluno_id)
        .fetch_one(db_pool)
        .await?;
    Ok(total)
}
