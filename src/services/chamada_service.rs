// src/services/chamada_service.rs
//
// Chamada de turma: cabeçalho + um registo de presença/falta por aluno.
// Criação e atualização correm numa única transação; qualquer falha a meio
// (aluno inexistente, aluno de outra turma...) desfaz também o cabeçalho.
use crate::{
    db,
    error::{violacao_unicidade, AppError, AppResult},
    models::chamada::{ChamadaAlunoItem, ChamadaCabecalho, ChamadaDetalhe, StatusAluno},
    services::{aluno_service, turma_service},
};
use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;

// Contadores calculados na leitura a partir de chamada_alunos
const SELECT_CABECALHO: &str = r#"
    SELECT
        c.id, c.turma_id, t.nome AS turma_nome, t.codigo AS turma_codigo,
        c.data_chamada, c.observacoes, c.data_criacao,
        (SELECT COUNT(*) FROM chamada_alunos ca
          WHERE ca.chamada_id = c.id AND ca.presente = 1) AS total_presentes,
        (SELECT COUNT(*) FROM chamada_alunos ca
          WHERE ca.chamada_id = c.id AND ca.presente = 0) AS total_faltas
    FROM chamadas c
    JOIN turmas t ON t.id = c.turma_id
"#;

fn conflito_data(data: NaiveDate) -> AppError {
    AppError::conflict(format!(
        "Já existe uma chamada para esta turma na data {}",
        data
    ))
}

/// Cria a chamada de uma turma para um dia, com o estado de cada aluno.
pub async fn criar_chamada(
    db_pool: &SqlitePool,
    turma_id: i64,
    data_chamada: NaiveDate,
    observacoes: Option<&str>,
    alunos: &[StatusAluno],
) -> AppResult<ChamadaDetalhe> {
    tracing::info!(
        "Criando chamada da turma {} para {} ({} alunos)",
        turma_id,
        data_chamada,
        alunos.len()
    );

    let mut tx = db::begin_escrita(db_pool).await?;

    // 1. A turma tem de existir (ativa ou não)
    let turma = turma_service::find_turma(&mut *tx, turma_id)
        .await?
        .ok_or_else(|| AppError::not_found("Turma não encontrada"))?;

    // 2. No máximo uma chamada por turma e por dia
    let ja_existe: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM chamadas WHERE turma_id = ? AND data_chamada = ?)",
    )
    .bind(turma.id)
    .bind(data_chamada)
    .fetch_one(&mut *tx)
    .await?;
    if ja_existe {
        tracing::warn!("Chamada duplicada: turma {} em {}", turma.id, data_chamada);
        return Err(conflito_data(data_chamada));
    }

    // 3. Cabeçalho. A UNIQUE(turma_id, data_chamada) resolve corridas entre pedidos.
    let agora = Local::now().naive_local();
    let chamada_id = sqlx::query(
        r#"
        INSERT INTO chamadas (turma_id, data_chamada, observacoes, data_criacao)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(turma.id)
    .bind(data_chamada)
    .bind(observacoes)
    .bind(agora)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if violacao_unicidade(&e) {
            conflito_data(data_chamada)
        } else {
            e.into()
        }
    })?
    .last_insert_rowid();

    // 4. Um registo por aluno; o aluno tem de pertencer à turma da chamada
    for status in alunos {
        let aluno = aluno_service::find_aluno(&mut *tx, status.aluno_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Aluno não encontrado: {}", status.aluno_id))
            })?;

        if aluno.turma_id != turma.id {
            tracing::warn!(
                "Aluno {} (turma {}) rejeitado na chamada da turma {}",
                aluno.id,
                aluno.turma_id,
                turma.id
            );
            return Err(AppError::validation(format!(
                "Aluno {} não pertence à turma selecionada",
                aluno.nome
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO chamada_alunos (chamada_id, aluno_id, presente, data_registro)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(chamada_id)
        .bind(aluno.id)
        .bind(status.presente.unwrap_or(false))
        .bind(agora)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                AppError::validation(format!(
                    "Aluno {} aparece mais de uma vez na chamada",
                    aluno.nome
                ))
            } else {
                e.into()
            }
        })?;
    }

    tx.commit().await?;
    tracing::info!("✅ Chamada {} criada.", chamada_id);

    buscar_chamada_por_id(db_pool, chamada_id).await
}

/// Atualiza as observações e o estado dos alunos que já constam da chamada.
/// Alunos sem registo nesta chamada são ignorados (nenhum registo novo é criado).
pub async fn atualizar_chamada(
    db_pool: &SqlitePool,
    chamada_id: i64,
    observacoes: Option<&str>,
    alunos: &[StatusAluno],
) -> AppResult<ChamadaDetalhe> {
    tracing::info!("Atualizando chamada {}", chamada_id);

    let mut tx = db::begin_escrita(db_pool).await?;

    // Turma e data não mudam: só as observações
    let rows_affected = sqlx::query("UPDATE chamadas SET observacoes = ? WHERE id = ?")
        .bind(observacoes)
        .bind(chamada_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(AppError::not_found("Chamada não encontrada"));
    }

    for status in alunos {
        let atualizados = sqlx::query(
            "UPDATE chamada_alunos SET presente = ? WHERE chamada_id = ? AND aluno_id = ?",
        )
        .bind(status.presente.unwrap_or(false))
        .bind(chamada_id)
        .bind(status.aluno_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if atualizados == 0 {
            tracing::debug!(
                "Aluno {} não consta da chamada {}; ignorado.",
                status.aluno_id,
                chamada_id
            );
        }
    }

    tx.commit().await?;
    buscar_chamada_por_id(db_pool, chamada_id).await
}

/// Remove a chamada; os registos dos alunos vão em CASCADE.
pub async fn remover_chamada(db_pool: &SqlitePool, chamada_id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM chamadas WHERE id = ?")
        .bind(chamada_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found("Chamada não encontrada"));
    }
    tracing::info!("Chamada {} removida.", chamada_id);
    Ok(())
}

/// Chamada completa, com a lista de alunos ordenada por nome.
pub async fn buscar_chamada_por_id(db_pool: &SqlitePool, chamada_id: i64) -> AppResult<ChamadaDetalhe> {
    let sql = format!("{SELECT_CABECALHO} WHERE c.id = ?");
    let cabecalho = sqlx::query_as::<_, ChamadaCabecalho>(&sql)
        .bind(chamada_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Chamada não encontrada"))?;

    let alunos = sqlx::query_as::<_, ChamadaAlunoItem>(
        r#"
        SELECT
            ca.id, ca.chamada_id, ca.aluno_id,
            a.nome AS aluno_nome, a.matricula AS aluno_matricula, a.email AS aluno_email,
            ca.presente, ca.data_registro
        FROM chamada_alunos ca
        JOIN alunos a ON a.id = ca.aluno_id
        WHERE ca.chamada_id = ?
        ORDER BY a.nome ASC
        "#,
    )
    .bind(chamada_id)
    .fetch_all(db_pool)
    .await?;

    Ok(ChamadaDetalhe::completo(cabecalho, alunos))
}

pub async fn buscar_chamada_por_turma_e_data(
    db_pool: &SqlitePool,
    turma_id: i64,
    data: NaiveDate,
) -> AppResult<Option<ChamadaDetalhe>> {
    let id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM chamadas WHERE turma_id = ? AND data_chamada = ?")
            .bind(turma_id)
            .bind(data)
            .fetch_optional(db_pool)
            .await?;

    match id {
        Some(id) => Ok(Some(buscar_chamada_por_id(db_pool, id).await?)),
        None => Ok(None),
    }
}

async fn listar_resumos(
    db_pool: &SqlitePool,
    filtro: &str,
    turma_id: Option<i64>,
    periodo: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<ChamadaDetalhe>> {
    let sql = format!("{SELECT_CABECALHO} {filtro} ORDER BY c.data_chamada DESC, t.nome ASC");
    let mut query = sqlx::query_as::<_, ChamadaCabecalho>(&sql);
    if let Some(turma_id) = turma_id {
        query = query.bind(turma_id);
    }
    if let Some((inicio, fim)) = periodo {
        query = query.bind(inicio).bind(fim);
    }
    let cabecalhos = query.fetch_all(db_pool).await?;
    Ok(cabecalhos.into_iter().map(ChamadaDetalhe::resumo).collect())
}

/// Todas as chamadas, mais recentes primeiro (sem a lista de alunos).
pub async fn listar_chamadas(db_pool: &SqlitePool) -> AppResult<Vec<ChamadaDetalhe>> {
    tracing::debug!("Listando chamadas...");
    listar_resumos(db_pool, "", None, None).await
}

pub async fn listar_chamadas_por_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<Vec<ChamadaDetalhe>> {
    listar_resumos(db_pool, "WHERE c.turma_id = ?", Some(turma_id), None).await
}

pub async fn listar_chamadas_por_periodo(
    db_pool: &SqlitePool,
    inicio: NaiveDate,
    fim: NaiveDate,
) -> AppResult<Vec<ChamadaDetalhe>> {
    listar_resumos(
        db_pool,
        "WHERE c.data_chamada BETWEEN ? AND ?",
        None,
        Some((inicio, fim)),
    )
    .await
}

pub async fn listar_chamadas_por_turma_e_periodo(
    db_pool: &SqlitePool,
    turma_id: i64,
    inicio: NaiveDate,
    fim: NaiveDate,
) -> AppResult<Vec<ChamadaDetalhe>> {
    listar_resumos(
        db_pool,
        "WHERE c.turma_id = ? AND c.data_chamada BETWEEN ? AND ?",
        Some(turma_id),
        Some((inicio, fim)),
    )
    .await
}
