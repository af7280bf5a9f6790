// src/services/chamada_mentor_service.rs
//
// Chamada global de mentores: no máximo uma por dia, sem ligação a turmas.
// Ao contrário da chamada de turma, a atualização substitui por completo a
// lista de participantes.
use crate::{
    db,
    error::{violacao_unicidade, AppError, AppResult},
    models::chamada_mentor::{
        ChamadaMentorCabecalho, ChamadaMentorDetalhe, ChamadaMentorEstatisticas,
        ParticipanteItem, ParticipanteLinha, ParticipantePayload,
    },
    services::mentor_service,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT_CABECALHO: &str = r#"
    SELECT
        cm.id, cm.data_chamada, cm.observacoes, cm.data_criacao,
        (SELECT COUNT(*) FROM chamada_mentor_participantes p
          WHERE p.chamada_mentor_id = cm.id AND p.presente = 1) AS total_presentes,
        (SELECT COUNT(*) FROM chamada_mentor_participantes p
          WHERE p.chamada_mentor_id = cm.id AND p.presente = 0) AS total_ausentes
    FROM chamadas_mentores cm
"#;

fn conflito_data(data: NaiveDate) -> AppError {
    AppError::conflict(format!(
        "Já existe uma chamada de mentor para a data {}",
        data
    ))
}

// Executa dentro da transação do chamador
async fn inserir_participantes(
    conn: &mut SqliteConnection,
    chamada_mentor_id: i64,
    participantes: &[ParticipantePayload],
    agora: NaiveDateTime,
) -> AppResult<()> {
    for participante in participantes {
        let mentor = mentor_service::find_mentor(&mut *conn, participante.mentor_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Mentor não encontrado: {}", participante.mentor_id))
            })?;

        sqlx::query(
            r#"
            INSERT INTO chamada_mentor_participantes
                (chamada_mentor_id, mentor_id, presente, data_registro)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(chamada_mentor_id)
        .bind(mentor.id)
        .bind(participante.presente.unwrap_or(false))
        .bind(agora)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                AppError::validation(format!(
                    "Mentor {} aparece mais de uma vez na chamada",
                    mentor.nome
                ))
            } else {
                e.into()
            }
        })?;
    }
    Ok(())
}

pub async fn criar_chamada(
    db_pool: &SqlitePool,
    data_chamada: NaiveDate,
    observacoes: Option<&str>,
    participantes: &[ParticipantePayload],
) -> AppResult<ChamadaMentorDetalhe> {
    tracing::info!(
        "Criando chamada de mentores para {} ({} participantes)",
        data_chamada,
        participantes.len()
    );

    let mut tx = db::begin_escrita(db_pool).await?;

    // 1. Uma chamada de mentores por dia, no sistema inteiro
    let ja_existe: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM chamadas_mentores WHERE data_chamada = ?)")
            .bind(data_chamada)
            .fetch_one(&mut *tx)
            .await?;
    if ja_existe {
        return Err(conflito_data(data_chamada));
    }

    // 2. Cabeçalho
    let agora = Local::now().naive_local();
    let id = sqlx::query(
        "INSERT INTO chamadas_mentores (data_chamada, observacoes, data_criacao) VALUES (?1, ?2, ?3)",
    )
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

    // 3. Participantes
    inserir_participantes(&mut *tx, id, participantes, agora).await?;

    tx.commit().await?;
    tracing::info!("✅ Chamada de mentores {} criada.", id);

    buscar_por_id(db_pool, id).await
}

/// Troca data e observações e substitui todos os participantes pela lista recebida.
pub async fn atualizar(
    db_pool: &SqlitePool,
    id: i64,
    data_chamada: NaiveDate,
    observacoes: Option<&str>,
    participantes: &[ParticipantePayload],
) -> AppResult<ChamadaMentorDetalhe> {
    tracing::info!("Atualizando chamada de mentores {}", id);

    let mut tx = db::begin_escrita(db_pool).await?;

    let data_atual: NaiveDate =
        sqlx::query_scalar("SELECT data_chamada FROM chamadas_mentores WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Chamada de mentor não encontrada"))?;

    // A data só é verificada se mudou
    if data_atual != data_chamada {
        let ocupada: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM chamadas_mentores WHERE data_chamada = ? AND id <> ?)",
        )
        .bind(data_chamada)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if ocupada {
            return Err(conflito_data(data_chamada));
        }
    }

    sqlx::query("UPDATE chamadas_mentores SET data_chamada = ?, observacoes = ? WHERE id = ?")
        .bind(data_chamada)
        .bind(observacoes)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violacao_unicidade(&e) {
                conflito_data(data_chamada)
            } else {
                e.into()
            }
        })?;

    sqlx::query("DELETE FROM chamada_mentor_participantes WHERE chamada_mentor_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    inserir_participantes(&mut *tx, id, participantes, Local::now().naive_local()).await?;

    tx.commit().await?;
    buscar_por_id(db_pool, id).await
}

pub async fn remover(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM chamadas_mentores WHERE id = ?")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found("Chamada de mentor não encontrada"));
    }
    tracing::info!("Chamada de mentores {} removida.", id);
    Ok(())
}

pub async fn buscar_por_id(db_pool: &SqlitePool, id: i64) -> AppResult<ChamadaMentorDetalhe> {
    let sql = format!("{SELECT_CABECALHO} WHERE cm.id = ?");
    let cabecalho = sqlx::query_as::<_, ChamadaMentorCabecalho>(&sql)
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("Chamada de mentor não encontrada"))?;

    let participantes = sqlx::query_as::<_, ParticipanteLinha>(
        r#"
        SELECT
            p.id, p.chamada_mentor_id, p.mentor_id,
            m.nome AS mentor_nome, m.email AS mentor_email, m.tipo_mentor AS mentor_tipo,
            p.presente, p.data_registro
        FROM chamada_mentor_participantes p
        JOIN mentores m ON m.id = p.mentor_id
        WHERE p.chamada_mentor_id = ?
        ORDER BY m.nome ASC
        "#,
    )
    .bind(id)
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(ParticipanteItem::from)
    .collect();

    Ok(ChamadaMentorDetalhe::completo(cabecalho, participantes))
}

pub async fn buscar_por_data(db_pool: &SqlitePool, data: NaiveDate) -> AppResult<Option<ChamadaMentorDetalhe>> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM chamadas_mentores WHERE data_chamada = ?")
        .bind(data)
        .fetch_optional(db_pool)
        .await?;

    match id {
        Some(id) => Ok(Some(buscar_por_id(db_pool, id).await?)),
        None => Ok(None),
    }
}

/// Resumos (sem participantes), mais recentes primeiro.
pub async fn listar_todas(db_pool: &SqlitePool) -> AppResult<Vec<ChamadaMentorDetalhe>> {
    let sql = format!("{SELECT_CABECALHO} ORDER BY cm.data_chamada DESC");
    let cabecalhos = sqlx::query_as::<_, ChamadaMentorCabecalho>(&sql)
        .fetch_all(db_pool)
        .await?;
    Ok(cabecalhos.into_iter().map(ChamadaMentorDetalhe::resumo).collect())
}

pub async fn listar_por_periodo(
    db_pool: &SqlitePool,
    inicio: NaiveDate,
    fim: NaiveDate,
) -> AppResult<Vec<ChamadaMentorDetalhe>> {
    let sql = format!(
        "{SELECT_CABECALHO} WHERE cm.data_chamada BETWEEN ? AND ? ORDER BY cm.data_chamada DESC"
    );
    let cabecalhos = sqlx::query_as::<_, ChamadaMentorCabecalho>(&sql)
        .bind(inicio)
        .bind(fim)
        .fetch_all(db_pool)
        .await?;
    Ok(cabecalhos.into_iter().map(ChamadaMentorDetalhe::resumo).collect())
}

pub async fn obter_estatisticas(db_pool: &SqlitePool) -> AppResult<ChamadaMentorEstatisticas> {
    obter_estatisticas_em(db_pool, Local::now().date_naive()).await
}

/// Estatísticas relativas a `hoje`: mês corrente e chamada do próprio dia.
pub async fn obter_estatisticas_em(
    db_pool: &SqlitePool,
    hoje: NaiveDate,
) -> AppResult<ChamadaMentorEstatisticas> {
    let total_chamadas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chamadas_mentores")
        .fetch_one(db_pool)
        .await?;

    // As datas estão guardadas como YYYY-MM-DD
    let total_chamadas_mes_atual: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM chamadas_mentores WHERE strftime('%Y-%m', data_chamada) = ?",
    )
    .bind(hoje.format("%Y-%m").to_string())
    .fetch_one(db_pool)
    .await?;

    let (total_presentes_hoje, total_ausentes_hoje): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN p.presente = 1 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN p.presente = 0 THEN 1 ELSE 0 END), 0)
        FROM chamada_mentor_participantes p
        JOIN chamadas_mentores cm ON cm.id = p.chamada_mentor_id
        WHERE cm.data_chamada = ?
        "#,
    )
    .bind(hoje)
    .fetch_one(db_pool)
    .await?;

    Ok(ChamadaMentorEstatisticas {
        total_chamadas,
        total_chamadas_mes_atual,
        total_presentes_hoje,
        total_ausentes_hoje,
    })
}
