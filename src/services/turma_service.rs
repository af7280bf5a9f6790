// src/services/turma_service.rs
use crate::{
    error::{violacao_unicidade, AppError, AppResult},
    models::turma::{Turma, TurmaPayload, TurmaResumo},
};
use chrono::Local;
use sqlx::{SqliteExecutor, SqlitePool};

// Os totais são sempre calculados na leitura (nada é guardado desnormalizado)
const SELECT_TURMA_RESUMO: &str = r#"
    SELECT
        t.id, t.nome, t.codigo, t.descricao, t.ativa, t.data_criacao,
        (SELECT COUNT(*) FROM alunos a WHERE a.turma_id = t.id AND a.ativo = 1) AS total_alunos,
        (SELECT COUNT(*) FROM presencas p WHERE p.turma_id = t.id) AS total_presencas
    FROM turmas t
"#;

/// Busca a linha crua da turma. Aceita o pool ou uma transação aberta.
pub async fn find_turma<'e>(db: impl SqliteExecutor<'e>, turma_id: i64) -> AppResult<Option<Turma>> {
    let turma = sqlx::query_as::<_, Turma>(
        "SELECT id, nome, ativa FROM turmas WHERE id = ?",
    )
    .bind(turma_id)
    .fetch_optional(db)
    .await?;
    Ok(turma)
}

/// Lista as turmas ativas
pub async fn listar_turmas_ativas(db_pool: &SqlitePool) -> AppResult<Vec<TurmaResumo>> {
    tracing::debug!("Buscando turmas ativas...");
    let sql = format!("{SELECT_TURMA_RESUMO} WHERE t.ativa = 1 ORDER BY t.nome ASC");
    let turmas = sqlx::query_as::<_, TurmaResumo>(&sql)
        .fetch_all(db_pool)
        .await?;
    Ok(turmas)
}

pub async fn listar_todas_turmas(db_pool: &SqlitePool) -> AppResult<Vec<TurmaResumo>> {
    tracing::debug!("Buscando todas as turmas...");
    let sql = format!("{SELECT_TURMA_RESUMO} ORDER BY t.nome ASC");
    let turmas = sqlx::query_as::<_, TurmaResumo>(&sql)
        .fetch_all(db_pool)
        .await?;
    Ok(turmas)
}

pub async fn buscar_por_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<TurmaResumo>> {
    let sql = format!("{SELECT_TURMA_RESUMO} WHERE t.id = ?");
    let turma = sqlx::query_as::<_, TurmaResumo>(&sql)
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(turma)
}

pub async fn buscar_por_codigo(db_pool: &SqlitePool, codigo: &str) -> AppResult<Option<TurmaResumo>> {
    let sql = format!("{SELECT_TURMA_RESUMO} WHERE t.codigo = ?");
    let turma = sqlx::query_as::<_, TurmaResumo>(&sql)
        .bind(codigo)
        .fetch_optional(db_pool)
        .await?;
    Ok(turma)
}

/// Pesquisa por parte do nome, sem distinguir maiúsculas
pub async fn buscar_por_nome(db_pool: &SqlitePool, nome: &str) -> AppResult<Vec<TurmaResumo>> {
    let sql = format!(
        "{SELECT_TURMA_RESUMO} WHERE LOWER(t.nome) LIKE '%' || LOWER(?) || '%' ORDER BY t.nome ASC"
    );
    let turmas = sqlx::query_as::<_, TurmaResumo>(&sql)
        .bind(nome.trim())
        .fetch_all(db_pool)
        .await?;
    Ok(turmas)
}

async fn codigo_em_uso(db_pool: &SqlitePool, codigo: &str, excluir_id: Option<i64>) -> AppResult<bool> {
    let em_uso: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM turmas WHERE codigo = ?1 AND (?2 IS NULL OR id <> ?2))",
    )
    .bind(codigo)
    .bind(excluir_id)
    .fetch_one(db_pool)
    .await?;
    Ok(em_uso)
}

pub async fn criar_turma(db_pool: &SqlitePool, payload: &TurmaPayload) -> AppResult<TurmaResumo> {
    tracing::info!("Criando turma com código '{}'", payload.codigo);

    if codigo_em_uso(db_pool, &payload.codigo, None).await? {
        return Err(AppError::conflict(format!(
            "Já existe uma turma com o código: {}",
            payload.codigo
        )));
    }

    let resultado = sqlx::query(
        r#"
        INSERT INTO turmas (nome, codigo, descricao, ativa, data_criacao)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payload.nome)
    .bind(&payload.codigo)
    .bind(&payload.descricao)
    .bind(payload.ativa.unwrap_or(true))
    .bind(Local::now().naive_local())
    .execute(db_pool)
    .await;

    let id = match resultado {
        Ok(r) => r.last_insert_rowid(),
        Err(e) if violacao_unicidade(&e) => {
            return Err(AppError::conflict(format!(
                "Já existe uma turma com o código: {}",
                payload.codigo
            )));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("✅ Turma '{}' criada (id {}).", payload.codigo, id);
    buscar_por_id(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

pub async fn atualizar_turma(
    db_pool: &SqlitePool,
    id: i64,
    payload: &TurmaPayload,
) -> AppResult<TurmaResumo> {
    tracing::info!("Atualizando turma {}", id);

    let atual = find_turma(db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Turma não encontrada com ID: {}", id)))?;

    // O código só pode repetir o da própria turma
    if codigo_em_uso(db_pool, &payload.codigo, Some(id)).await? {
        return Err(AppError::conflict(format!(
            "Já existe uma turma com o código: {}",
            payload.codigo
        )));
    }

    sqlx::query(
        r#"
        UPDATE turmas SET nome = ?1, codigo = ?2, descricao = ?3, ativa = ?4
        WHERE id = ?5
        "#,
    )
    .bind(&payload.nome)
    .bind(&payload.codigo)
    .bind(&payload.descricao)
    .bind(payload.ativa.unwrap_or(atual.ativa))
    .bind(id)
    .execute(db_pool)
    .await
    .map_err(|e| {
        if violacao_unicidade(&e) {
            AppError::conflict(format!("Já existe uma turma com o código: {}", payload.codigo))
        } else {
            e.into()
        }
    })?;

    buscar_por_id(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

/// Remoção lógica: a turma fica inativa mas os dados mantêm-se.
pub async fn remover_turma(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("UPDATE turmas SET ativa = 0 WHERE id = ?")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao desativar turma: '{}' não encontrada.", id);
        return Err(AppError::not_found(format!("Turma não encontrada com ID: {}", id)));
    }
    tracing::info!("Turma {} desativada.", id);
    Ok(())
}

/// Remoção definitiva. Alunos, presenças e chamadas da turma vão em CASCADE.
pub async fn excluir_turma(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM turmas WHERE id = ?")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(format!("Turma não encontrada com ID: {}", id)));
    }
    tracing::info!("Turma {} excluída permanentemente.", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{novo_aluno, nova_turma, pool_de_teste};

    fn payload(nome: &str, codigo: &str) -> TurmaPayload {
        TurmaPayload {
            nome: nome.to_string(),
            codigo: codigo.to_string(),
            descricao: Some("Turma da manhã".to_string()),
            ativa: None,
        }
    }

    #[tokio::test]
    async fn criar_turma_ativa_por_omissao() {
        let pool = pool_de_teste().await;
        let turma = criar_turma(&pool, &payload("Rust I", "RS1")).await.unwrap();
        assert!(turma.ativa);
        assert_eq!(turma.total_alunos, 0);
        assert_eq!(turma.total_presencas, 0);
    }

    #[tokio::test]
    async fn codigo_duplicado_da_conflito() {
        let pool = pool_de_teste().await;
        criar_turma(&pool, &payload("Rust I", "RS1")).await.unwrap();
        let err = criar_turma(&pool, &payload("Outra", "RS1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn atualizar_pode_manter_o_proprio_codigo_mas_nao_o_de_outra() {
        let pool = pool_de_teste().await;
        let a = criar_turma(&pool, &payload("A", "A1")).await.unwrap();
        criar_turma(&pool, &payload("B", "B1")).await.unwrap();

        let ok = atualizar_turma(&pool, a.id, &payload("A renomeada", "A1")).await.unwrap();
        assert_eq!(ok.nome, "A renomeada");

        let err = atualizar_turma(&pool, a.id, &payload("A", "B1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = atualizar_turma(&pool, 999, &payload("X", "X1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn remocao_logica_esconde_das_ativas() {
        let pool = pool_de_teste().await;
        let id = nova_turma(&pool, "T1").await;
        nova_turma(&pool, "T2").await;

        remover_turma(&pool, id).await.unwrap();

        let ativas = listar_turmas_ativas(&pool).await.unwrap();
        assert_eq!(ativas.len(), 1);
        assert_eq!(listar_todas_turmas(&pool).await.unwrap().len(), 2);
        assert!(!buscar_por_id(&pool, id).await.unwrap().unwrap().ativa);
    }

    #[tokio::test]
    async fn exclusao_definitiva_apaga_alunos_em_cascata() {
        let pool = pool_de_teste().await;
        let id = nova_turma(&pool, "T1").await;
        novo_aluno(&pool, id, "M1", "Ana").await;

        excluir_turma(&pool, id).await.unwrap();

        let alunos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alunos")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(alunos, 0);
        assert!(matches!(
            excluir_turma(&pool, id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn total_alunos_conta_apenas_ativos() {
        let pool = pool_de_teste().await;
        let id = nova_turma(&pool, "T1").await;
        novo_aluno(&pool, id, "M1", "Ana").await;
        let inativo = novo_aluno(&pool, id, "M2", "Bruno").await;
        crate::services::aluno_service::remover_aluno(&pool, inativo).await.unwrap();

        let turma = buscar_por_codigo(&pool, "T1").await.unwrap().unwrap();
        assert_eq!(turma.total_alunos, 1);
    }

    #[tokio::test]
    async fn busca_por_nome_ignora_maiusculas() {
        let pool = pool_de_teste().await;
        criar_turma(&pool, &payload("Programação Avançada", "PA")).await.unwrap();
        criar_turma(&pool, &payload("Redes", "RD")).await.unwrap();

        let achadas = buscar_por_nome(&pool, "AVAN").await.unwrap();
        assert_eq!(achadas.len(), 1);
        assert_eq!(achadas[0].codigo, "PA");
    }

    #[tokio::test]
    async fn atualizar_sem_estado_mantem_a_turma_inativa() {
        let pool = pool_de_teste().await;
        let turma = criar_turma(&pool, &payload("Rust I", "RS1")).await.unwrap();
        remover_turma(&pool, turma.id).await.unwrap();

        let linha = find_turma(&pool, turma.id).await.unwrap().unwrap();
        assert_eq!((linha.nome.as_str(), linha.ativa), ("Rust I", false));

        let atualizada = atualizar_turma(&pool, turma.id, &payload("Rust II", "RS1"))
            .await
            .unwrap();
        assert!(!atualizada.ativa);
        assert_eq!(atualizada.nome, "Rust II");
    }
}
