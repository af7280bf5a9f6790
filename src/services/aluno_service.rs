// src/services/aluno_service.rs
use crate::{
    error::{violacao_unicidade, AppError, AppResult},
    models::aluno::{Aluno, AlunoPayload, AlunoResumo},
    services::turma_service,
};
use chrono::Local;
use sqlx::{SqliteExecutor, SqlitePool};

const SELECT_ALUNO_RESUMO: &str = r#"
    SELECT
        a.id, a.nome, a.matricula, a.email, a.turma_id,
        t.nome AS turma_nome, t.codigo AS turma_codigo,
        a.ativo, a.data_cadastro,
        (SELECT COUNT(*) FROM presencas p WHERE p.aluno_id = a.id) AS total_presencas
    FROM alunos a
    JOIN turmas t ON t.id = a.turma_id
"#;

/// Busca a linha crua do aluno (pool ou transação).
pub async fn find_aluno<'e>(db: impl SqliteExecutor<'e>, aluno_id: i64) -> AppResult<Option<Aluno>> {
    let aluno = sqlx::query_as::<_, Aluno>(
        r#"
        SELECT id, nome, turma_id, ativo
        FROM alunos
        WHERE id = ?
        "#,
    )
    .bind(aluno_id)
    .fetch_optional(db)
    .await?;
    Ok(aluno)
}

async fn listar_onde(
    db_pool: &SqlitePool,
    filtro: &str,
    binds: &[&str],
) -> AppResult<Vec<AlunoResumo>> {
    let sql = format!("{SELECT_ALUNO_RESUMO} {filtro} ORDER BY a.nome ASC");
    let mut query = sqlx::query_as::<_, AlunoResumo>(&sql);
    for valor in binds {
        query = query.bind(*valor);
    }
    Ok(query.fetch_all(db_pool).await?)
}

pub async fn listar_alunos_ativos(db_pool: &SqlitePool) -> AppResult<Vec<AlunoResumo>> {
    tracing::debug!("Buscando alunos ativos...");
    listar_onde(db_pool, "WHERE a.ativo = 1", &[]).await
}

pub async fn listar_todos_alunos(db_pool: &SqlitePool) -> AppResult<Vec<AlunoResumo>> {
    tracing::debug!("Buscando todos os alunos...");
    listar_onde(db_pool, "", &[]).await
}

/// Alunos ativos de uma turma
pub async fn listar_alunos_por_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<Vec<AlunoResumo>> {
    tracing::debug!("Buscando alunos ativos da turma {}", turma_id);
    let sql = format!("{SELECT_ALUNO_RESUMO} WHERE a.turma_id = ? AND a.ativo = 1 ORDER BY a.nome ASC");
    let alunos = sqlx::query_as::<_, AlunoResumo>(&sql)
        .bind(turma_id)
        .fetch_all(db_pool)
        .await?;
    Ok(alunos)
}

pub async fn buscar_por_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<AlunoResumo>> {
    let sql = format!("{SELECT_ALUNO_RESUMO} WHERE a.id = ?");
    let aluno = sqlx::query_as::<_, AlunoResumo>(&sql)
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(aluno)
}

pub async fn buscar_por_matricula(db_pool: &SqlitePool, matricula: &str) -> AppResult<Option<AlunoResumo>> {
    Ok(listar_onde(db_pool, "WHERE a.matricula = ?", &[matricula])
        .await?
        .into_iter()
        .next())
}

pub async fn buscar_por_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<AlunoResumo>> {
    Ok(listar_onde(db_pool, "WHERE a.email = ?", &[email])
        .await?
        .into_iter()
        .next())
}

pub async fn buscar_por_nome(db_pool: &SqlitePool, nome: &str) -> AppResult<Vec<AlunoResumo>> {
    listar_onde(
        db_pool,
        "WHERE LOWER(a.nome) LIKE '%' || LOWER(?) || '%'",
        &[nome.trim()],
    )
    .await
}

pub async fn buscar_por_turma_e_nome(
    db_pool: &SqlitePool,
    turma_id: i64,
    nome: &str,
) -> AppResult<Vec<AlunoResumo>> {
    let sql = format!(
        "{SELECT_ALUNO_RESUMO} WHERE a.turma_id = ? AND LOWER(a.nome) LIKE '%' || LOWER(?) || '%' ORDER BY a.nome ASC"
    );
    let alunos = sqlx::query_as::<_, AlunoResumo>(&sql)
        .bind(turma_id)
        .bind(nome.trim())
        .fetch_all(db_pool)
        .await?;
    Ok(alunos)
}

/// Verifica matrícula e email únicos (ignorando o próprio aluno na atualização).
async fn validar_unicidade(
    db_pool: &SqlitePool,
    payload: &AlunoPayload,
    excluir_id: Option<i64>,
) -> AppResult<()> {
    let matricula_em_uso: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM alunos WHERE matricula = ?1 AND (?2 IS NULL OR id <> ?2))",
    )
    .bind(&payload.matricula)
    .bind(excluir_id)
    .fetch_one(db_pool)
    .await?;
    if matricula_em_uso {
        return Err(AppError::conflict(format!(
            "Já existe um aluno com a matrícula: {}",
            payload.matricula
        )));
    }

    let email_em_uso: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM alunos WHERE email = ?1 AND (?2 IS NULL OR id <> ?2))",
    )
    .bind(&payload.email)
    .bind(excluir_id)
    .fetch_one(db_pool)
    .await?;
    if email_em_uso {
        return Err(AppError::conflict(format!(
            "Já existe um aluno com o email: {}",
            payload.email
        )));
    }
    Ok(())
}

fn conflito_de_insercao(e: sqlx::Error) -> AppError {
    if violacao_unicidade(&e) {
        AppError::conflict("Já existe um aluno com esta matrícula ou email")
    } else {
        e.into()
    }
}

async fn validar_turma(db_pool: &SqlitePool, payload: &AlunoPayload) -> AppResult<i64> {
    let turma_id = payload
        .turma_id
        .ok_or_else(|| AppError::validation("ID da turma é obrigatório"))?;
    if turma_service::find_turma(db_pool, turma_id).await?.is_none() {
        return Err(AppError::not_found(format!(
            "Turma não encontrada com ID: {}",
            turma_id
        )));
    }
    Ok(turma_id)
}

pub async fn criar_aluno(db_pool: &SqlitePool, payload: &AlunoPayload) -> AppResult<AlunoResumo> {
    tracing::info!("Criando aluno com matrícula '{}'", payload.matricula);

    let turma_id = validar_turma(db_pool, payload).await?;
    validar_unicidade(db_pool, payload, None).await?;

    let id = sqlx::query(
        r#"
        INSERT INTO alunos (nome, matricula, email, turma_id, ativo, data_cadastro)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&payload.nome)
    .bind(&payload.matricula)
    .bind(&payload.email)
    .bind(turma_id)
    .bind(payload.ativo.unwrap_or(true))
    .bind(Local::now().naive_local())
    .execute(db_pool)
    .await
    .map_err(conflito_de_insercao)?
    .last_insert_rowid();

    tracing::info!("✅ Aluno '{}' criado (id {}).", payload.matricula, id);
    buscar_por_id(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

pub async fn atualizar_aluno(
    db_pool: &SqlitePool,
    id: i64,
    payload: &AlunoPayload,
) -> AppResult<AlunoResumo> {
    tracing::info!("Atualizando aluno {}", id);

    let atual = find_aluno(db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Aluno não encontrado com ID: {}", id)))?;
    let turma_id = validar_turma(db_pool, payload).await?;
    validar_unicidade(db_pool, payload, Some(id)).await?;

    sqlx::query(
        r#"
        UPDATE alunos
        SET nome = ?1, matricula = ?2, email = ?3, turma_id = ?4, ativo = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&payload.nome)
    .bind(&payload.matricula)
    .bind(&payload.email)
    .bind(turma_id)
    .bind(payload.ativo.unwrap_or(atual.ativo))
    .bind(id)
    .execute(db_pool)
    .await
    .map_err(conflito_de_insercao)?;

    buscar_por_id(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

/// Remoção lógica (ativo = false)
pub async fn remover_aluno(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("UPDATE alunos SET ativo = 0 WHERE id = ?")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao desativar aluno: '{}' não encontrado.", id);
        return Err(AppError::not_found(format!("Aluno não encontrado com ID: {}", id)));
    }
    tracing::info!("Aluno {} desativado.", id);
    Ok(())
}

/// Remoção definitiva; presenças e registos de chamada do aluno vão em CASCADE.
pub async fn excluir_aluno(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM alunos WHERE id = ?")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::not_found(format!("Aluno não encontrado com ID: {}", id)));
    }
    tracing::info!("Aluno {} excluído permanentemente.", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{nova_turma, novo_aluno, pool_de_teste};

    fn payload(turma_id: i64, matricula: &str, email: &str) -> AlunoPayload {
        AlunoPayload {
            nome: "Carla Matos".to_string(),
            matricula: matricula.to_string(),
            email: email.to_string(),
            turma_id: Some(turma_id),
            ativo: None,
        }
    }

    #[tokio::test]
    async fn criar_aluno_em_turma_inexistente_falha() {
        let pool = pool_de_teste().await;
        let err = criar_aluno(&pool, &payload(42, "M1", "c@x.pt")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn criar_aluno_traz_dados_da_turma() {
        let pool = pool_de_teste().await;
        let turma = nova_turma(&pool, "T1").await;
        let aluno = criar_aluno(&pool, &payload(turma, "M1", "c@x.pt")).await.unwrap();
        assert_eq!(aluno.turma_codigo, "T1");
        assert_eq!(aluno.turma_nome, "Turma T1");
        assert!(aluno.ativo);
        assert_eq!(aluno.total_presencas, 0);
    }

    #[tokio::test]
    async fn matricula_e_email_sao_unicos() {
        let pool = pool_de_teste().await;
        let turma = nova_turma(&pool, "T1").await;
        criar_aluno(&pool, &payload(turma, "M1", "c@x.pt")).await.unwrap();

        let err = criar_aluno(&pool, &payload(turma, "M1", "outro@x.pt")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("matrícula")));

        let err = criar_aluno(&pool, &payload(turma, "M2", "c@x.pt")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("email")));
    }

    #[tokio::test]
    async fn atualizar_ignora_o_proprio_aluno_na_unicidade() {
        let pool = pool_de_teste().await;
        let turma = nova_turma(&pool, "T1").await;
        let outra = nova_turma(&pool, "T2").await;
        let aluno = criar_aluno(&pool, &payload(turma, "M1", "c@x.pt")).await.unwrap();

        let atualizado = atualizar_aluno(&pool, aluno.id, &payload(outra, "M1", "c@x.pt"))
            .await
            .unwrap();
        assert_eq!(atualizado.turma_id, outra);
    }

    #[tokio::test]
    async fn remocao_logica_e_definitiva() {
        let pool = pool_de_teste().await;
        let turma = nova_turma(&pool, "T1").await;
        let a1 = novo_aluno(&pool, turma, "M1", "Ana").await;
        let a2 = novo_aluno(&pool, turma, "M2", "Bruno").await;

        remover_aluno(&pool, a1).await.unwrap();
        assert_eq!(listar_alunos_ativos(&pool).await.unwrap().len(), 1);
        assert_eq!(listar_alunos_por_turma(&pool, turma).await.unwrap().len(), 1);
        assert_eq!(listar_todos_alunos(&pool).await.unwrap().len(), 2);

        excluir_aluno(&pool, a2).await.unwrap();
        assert!(buscar_por_id(&pool, a2).await.unwrap().is_none());
        assert!(matches!(
            remover_aluno(&pool, a2).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn pesquisas_por_matricula_email_e_nome() {
        let pool = pool_de_teste().await;
        let turma = nova_turma(&pool, "T1").await;
        novo_aluno(&pool, turma, "M1", "Ana Sousa").await;
        novo_aluno(&pool, turma, "M2", "Bruno Lima").await;

        assert!(buscar_por_matricula(&pool, "M2").await.unwrap().is_some());
        assert!(buscar_por_email(&pool, "m1@escola.pt").await.unwrap().is_some());
        assert_eq!(buscar_por_nome(&pool, "sousa").await.unwrap().len(), 1);
        assert_eq!(buscar_por_turma_e_nome(&pool, turma, "a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn atualizar_sem_estado_mantem_o_aluno_inativo() {
        let pool = pool_de_teste().await;
        let turma = nova_turma(&pool, "T1").await;
        let aluno = criar_aluno(&pool, &payload(turma, "M1", "c@x.pt")).await.unwrap();
        remover_aluno(&pool, aluno.id).await.unwrap();

        let linha = find_aluno(&pool, aluno.id).await.unwrap().unwrap();
        assert_eq!((linha.turma_id, linha.ativo), (turma, false));

        let atualizado = atualizar_aluno(&pool, aluno.id, &payload(turma, "M1", "novo@x.pt"))
            .await
            .unwrap();
        assert!(!atualizado.ativo);
        assert_eq!(atualizado.email, "novo@x.pt");
        assert!(find_aluno(&pool, 999).await.unwrap().is_none());
    }
}
