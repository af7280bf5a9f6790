// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        aluno_handlers, chamada_handlers, chamada_mentor_handlers, mentor_handlers,
        presenca_handlers, relatorio_handlers, turma_handlers,
    },
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Turmas ---
    let turma_routes = Router::new()
        .route("/", get(turma_handlers::listar_ativas).post(turma_handlers::criar))
        .route("/todas", get(turma_handlers::listar_todas))
        .route("/buscar", get(turma_handlers::buscar_por_nome))
        .route("/codigo/{codigo}", get(turma_handlers::buscar_por_codigo))
        .route(
            "/{id}",
            get(turma_handlers::buscar_por_id)
                .put(turma_handlers::atualizar)
                .delete(turma_handlers::remover),
        )
        .route("/{id}/permanente", delete(turma_handlers::excluir));

    // --- Alunos ---
    let aluno_routes = Router::new()
        .route("/", get(aluno_handlers::listar_ativos).post(aluno_handlers::criar))
        .route("/todos", get(aluno_handlers::listar_todos))
        .route("/buscar", get(aluno_handlers::buscar_por_nome))
        .route("/turma/{turma_id}", get(aluno_handlers::listar_por_turma))
        .route("/turma/{turma_id}/buscar", get(aluno_handlers::buscar_por_turma_e_nome))
        .route("/matricula/{matricula}", get(aluno_handlers::buscar_por_matricula))
        .route("/email/{email}", get(aluno_handlers::buscar_por_email))
        .route(
            "/{id}",
            get(aluno_handlers::buscar_por_id)
                .put(aluno_handlers::atualizar)
                .delete(aluno_handlers::remover),
        )
        .route("/{id}/permanente", delete(aluno_handlers::excluir));

    // --- Presenças avulsas ---
    let presenca_routes = Router::new()
        .route("/", get(presenca_handlers::listar_todas).post(presenca_handlers::registrar))
        .route("/rapida", post(presenca_handlers::registrar_rapida))
        .route("/periodo", get(presenca_handlers::listar_por_periodo))
        .route("/relatorio", get(presenca_handlers::relatorio))
        .route("/data/{data}", get(presenca_handlers::listar_por_data))
        .route("/turma/{turma_id}", get(presenca_handlers::listar_por_turma))
        .route("/turma/{turma_id}/data/{data}", get(presenca_handlers::listar_por_turma_e_data))
        .route("/turma/{turma_id}/contar", get(presenca_handlers::contar_por_turma))
        .route("/aluno/{aluno_id}", get(presenca_handlers::listar_por_aluno))
        .route("/aluno/{aluno_id}/contar", get(presenca_handlers::contar_por_aluno))
        .route(
            "/{id}",
            get(presenca_handlers::buscar_por_id)
                .put(presenca_handlers::atualizar)
                .delete(presenca_handlers::remover),
        );

    // --- Chamadas de turma ---
    let chamada_routes = Router::new()
        .route("/", get(chamada_handlers::listar).post(chamada_handlers::criar))
        .route("/periodo", get(chamada_handlers::listar_por_periodo))
        .route("/turma/{turma_id}", get(chamada_handlers::listar_por_turma))
        .route("/turma/{turma_id}/periodo", get(chamada_handlers::listar_por_turma_e_periodo))
        .route("/turma/{turma_id}/data/{data}", get(chamada_handlers::buscar_por_turma_e_data))
        .route(
            "/{id}",
            get(chamada_handlers::buscar_por_id)
                .put(chamada_handlers::atualizar)
                .delete(chamada_handlers::remover),
        );

    // --- Chamadas de mentores ---
    let chamada_mentor_routes = Router::new()
        .route("/", get(chamada_mentor_handlers::listar).post(chamada_mentor_handlers::criar))
        .route("/estatisticas", get(chamada_mentor_handlers::estatisticas))
        .route("/periodo", get(chamada_mentor_handlers::listar_por_periodo))
        .route("/data/{data}", get(chamada_mentor_handlers::buscar_por_data))
        .route(
            "/{id}",
            get(chamada_mentor_handlers::buscar_por_id)
                .put(chamada_mentor_handlers::atualizar)
                .delete(chamada_mentor_handlers::remover),
        );

    // --- Mentores ---
    let mentor_routes = Router::new()
        .route("/", get(mentor_handlers::listar_todos).post(mentor_handlers::criar))
        .route("/ativos", get(mentor_handlers::listar_ativos))
        .route("/estatisticas", get(mentor_handlers::estatisticas))
        .route("/buscar", get(mentor_handlers::buscar_por_nome))
        .route("/tipo/{tipo}", get(mentor_handlers::listar_por_tipo))
        .route("/email/{email}", get(mentor_handlers::buscar_por_email))
        .route(
            "/{id}",
            get(mentor_handlers::buscar_por_id)
                .put(mentor_handlers::atualizar)
                .delete(mentor_handlers::remover),
        )
        .route("/{id}/reativar", put(mentor_handlers::reativar));

    // --- Relatórios CSV / Excel ---
    let relatorio_routes = Router::new()
        .route("/presencas/csv", get(relatorio_handlers::presencas_csv))
        .route("/presencas/excel", get(relatorio_handlers::presencas_excel))
        .route("/alunos/csv", get(relatorio_handlers::alunos_csv))
        .route("/alunos/excel", get(relatorio_handlers::alunos_excel))
        .route("/turmas/csv", get(relatorio_handlers::turmas_csv))
        .route("/turmas/excel", get(relatorio_handlers::turmas_excel));

    // --- Router Final ---
    Router::new()
        .nest("/turmas", turma_routes)
        .nest("/alunos", aluno_routes)
        .nest("/presencas", presenca_routes)
        .nest("/relatorios", relatorio_routes)
        .nest("/api/chamadas", chamada_routes)
        .nest("/api/chamadas-mentores", chamada_mentor_routes)
        .nest("/api/mentores", mentor_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{nova_turma, novo_aluno, novo_mentor, pool_de_teste};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn enviar(app: &Router, metodo: &str, uri: &str, corpo: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(metodo).uri(uri);
        let request = match corpo {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let valor = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, valor)
    }

    async fn montar_app() -> (Router, sqlx::SqlitePool) {
        let pool = pool_de_teste().await;
        let router = create_router(AppState {
            db_pool: pool.clone(),
        });
        (router, pool)
    }

    #[tokio::test]
    async fn fluxo_da_chamada_de_turma() {
        let (app, pool) = montar_app().await;
        let c1 = nova_turma(&pool, "C1").await;
        let a1 = novo_aluno(&pool, c1, "A1", "Alice").await;
        let a2 = novo_aluno(&pool, c1, "A2", "Bruno").await;

        let corpo = json!({
            "turmaId": c1,
            "dataChamada": "2024-03-01",
            "alunos": [
                { "alunoId": a1, "presente": true },
                { "alunoId": a2, "presente": false }
            ]
        });
        let (status, chamada) = enviar(&app, "POST", "/api/chamadas", Some(corpo.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(chamada["totalAlunos"], 2);
        assert_eq!(chamada["totalPresentes"], 1);
        assert_eq!(chamada["totalFaltas"], 1);
        assert_eq!(chamada["turmaCodigo"], "C1");
        assert_eq!(chamada["alunos"][0]["alunoNome"], "Alice");

        // Mesma turma, mesmo dia
        let (status, erro) = enviar(&app, "POST", "/api/chamadas", Some(corpo)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["codigo"], "CONFLITO");

        let (status, _) = enviar(&app, "GET", &format!("/api/chamadas/turma/{}/data/2024-03-01", c1), None).await;
        assert_eq!(status, StatusCode::OK);

        let id = chamada["id"].as_i64().unwrap();
        let (status, _) = enviar(&app, "DELETE", &format!("/api/chamadas/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = enviar(&app, "GET", &format!("/api/chamadas/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn corpo_sem_campos_obrigatorios_da_400() {
        let (app, _pool) = montar_app().await;

        let (status, erro) = enviar(&app, "POST", "/api/chamadas", Some(json!({ "alunos": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["codigo"], "VALIDACAO");

        let (status, _) = enviar(
            &app,
            "POST",
            "/turmas",
            Some(json!({ "nome": "", "codigo": "X" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn crud_de_turma_pela_api() {
        let (app, _pool) = montar_app().await;

        let (status, turma) = enviar(
            &app,
            "POST",
            "/turmas",
            Some(json!({ "nome": "Rust I", "codigo": "RS1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(turma["ativa"], true);
        assert_eq!(turma["totalAlunos"], 0);

        let (status, achada) = enviar(&app, "GET", "/turmas/codigo/RS1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(achada["nome"], "Rust I");

        let (status, _) = enviar(&app, "GET", "/turmas/codigo/NADA", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let id = turma["id"].as_i64().unwrap();
        let (status, _) = enviar(&app, "DELETE", &format!("/turmas/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, ativas) = enviar(&app, "GET", "/turmas", None).await;
        assert_eq!(ativas.as_array().unwrap().len(), 0);
        let (_, todas) = enviar(&app, "GET", "/turmas/todas", None).await;
        assert_eq!(todas.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn chamada_de_mentores_e_estatisticas() {
        let (app, pool) = montar_app().await;
        let m1 = novo_mentor(&pool, "Marta", "MENTOR").await;
        let m2 = novo_mentor(&pool, "Nuno", "MENTOR_TRAINEE").await;

        let (status, chamada) = enviar(
            &app,
            "POST",
            "/api/chamadas-mentores",
            Some(json!({
                "dataChamada": "2024-03-01",
                "participantes": [
                    { "mentorId": m1, "presente": true },
                    { "mentorId": m2 }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(chamada["totalMentores"], 2);
        assert_eq!(chamada["totalAusentes"], 1);
        assert_eq!(chamada["participantes"][1]["mentorTipoDescricao"], "Mentor-trainee");

        let (status, stats) = enviar(&app, "GET", "/api/chamadas-mentores/estatisticas", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalChamadas"], 1);

        let (status, _) = enviar(&app, "GET", "/api/chamadas-mentores/data/2024-03-02", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, erro) = enviar(&app, "GET", "/api/mentores/tipo/coach", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["mensagem"], "Tipo de mentor inválido: coach");
    }

    #[tokio::test]
    async fn presenca_rapida_e_csv() {
        let (app, pool) = montar_app().await;
        let c1 = nova_turma(&pool, "C1").await;
        let a1 = novo_aluno(&pool, c1, "A1", "Alice").await;

        let corpo = json!({ "alunoId": a1, "turmaId": c1 });
        let (status, _) = enviar(&app, "POST", "/presencas/rapida", Some(corpo.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = enviar(&app, "POST", "/presencas/rapida", Some(corpo)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, total) = enviar(&app, "GET", &format!("/presencas/turma/{}/contar", c1), None).await;
        assert_eq!(total, 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/relatorios/presencas/csv?dataInicio=2024-01-01&dataFim=2099-12-31")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"relatorio-presencas_01-01-2024_31-12-2099.csv\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[tokio::test]
    async fn excel_de_alunos_com_nome_da_turma_no_ficheiro() {
        let (app, pool) = montar_app().await;
        let c1 = nova_turma(&pool, "C1").await;
        novo_aluno(&pool, c1, "A1", "Alice").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/relatorios/alunos/excel?turmaId={}", c1))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            format!("attachment; filename=\"relatorio-alunos_turma-{}.xlsx\"", c1).as_str()
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));

        let (status, _) = enviar(&app, "GET", "/relatorios/turmas/excel", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn pedidos_malformados_usam_o_envelope_de_erro() {
        let (app, pool) = montar_app().await;
        let c1 = nova_turma(&pool, "C1").await;
        let a1 = novo_aluno(&pool, c1, "A1", "Alice").await;
        let (_, chamada) = enviar(
            &app,
            "POST",
            "/api/chamadas",
            Some(json!({ "turmaId": c1, "dataChamada": "2024-03-01", "alunos": [{ "alunoId": a1 }] })),
        )
        .await;
        let id = chamada["id"].as_i64().unwrap();

        // Tipo errado no corpo do PUT
        let (status, erro) = enviar(
            &app,
            "PUT",
            &format!("/api/chamadas/{}", id),
            Some(json!({ "alunos": [{ "alunoId": "x" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["codigo"], "VALIDACAO");

        // Presença rápida sem aluno
        let (status, erro) = enviar(&app, "POST", "/presencas/rapida", Some(json!({ "turmaId": c1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["mensagem"], "ID do aluno é obrigatório");

        // Data impossível na query string
        let (status, erro) = enviar(
            &app,
            "GET",
            "/api/chamadas/periodo?dataInicio=2024-13-01&dataFim=2024-03-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["codigo"], "VALIDACAO");

        // Id não numérico no caminho
        let (status, erro) = enviar(&app, "GET", "/api/chamadas/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(erro["erro"]["codigo"], "VALIDACAO");

        // O PUT rejeitado não alterou a chamada
        let (_, intacta) = enviar(&app, "GET", &format!("/api/chamadas/{}", id), None).await;
        assert_eq!(intacta["totalFaltas"], 1);
    }
}
