// src/web/mod.rs
pub mod aluno_handlers;
pub mod chamada_handlers;
pub mod chamada_mentor_handlers;
pub mod extractors;
pub mod mentor_handlers;
pub mod presenca_handlers;
pub mod relatorio_handlers;
pub mod routes;
pub mod turma_handlers;
