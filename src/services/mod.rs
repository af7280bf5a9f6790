// src/services/mod.rs
pub mod aluno_service;
pub mod chamada_mentor_service;
pub mod chamada_service;
pub mod mentor_service;
pub mod presenca_service;
pub mod relatorio_service;
pub mod turma_service;
