// src/services/relatorio_service.rs
//
// Exportação de relatórios em CSV (separador vírgula, com cabeçalho) e Excel
// (uma folha, cabeçalho a negrito, colunas ajustadas ao conteúdo).
use crate::{
    error::{AppError, AppResult},
    models::{
        aluno::AlunoResumo,
        presenca::{PresencaDetalhe, RelatorioParams},
        turma::TurmaResumo,
    },
    services::{aluno_service, presenca_service, turma_service},
};
use rust_xlsxwriter::{Format, Workbook};
use sqlx::SqlitePool;
use std::fmt;

const CABECALHO_PRESENCAS: &[&str] = &[
    "Data",
    "Hora",
    "Turma",
    "Código Turma",
    "Aluno",
    "Matrícula",
    "Observações",
];

const CABECALHO_ALUNOS: &[&str] = &[
    "Nome",
    "Matrícula",
    "Email",
    "Turma",
    "Código Turma",
    "Total Presenças",
    "Status",
];

const CABECALHO_TURMAS: &[&str] = &[
    "Nome",
    "Código",
    "Descrição",
    "Total Alunos",
    "Total Presenças",
    "Status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formato {
    Csv,
    Excel,
}

impl Formato {
    pub fn extensao(self) -> &'static str {
        match self {
            Formato::Csv => "csv",
            Formato::Excel => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Formato::Csv => "text/csv; charset=utf-8",
            Formato::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Celula {
    Texto(String),
    Numero(i64),
}

impl fmt::Display for Celula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Celula::Texto(texto) => f.write_str(texto),
            Celula::Numero(n) => write!(f, "{}", n),
        }
    }
}

fn texto(valor: impl Into<String>) -> Celula {
    Celula::Texto(valor.into())
}

/// Dados de um relatório antes de serem escritos num formato concreto.
struct Tabela {
    titulo: &'static str,
    cabecalho: &'static [&'static str],
    linhas: Vec<Vec<Celula>>,
}

impl Tabela {
    fn gerar(&self, formato: Formato) -> AppResult<Vec<u8>> {
        match formato {
            Formato::Csv => self.para_csv(),
            Formato::Excel => self.para_xlsx(),
        }
    }

    fn para_csv(&self) -> AppResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.cabecalho)?;
        for linha in &self.linhas {
            writer.write_record(linha.iter().map(|celula| celula.to_string()))?;
        }
        writer.into_inner().map_err(|e| {
            tracing::error!("Falha ao finalizar CSV: {}", e);
            AppError::InternalServerError
        })
    }

    fn para_xlsx(&self) -> AppResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let negrito = Format::new().set_bold();

        let folha = workbook.add_worksheet();
        folha.set_name(self.titulo)?;
        for (coluna, titulo) in self.cabecalho.iter().enumerate() {
            folha.write_string_with_format(0, coluna as u16, *titulo, &negrito)?;
        }
        for (indice, linha) in self.linhas.iter().enumerate() {
            let linha_folha = indice as u32 + 1;
            for (coluna, celula) in linha.iter().enumerate() {
                match celula {
                    Celula::Texto(valor) => folha.write_string(linha_folha, coluna as u16, valor)?,
                    Celula::Numero(n) => folha.write_number(linha_folha, coluna as u16, *n as f64)?,
                };
            }
        }
        folha.autofit();

        Ok(workbook.save_to_buffer()?)
    }
}

fn tabela_presencas(presencas: &[PresencaDetalhe]) -> Tabela {
    let linhas = presencas
        .iter()
        .map(|p| {
            vec![
                texto(p.data_presenca.format("%d/%m/%Y").to_string()),
                texto(p.hora_presenca.format("%H:%M").to_string()),
                texto(p.turma_nome.as_str()),
                texto(p.turma_codigo.as_str()),
                texto(p.aluno_nome.as_str()),
                texto(p.aluno_matricula.as_str()),
                texto(p.observacoes.as_deref().unwrap_or("")),
            ]
        })
        .collect();
    Tabela {
        titulo: "Relatório de Presenças",
        cabecalho: CABECALHO_PRESENCAS,
        linhas,
    }
}

fn tabela_alunos(alunos: &[AlunoResumo]) -> Tabela {
    let linhas = alunos
        .iter()
        .map(|a| {
            vec![
                texto(a.nome.as_str()),
                texto(a.matricula.as_str()),
                texto(a.email.as_str()),
                texto(a.turma_nome.as_str()),
                texto(a.turma_codigo.as_str()),
                Celula::Numero(a.total_presencas),
                texto(if a.ativo { "Ativo" } else { "Inativo" }),
            ]
        })
        .collect();
    Tabela {
        titulo: "Relatório de Alunos",
        cabecalho: CABECALHO_ALUNOS,
        linhas,
    }
}

fn tabela_turmas(turmas: &[TurmaResumo]) -> Tabela {
    let linhas = turmas
        .iter()
        .map(|t| {
            vec![
                texto(t.nome.as_str()),
                texto(t.codigo.as_str()),
                texto(t.descricao.as_deref().unwrap_or("")),
                Celula::Numero(t.total_alunos),
                Celula::Numero(t.total_presencas),
                texto(if t.ativa { "Ativa" } else { "Inativa" }),
            ]
        })
        .collect();
    Tabela {
        titulo: "Relatório de Turmas",
        cabecalho: CABECALHO_TURMAS,
        linhas,
    }
}

/// Presenças com os mesmos filtros do relatório JSON.
pub async fn exportar_presencas(
    db_pool: &SqlitePool,
    filtros: &RelatorioParams,
    formato: Formato,
) -> AppResult<Vec<u8>> {
    let presencas = presenca_service::gerar_relatorio(db_pool, filtros).await?;
    tracing::info!("Exportando {} presenças para {}", presencas.len(), formato.extensao());
    tabela_presencas(&presencas).gerar(formato)
}

/// Alunos ativos de uma turma, ou de todas se `turma_id` for `None`.
pub async fn exportar_alunos(
    db_pool: &SqlitePool,
    turma_id: Option<i64>,
    formato: Formato,
) -> AppResult<Vec<u8>> {
    let alunos = match turma_id {
        Some(id) => aluno_service::listar_alunos_por_turma(db_pool, id).await?,
        None => aluno_service::listar_alunos_ativos(db_pool).await?,
    };
    tabela_alunos(&alunos).gerar(formato)
}

pub async fn exportar_turmas(db_pool: &SqlitePool, formato: Formato) -> AppResult<Vec<u8>> {
    let turmas = turma_service::listar_turmas_ativas(db_pool).await?;
    tabela_turmas(&turmas).gerar(formato)
}

/// `relatorio-presencas_<dd-mm-aaaa>_<dd-mm-aaaa>` quando o período está completo.
pub fn nome_ficheiro_presencas(filtros: &RelatorioParams, formato: Formato) -> String {
    match (filtros.data_inicio, filtros.data_fim) {
        (Some(inicio), Some(fim)) => format!(
            "relatorio-presencas_{}_{}.{}",
            inicio.format("%d-%m-%Y"),
            fim.format("%d-%m-%Y"),
            formato.extensao()
        ),
        _ => format!("relatorio-presencas.{}", formato.extensao()),
    }
}

pub fn nome_ficheiro_alunos(turma_id: Option<i64>, formato: Formato) -> String {
    match turma_id {
        Some(id) => format!("relatorio-alunos_turma-{}.{}", id, formato.extensao()),
        None => format!("relatorio-alunos.{}", formato.extensao()),
    }
}

pub fn nome_ficheiro_turmas(formato: Formato) -> String {
    format!("relatorio-turmas.{}", formato.extensao())
}
