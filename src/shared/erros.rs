// src/shared/erros.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use super::shared_structs::GenericResponse;
use crate::imagens::armazenamento::ErroArmazenamento;

/// Erro de validação de um campo de formulário.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErroCampo {
    pub campo: &'static str,
    pub mensagem: String,
}

impl ErroCampo {
    pub fn new(campo: &'static str, mensagem: impl Into<String>) -> Self {
        Self {
            campo,
            mensagem: mensagem.into(),
        }
    }
}

/// Erro único das rotas. Sempre renderizado no envelope `GenericResponse`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dados inválidos.")]
    Validacao(Vec<ErroCampo>),

    #[error("{0}")]
    RequisicaoInvalida(String),

    #[error("{0}")]
    NaoAutorizado(&'static str),

    #[error("Permissão negada.")]
    PermissaoNegada,

    #[error("{0}")]
    NaoEncontrado(String),

    #[error("{0}")]
    Conflito(String),

    #[error("Arquivo excede o tamanho máximo de 5MB.")]
    PayloadMuitoGrande,

    #[error("Formato de imagem inválido. Use JPG, PNG ou WEBP.")]
    TipoNaoSuportado,

    #[error("Erro interno no banco de dados.")]
    Banco(#[from] sqlx::Error),

    #[error("Erro interno no armazenamento de imagens.")]
    Armazenamento(#[source] ErroArmazenamento),

    #[error("Erro interno: {0}")]
    Interno(String),
}

impl From<ErroArmazenamento> for AppError {
    fn from(err: ErroArmazenamento) -> Self {
        match err {
            ErroArmazenamento::Vazio => {
                AppError::RequisicaoInvalida("Arquivo de imagem vazio.".to_string())
            }
            ErroArmazenamento::MuitoGrande { .. } => AppError::PayloadMuitoGrande,
            ErroArmazenamento::TipoNaoPermitido(_) => AppError::TipoNaoSuportado,
            ErroArmazenamento::CaminhoInvalido => {
                AppError::NaoEncontrado("Imagem não encontrada.".to_string())
            }
            ErroArmazenamento::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
                AppError::NaoEncontrado("Imagem não encontrada.".to_string())
            }
            outro => AppError::Armazenamento(outro),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validacao(_) | AppError::RequisicaoInvalida(_) => StatusCode::BAD_REQUEST,
            AppError::NaoAutorizado(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissaoNegada => StatusCode::FORBIDDEN,
            AppError::NaoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::Conflito(_) => StatusCode::CONFLICT,
            AppError::PayloadMuitoGrande => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TipoNaoSuportado => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Banco(_) | AppError::Armazenamento(_) | AppError::Interno(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Detalhes internos ficam só no log
        match self {
            AppError::Banco(e) => error!(error = ?e, "falha no banco de dados"),
            AppError::Armazenamento(e) => error!(error = ?e, "falha no armazenamento de imagens"),
            AppError::Interno(e) => error!(error = %e, "falha interna"),
            _ => {}
        }

        match self {
            AppError::Validacao(erros) => HttpResponse::build(status).json(GenericResponse {
                status: "error".to_string(),
                message: self.to_string(),
                body: Some(erros),
            }),
            AppError::Interno(_) => HttpResponse::build(status)
                .json(GenericResponse::erro("Erro interno do servidor.")),
            _ => HttpResponse::build(status).json(GenericResponse::erro(self.to_string())),
        }
    }
}

/// Verifica se o erro do banco é uma violação de unicidade (código 23505).
pub fn violacao_unicidade(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Verifica se o erro do banco é uma violação da chave estrangeira `restricao` (código 23503).
pub fn violacao_chave_estrangeira(e: &sqlx::Error, restricao: &str) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some("23503") && db.constraint() == Some(restricao)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_por_variante() {
        assert_eq!(AppError::PermissaoNegada.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NaoAutorizado("Token ausente.").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Conflito("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Banco(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn erros_de_armazenamento_viram_erros_de_cliente() {
        let e: AppError = ErroArmazenamento::MuitoGrande { limite: 10 }.into();
        assert_eq!(e.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        let e: AppError = ErroArmazenamento::TipoNaoPermitido("text/plain".into()).into();
        assert_eq!(e.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let e: AppError = ErroArmazenamento::Vazio.into();
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        let e: AppError = ErroArmazenamento::CaminhoInvalido.into();
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn validacao_lista_os_campos() {
        let erro = AppError::Validacao(vec![ErroCampo::new("titulo", "curto")]);
        let resposta = erro.error_response();
        assert_eq!(resposta.status(), StatusCode::BAD_REQUEST);

        let corpo = to_bytes(resposta.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&corpo).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["body"][0]["campo"], "titulo");
    }

    #[actix_web::test]
    async fn erro_interno_nao_vaza_detalhes() {
        let resposta = AppError::Interno("senha do banco: hunter2".into()).error_response();
        let corpo = to_bytes(resposta.into_body()).await.unwrap();
        let texto = String::from_utf8(corpo.to_vec()).unwrap();
        assert!(!texto.contains("hunter2"));
    }
}
