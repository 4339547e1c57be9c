// src/imagens/imagem_router.rs

use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::erros::AppError;
use crate::shared::shared_structs::GenericResponse;
use crate::AppState;

use super::armazenamento::PASTA_ANUNCIOS;

/// Parâmetros de query do upload.
#[derive(Deserialize)]
pub struct UploadQuery {
    /// Nome original do arquivo, usado apenas para a extensão.
    #[serde(default)]
    pub nome: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub tamanho: usize,
}

/// Rota para enviar uma imagem. O corpo da requisição é o próprio arquivo.
#[post("/imagens")]
pub async fn enviar_imagem(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    corpo: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let imagem = data
        .armazenamento
        .salvar(&query.nome, content_type, &corpo)
        .await?;

    info!(
        caminho = %imagem.caminho,
        tamanho = imagem.tamanho,
        "imagem armazenada"
    );

    Ok(HttpResponse::Created().json(GenericResponse::sucesso(
        "Imagem enviada com sucesso.",
        UploadResponse {
            url: imagem.url_publica,
            tamanho: imagem.tamanho,
        },
    )))
}

/// Rota para servir uma imagem de anúncio.
#[get("/imagens/anuncios/{arquivo}")]
pub async fn servir_imagem(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let arquivo = path.into_inner();
    let (conteudo, mime) = data
        .armazenamento
        .ler(&format!("{PASTA_ANUNCIOS}/{arquivo}"))
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, mime))
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(conteudo))
}
