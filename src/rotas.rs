// src/rotas.rs

use actix_web::{get, web, HttpResponse};

use crate::anuncios::anuncio_router;
use crate::categorias::categoria_router;
use crate::imagens::{armazenamento::TAMANHO_MAXIMO, imagem_router};
use crate::moderacao::moderacao_router;
use crate::shared::shared_structs::GenericResponse;
use crate::usuarios::usuario_router;

/// Verificação de vida do servidor.
#[get("/saude")]
pub async fn saude() -> HttpResponse {
    HttpResponse::Ok().json(GenericResponse::sucesso(
        "Servidor no ar.",
        serde_json::json!({ "versao": env!("CARGO_PKG_VERSION") }),
    ))
}

/// Registra todas as rotas. Usado pelo `main` e pelos testes.
pub fn configurar_rotas(cfg: &mut web::ServiceConfig) {
    cfg
        // Uploads de imagem chegam como corpo bruto
        .app_data(web::PayloadConfig::new(TAMANHO_MAXIMO))
        .service(saude)

        // Módulo de Categorias
        .service(categoria_router::buscar_categorias)
        .service(categoria_router::buscar_categoria_por_id)
        .service(categoria_router::cadastrar_categoria)
        .service(categoria_router::atualizar_categoria)
        .service(categoria_router::deletar_categoria)

        // Módulo de Anúncios (público)
        .service(anuncio_router::listar_anuncios)
        .service(anuncio_router::buscar_anuncio)
        .service(anuncio_router::submeter_anuncio)

        // Módulo de Imagens
        .service(imagem_router::enviar_imagem)
        .service(imagem_router::servir_imagem)

        // Módulo de Usuários
        .service(usuario_router::cadastrar_usuario)
        .service(usuario_router::login_usuario)
        .service(usuario_router::logout_usuario)
        .service(usuario_router::usuario_atual)

        // Painel do administrador. As listagens vêm antes de /admin/anuncios/{id}
        .service(moderacao_router::listar_pendentes)
        .service(moderacao_router::listar_aprovados)
        .service(moderacao_router::detalhes_anuncio)
        .service(moderacao_router::aprovar_anuncio)
        .service(moderacao_router::rejeitar_anuncio)
        .service(moderacao_router::editar_e_aprovar_anuncio)
        .service(moderacao_router::excluir_anuncio);
}
