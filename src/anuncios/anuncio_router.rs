// src/anuncios/anuncio_router.rs

use actix_web::{get, post, web, HttpResponse};
use sqlx::query;
use tracing::info;
use uuid::Uuid;

use super::anuncio_consultas::{buscar_por_id, listar_por_status, Ordem};
use super::anuncio_structs::{
    AnuncioDetalhe, FiltroAnuncios, NovoAnuncio, StatusAnuncio, MAX_IMAGENS_SUBMISSAO,
};
use crate::shared::erros::{violacao_chave_estrangeira, AppError, ErroCampo};
use crate::shared::shared_structs::GenericResponse;
use crate::AppState;

/// Erro de categoria inexistente, reaproveitado pela edição do administrador.
pub fn categoria_inexistente(e: sqlx::Error) -> AppError {
    if violacao_chave_estrangeira(&e, "anuncios_categoria_id_fkey") {
        AppError::Validacao(vec![ErroCampo::new("categoria_id", "Categoria inexistente.")])
    } else {
        AppError::Banco(e)
    }
}

/// Rota pública: anúncios aprovados, mais recentes primeiro, com filtros opcionais.
#[get("/anuncios")]
pub async fn listar_anuncios(
    data: web::Data<AppState>,
    filtro: web::Query<FiltroAnuncios>,
) -> Result<HttpResponse, AppError> {
    let aprovados =
        listar_por_status(&data.db_pool, StatusAnuncio::Aprovado, Ordem::MaisRecentesPrimeiro)
            .await?;
    let anuncios = filtro.aplicar(aprovados);

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("{} anúncio(s) encontrado(s).", anuncios.len()),
        anuncios,
    )))
}

/// Rota pública: detalhe de um anúncio aprovado.
#[get("/anuncios/{id}")]
pub async fn buscar_anuncio(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let anuncio = buscar_por_id(&data.db_pool, id, Some(StatusAnuncio::Aprovado))
        .await?
        .ok_or_else(|| AppError::NaoEncontrado("Anúncio não encontrado.".to_string()))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Anúncio encontrado.",
        AnuncioDetalhe::from(anuncio),
    )))
}

/// Rota pública para submeter um anúncio. Todo anúncio novo entra como Pendente.
#[post("/anuncios")]
pub async fn submeter_anuncio(
    data: web::Data<AppState>,
    item: web::Json<NovoAnuncio>,
) -> Result<HttpResponse, AppError> {
    let anuncio = item
        .into_inner()
        .validar(MAX_IMAGENS_SUBMISSAO, |url| data.armazenamento.pertence(url))?;

    let id = Uuid::new_v4();
    query(
        "INSERT INTO anuncios (id, titulo, nome_anunciante, descricao, categoria_id, numero_whatsapp, \
         links_redes_sociais, imagens, localizacao_endereco, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(id)
    .bind(&anuncio.titulo)
    .bind(&anuncio.nome_anunciante)
    .bind(&anuncio.descricao)
    .bind(anuncio.categoria_id)
    .bind(&anuncio.numero_whatsapp)
    .bind(&anuncio.links_redes_sociais)
    .bind(&anuncio.imagens)
    .bind(&anuncio.localizacao_endereco)
    .bind(StatusAnuncio::Pendente)
    .execute(&data.db_pool)
    .await
    .map_err(categoria_inexistente)?;

    info!(anuncio_id = %id, categoria_id = anuncio.categoria_id, "anúncio submetido para moderação");

    Ok(HttpResponse::Created().json(GenericResponse::sucesso(
        "Anúncio submetido com sucesso! Aguardando aprovação.",
        serde_json::json!({ "id": id, "status": StatusAnuncio::Pendente }),
    )))
}

#[cfg(test)]
mod tests {
    use crate::anuncios::anuncio_structs::StatusAnuncio;
    use crate::rotas::configurar_rotas;
    use crate::testes::{anuncio_no_banco, estado_com_banco, formulario, status_no_banco};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use uuid::Uuid;

    #[actix_web::test]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn listagem_publica_so_aprovados_mais_recentes_primeiro() {
        let (estado, _dir) = estado_com_banco().await;
        let pool = &estado.db_pool;
        let marcador = Uuid::new_v4().simple().to_string();
        let titulo = format!("Anúncio {marcador}");

        let antigo = anuncio_no_banco(pool, &titulo, StatusAnuncio::Aprovado, None, 120.0).await;
        let recente = anuncio_no_banco(pool, &titulo, StatusAnuncio::Aprovado, None, 0.0).await;
        anuncio_no_banco(pool, &titulo, StatusAnuncio::Pendente, None, 60.0).await;
        anuncio_no_banco(pool, &titulo, StatusAnuncio::Rejeitado, None, 30.0).await;

        let app = test::init_service(App::new().app_data(estado.clone()).configure(configurar_rotas)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/anuncios?busca={marcador}"))
            .to_request();
        let corpo: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let ids: Vec<String> = corpo["body"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec![recente.to_string(), antigo.to_string()]);
    }

    #[actix_web::test]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn detalhe_publico_so_de_aprovado() {
        let (estado, _dir) = estado_com_banco().await;
        let pool = &estado.db_pool;
        let aprovado = anuncio_no_banco(pool, "Aulas de violão", StatusAnuncio::Aprovado, None, 0.0).await;
        let pendente = anuncio_no_banco(pool, "Aulas de violão", StatusAnuncio::Pendente, None, 0.0).await;
        let rejeitado = anuncio_no_banco(pool, "Aulas de violão", StatusAnuncio::Rejeitado, None, 0.0).await;

        let app = test::init_service(App::new().app_data(estado.clone()).configure(configurar_rotas)).await;
        for (id, esperado) in [
            (aprovado, StatusCode::OK),
            (pendente, StatusCode::NOT_FOUND),
            (rejeitado, StatusCode::NOT_FOUND),
            (Uuid::new_v4(), StatusCode::NOT_FOUND),
        ] {
            let req = test::TestRequest::get().uri(&format!("/anuncios/{id}")).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), esperado, "{id}");
        }
    }

    #[actix_web::test]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn submissao_entra_pendente_e_categoria_inexistente_e_400() {
        let (estado, _dir) = estado_com_banco().await;
        let categoria = crate::testes::categoria_no_banco(&estado.db_pool).await;
        let app = test::init_service(App::new().app_data(estado.clone()).configure(configurar_rotas)).await;

        let mut corpo = formulario(categoria, &[]);
        corpo["status"] = serde_json::json!("Aprovado");
        let req = test::TestRequest::post().uri("/anuncios").set_json(&corpo).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let criado: serde_json::Value = test::read_body_json(resp).await;
        let id: Uuid = criado["body"]["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(status_no_banco(&estado.db_pool, id).await, Some(StatusAnuncio::Pendente));

        let req = test::TestRequest::post()
            .uri("/anuncios")
            .set_json(formulario(i32::MAX, &[]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let corpo: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(corpo["body"][0]["campo"], "categoria_id");
    }
}
