// src/moderacao/moderacao_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::{query, query_scalar, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::anuncios::anuncio_consultas::{buscar_por_id, listar_por_status, Ordem};
use crate::anuncios::anuncio_router::categoria_inexistente;
use crate::anuncios::anuncio_structs::{
    AnuncioAdmin, NovoAnuncio, StatusAnuncio, MAX_IMAGENS_EDICAO,
};
use crate::imagens::armazenamento::ArmazenamentoImagens;
use crate::shared::erros::AppError;
use crate::shared::shared_structs::GenericResponse;
use crate::usuarios::auth_middleware::AdminUser;
use crate::AppState;

fn nao_encontrado(id: Uuid) -> AppError {
    AppError::NaoEncontrado(format!("Anúncio {id} não encontrado."))
}

/// Remove do disco imagens que deixaram de ser usadas. Precisa rodar depois do
/// DELETE ou do commit: URLs ainda citadas por algum anúncio são mantidas.
/// Falhas só vão para o log.
async fn remover_imagens(pool: &PgPool, armazenamento: &ArmazenamentoImagens, urls: &[String]) {
    for url in urls {
        let em_uso = query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM anuncios WHERE $1 = ANY(imagens))",
        )
        .bind(url)
        .fetch_one(pool)
        .await;

        match em_uso {
            Ok(true) => {
                info!(url = %url, "imagem mantida, ainda usada por outro anúncio");
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = ?e, url = %url, "não foi possível verificar uso da imagem");
                continue;
            }
        }

        if let Err(e) = armazenamento.remover_por_url(url).await {
            warn!(error = ?e, url = %url, "não foi possível remover imagem");
        }
    }
}

/// Aplica uma ação de moderação com um único UPDATE condicional ao status de origem.
async fn transicionar(
    data: &AppState,
    admin: &AdminUser,
    id: Uuid,
    destino: StatusAnuncio,
) -> Result<(), AppError> {
    let origem = StatusAnuncio::origem_para(destino)
        .ok_or_else(|| AppError::Interno(format!("nenhuma ação leva ao status {destino}")))?;

    let res = query(
        "UPDATE anuncios SET status = $1, aprovado_rejeitado_por = $2, \
         data_aprovacao_rejeicao = now(), updated_at = now() \
         WHERE id = $3 AND status = $4",
    )
    .bind(destino)
    .bind(admin.id())
    .bind(id)
    .bind(origem)
    .execute(&data.db_pool)
    .await?;

    if res.rows_affected() > 0 {
        info!(anuncio_id = %id, admin_id = %admin.id(), status = %destino, "anúncio moderado");
        return Ok(());
    }

    // Nada foi alterado: o anúncio não existe ou não está no status de origem
    let atual = query_scalar::<_, StatusAnuncio>("SELECT status FROM anuncios WHERE id = $1")
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await?;

    match atual {
        None => Err(nao_encontrado(id)),
        Some(atual) => {
            warn!(anuncio_id = %id, status_atual = %atual, destino = %destino, "transição recusada");
            Err(AppError::Conflito(format!(
                "Anúncio está {atual} e não pode passar para {destino}."
            )))
        }
    }
}

/// Anúncios aguardando moderação, mais antigos primeiro.
#[get("/admin/anuncios/pendentes")]
pub async fn listar_pendentes(
    data: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let anuncios =
        listar_por_status(&data.db_pool, StatusAnuncio::Pendente, Ordem::MaisAntigosPrimeiro)
            .await?;
    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("{} anúncio(s) pendente(s).", anuncios.len()),
        anuncios,
    )))
}

/// Anúncios já aprovados, mais recentes primeiro.
#[get("/admin/anuncios/aprovados")]
pub async fn listar_aprovados(
    data: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let anuncios =
        listar_por_status(&data.db_pool, StatusAnuncio::Aprovado, Ordem::MaisRecentesPrimeiro)
            .await?;
    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("{} anúncio(s) aprovado(s).", anuncios.len()),
        anuncios,
    )))
}

/// Detalhes de um anúncio em qualquer status, com o formulário de edição preenchido.
#[get("/admin/anuncios/{id}")]
pub async fn detalhes_anuncio(
    data: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let anuncio = buscar_por_id(&data.db_pool, id, None)
        .await?
        .ok_or_else(|| nao_encontrado(id))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Anúncio encontrado.",
        AnuncioAdmin::from(anuncio),
    )))
}

#[post("/admin/anuncios/{id}/aprovar")]
pub async fn aprovar_anuncio(
    data: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    transicionar(&data, &admin, id, StatusAnuncio::Aprovado).await?;
    Ok(HttpResponse::Ok().json(GenericResponse::mensagem("Anúncio aprovado com sucesso.")))
}

#[post("/admin/anuncios/{id}/rejeitar")]
pub async fn rejeitar_anuncio(
    data: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    transicionar(&data, &admin, id, StatusAnuncio::Rejeitado).await?;
    Ok(HttpResponse::Ok().json(GenericResponse::mensagem("Anúncio rejeitado com sucesso.")))
}

/// Edita um anúncio e o aprova na mesma operação, em qualquer status.
#[put("/admin/anuncios/{id}")]
pub async fn editar_e_aprovar_anuncio(
    data: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    item: web::Json<NovoAnuncio>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let anuncio = item
        .into_inner()
        .validar(MAX_IMAGENS_EDICAO, |url| data.armazenamento.pertence(url))?;

    let mut tx = data.db_pool.begin().await?;

    // Imagens atuais, para limpar as que forem removidas na edição
    let imagens_antigas: Option<Vec<String>> =
        query_scalar::<_, Option<Vec<String>>>("SELECT imagens FROM anuncios WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| nao_encontrado(id))?;

    query(
        "UPDATE anuncios SET titulo = $1, nome_anunciante = $2, descricao = $3, categoria_id = $4, \
         numero_whatsapp = $5, links_redes_sociais = $6, imagens = $7, localizacao_endereco = $8, \
         status = $9, aprovado_rejeitado_por = $10, data_aprovacao_rejeicao = now(), updated_at = now() \
         WHERE id = $11",
    )
    .bind(&anuncio.titulo)
    .bind(&anuncio.nome_anunciante)
    .bind(&anuncio.descricao)
    .bind(anuncio.categoria_id)
    .bind(&anuncio.numero_whatsapp)
    .bind(&anuncio.links_redes_sociais)
    .bind(&anuncio.imagens)
    .bind(&anuncio.localizacao_endereco)
    .bind(StatusAnuncio::Aprovado)
    .bind(admin.id())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(categoria_inexistente)?;

    tx.commit().await?;

    let novas = anuncio.imagens.unwrap_or_default();
    let descartadas: Vec<String> = imagens_antigas
        .unwrap_or_default()
        .into_iter()
        .filter(|url| !novas.contains(url))
        .collect();
    remover_imagens(&data.db_pool, &data.armazenamento, &descartadas).await;

    info!(anuncio_id = %id, admin_id = %admin.id(), "anúncio editado e aprovado");
    Ok(HttpResponse::Ok().json(GenericResponse::mensagem(
        "Anúncio atualizado e aprovado com sucesso.",
    )))
}

/// Exclui um anúncio e, em seguida, suas imagens.
#[delete("/admin/anuncios/{id}")]
pub async fn excluir_anuncio(
    data: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let imagens = query_scalar::<_, Option<Vec<String>>>(
        "DELETE FROM anuncios WHERE id = $1 RETURNING imagens",
    )
    .bind(id)
    .fetch_optional(&data.db_pool)
    .await?
    .ok_or_else(|| nao_encontrado(id))?;

    remover_imagens(&data.db_pool, &data.armazenamento, &imagens.unwrap_or_default()).await;

    info!(anuncio_id = %id, admin_id = %admin.id(), "anúncio excluído");
    Ok(HttpResponse::Ok().json(GenericResponse::mensagem("Anúncio excluído com sucesso.")))
}
