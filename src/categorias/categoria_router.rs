// src/categorias/categoria_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::{query, query_as, Row};
use tracing::info;

// Importa as structs de categoria
use super::categoria_structs::{Categoria, NovaCategoria};
use crate::shared::erros::{violacao_unicidade, AppError};
use crate::shared::shared_structs::GenericResponse;
use crate::usuarios::auth_middleware::AdminUser;
use crate::AppState;

fn nome_duplicado(e: sqlx::Error) -> AppError {
    if violacao_unicidade(&e) {
        AppError::Conflito("Já existe uma categoria com esse nome.".to_string())
    } else {
        AppError::Banco(e)
    }
}

/// Rota para buscar todas as categorias, em ordem alfabética.
#[get("/categorias")]
pub async fn buscar_categorias(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categorias = query_as::<_, Categoria>(
        "SELECT id, nome_categoria, descricao FROM categorias ORDER BY nome_categoria ASC",
    )
    .fetch_all(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Categorias listadas com sucesso!",
        categorias,
    )))
}

/// Rota para buscar uma categoria por ID.
#[get("/categorias/{id}")]
pub async fn buscar_categoria_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let categoria = query_as::<_, Categoria>(
        "SELECT id, nome_categoria, descricao FROM categorias WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&data.db_pool)
    .await?
    .ok_or_else(|| AppError::NaoEncontrado(format!("Categoria com ID {id} não encontrada.")))?;

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        format!("Categoria com ID {id} encontrada."),
        categoria,
    )))
}

/// Rota para cadastrar uma nova categoria (somente administradores).
#[post("/admin/categorias")]
pub async fn cadastrar_categoria(
    data: web::Data<AppState>,
    admin: AdminUser,
    item: web::Json<NovaCategoria>,
) -> Result<HttpResponse, AppError> {
    let item = item.into_inner().validar()?;

    let row = query(
        "INSERT INTO categorias (nome_categoria, descricao) VALUES ($1, $2) RETURNING id",
    )
    .bind(&item.nome_categoria)
    .bind(&item.descricao)
    .fetch_one(&data.db_pool)
    .await
    .map_err(nome_duplicado)?;

    let id: i32 = row.try_get("id")?;
    info!(categoria_id = id, admin_id = %admin.id(), "categoria cadastrada");

    Ok(HttpResponse::Created().json(GenericResponse::sucesso(
        format!("Categoria cadastrada com sucesso! ID: {id}"),
        serde_json::json!({ "id": id }),
    )))
}

/// Rota para atualizar uma categoria existente (somente administradores).
#[put("/admin/categorias/{id}")]
pub async fn atualizar_categoria(
    data: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
    item: web::Json<NovaCategoria>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = item.into_inner().validar()?;

    let res = query("UPDATE categorias SET nome_categoria = $1, descricao = $2 WHERE id = $3")
        .bind(&item.nome_categoria)
        .bind(&item.descricao)
        .bind(id)
        .execute(&data.db_pool)
        .await
        .map_err(nome_duplicado)?;

    if res.rows_affected() == 0 {
        return Err(AppError::NaoEncontrado(format!(
            "Categoria com ID {id} não encontrada para atualização."
        )));
    }

    info!(categoria_id = id, admin_id = %admin.id(), "categoria atualizada");
    Ok(HttpResponse::Ok().json(GenericResponse::mensagem(format!(
        "Categoria com ID {id} atualizada com sucesso."
    ))))
}

/// Rota para deletar uma categoria. Os anúncios dela ficam sem categoria.
#[delete("/admin/categorias/{id}")]
pub async fn deletar_categoria(
    data: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let res = query("DELETE FROM categorias WHERE id = $1")
        .bind(id)
        .execute(&data.db_pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NaoEncontrado(format!(
            "Categoria com ID {id} não encontrada para exclusão."
        )));
    }

    info!(categoria_id = id, admin_id = %admin.id(), "categoria deletada");
    Ok(HttpResponse::Ok().json(GenericResponse::mensagem(format!(
        "Categoria com ID {id} deletada com sucesso."
    ))))
}
