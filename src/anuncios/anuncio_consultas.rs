// src/anuncios/anuncio_consultas.rs

//! Consultas SQL compartilhadas entre as rotas públicas e as do administrador.

use sqlx::{query_as, PgPool};
use uuid::Uuid;

use super::anuncio_structs::{Anuncio, AnuncioResumo, StatusAnuncio};

const COLUNAS_RESUMO: &str = "a.id, a.titulo, a.descricao, a.imagens, a.categoria_id, c.nome_categoria, \
     a.localizacao_endereco, a.numero_whatsapp, a.nome_anunciante, a.status, a.created_at";

const COLUNAS_COMPLETAS: &str = "a.id, a.titulo, a.nome_anunciante, a.descricao, a.categoria_id, c.nome_categoria, \
     a.numero_whatsapp, a.links_redes_sociais, a.imagens, a.localizacao_endereco, \
     a.localizacao_latitude, a.localizacao_longitude, a.status, a.aprovado_rejeitado_por, \
     a.data_aprovacao_rejeicao, a.data_submissao, a.created_at, a.updated_at";

/// Ordem por data de criação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordem {
    MaisAntigosPrimeiro,
    MaisRecentesPrimeiro,
}

impl Ordem {
    fn sql(self) -> &'static str {
        match self {
            Ordem::MaisAntigosPrimeiro => "ASC",
            Ordem::MaisRecentesPrimeiro => "DESC",
        }
    }
}

/// Lista os anúncios de um status com o nome da categoria.
pub async fn listar_por_status(
    pool: &PgPool,
    status: StatusAnuncio,
    ordem: Ordem,
) -> Result<Vec<AnuncioResumo>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUNAS_RESUMO} FROM anuncios a \
         LEFT JOIN categorias c ON c.id = a.categoria_id \
         WHERE a.status = $1 ORDER BY a.created_at {}",
        ordem.sql()
    );
    query_as::<_, AnuncioResumo>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await
}

/// Busca um anúncio pelo ID. Com `status`, só retorna se estiver nesse status.
pub async fn buscar_por_id(
    pool: &PgPool,
    id: Uuid,
    status: Option<StatusAnuncio>,
) -> Result<Option<Anuncio>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUNAS_COMPLETAS} FROM anuncios a \
         LEFT JOIN categorias c ON c.id = a.categoria_id \
         WHERE a.id = $1 AND ($2::status_anuncio IS NULL OR a.status = $2)"
    );
    query_as::<_, Anuncio>(&sql)
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
}
