// src/main.rs

use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

// Importa os módulos
mod anuncios;   // Anúncios: listagem pública, detalhe e submissão
mod categorias; // Módulo de categorias
mod imagens;    // Upload e armazenamento de imagens
mod moderacao;  // Painel do administrador
mod rotas;      // Registro das rotas
mod shared;     // Módulo shared
mod usuarios;   // Perfis e autenticação

#[cfg(test)]
mod testes;

use imagens::armazenamento::ArmazenamentoImagens;
use shared::config::{Config, FormatoLog};

// Estado compartilhado entre as rotas.
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String, // Chave secreta para JWT
    pub jwt_expiracao_horas: i64,
    pub armazenamento: ArmazenamentoImagens,
}

fn erro_de_inicializacao(contexto: &str, e: impl std::fmt::Display) -> io::Error {
    error!("{contexto}: {e}");
    io::Error::new(io::ErrorKind::Other, format!("{contexto}: {e}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    shared::telemetria::init(FormatoLog::do_ambiente())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let config = Config::load().map_err(|e| erro_de_inicializacao("Configuração inválida", e))?;

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| erro_de_inicializacao("Falha ao conectar ao banco PostgreSQL", e))?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| erro_de_inicializacao("Falha ao aplicar migrações", e))?;

    let armazenamento = ArmazenamentoImagens::new(config.upload_dir.clone(), &config.public_base_url)
        .map_err(|e| erro_de_inicializacao("Falha ao preparar pasta de uploads", e))?;

    let app_state = web::Data::new(AppState {
        db_pool,
        jwt_secret: config.jwt_secret.clone(),
        jwt_expiracao_horas: config.jwt_expiracao_horas,
        armazenamento,
    });

    info!(
        host = %config.host,
        port = config.port,
        uploads = %config.upload_dir.display(),
        "Iniciando API de classificados"
    );

    // Configura e inicia o servidor HTTP.
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(rotas::configurar_rotas)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
