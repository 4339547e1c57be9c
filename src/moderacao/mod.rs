// src/moderacao/mod.rs

// Rotas do painel do administrador
pub mod moderacao_router;
