// src/imagens/mod.rs

pub mod armazenamento;
pub mod imagem_router;
