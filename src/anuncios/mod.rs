// src/anuncios/mod.rs

// Tipos, validação do formulário e filtros
pub mod anuncio_structs;
// Consultas SQL compartilhadas com a moderação
pub mod anuncio_consultas;
// Rotas públicas (listagem, detalhe e submissão)
pub mod anuncio_router;
