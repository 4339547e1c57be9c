// src/shared/mod.rs

// Envelope padrão das respostas
pub mod shared_structs;
// Erros das rotas
pub mod erros;
// Configuração via variáveis de ambiente
pub mod config;
// Inicialização dos logs
pub mod telemetria;
