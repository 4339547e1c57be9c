// src/usuarios/usuario_structs.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estrutura que representa um perfil no banco de dados (tabela `perfis`).
/// A senha é armazenada como um hash bcrypt.
#[derive(FromRow)]
pub struct Perfil {
    pub id: Uuid,
    pub email: String,
    pub nome: Option<String>,
    pub senha_hash: String,
    pub is_admin: bool,
}

/// Estrutura para receber dados de um novo usuário na requisição de cadastro.
#[derive(Deserialize)]
pub struct NovoUsuario {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String, // Senha em texto claro (será hashed antes de salvar)
}

/// Estrutura para receber dados de login do usuário.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
}

/// Payload do JWT (Claims).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid,            // Subject (ID do perfil)
    pub email: String,
    pub nome: Option<String>,
    pub is_admin: bool,       // Flag de administrador
    pub exp: i64,             // Expiration Time (timestamp Unix)
}

/// Resposta de sucesso do login.
#[derive(Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_email: String,
    pub is_admin: bool,
    pub token: String,
    pub expira_em: i64,
}
