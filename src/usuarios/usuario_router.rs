// src/usuarios/usuario_router.rs

use std::sync::OnceLock;

use actix_web::{get, post, web, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::{query, query_as, Row};
use tracing::{info, warn};
use uuid::Uuid;

// Importa as structs do módulo de usuários
use super::auth_middleware::AuthenticatedUser;
use super::token::gerar_token;
use super::usuario_structs::{AuthResponse, LoginRequest, NovoUsuario, Perfil};
use crate::shared::erros::{violacao_unicidade, AppError, ErroCampo};
use crate::shared::shared_structs::GenericResponse;
use crate::AppState;

const TAMANHO_MINIMO_SENHA: usize = 8;

/// Hash verificado quando o e-mail não existe, para que o tempo do login não
/// revele quais e-mails estão cadastrados.
fn hash_ficticio() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash("senha-de-perfil-inexistente", DEFAULT_COST).unwrap_or_default())
}

fn validar_cadastro(novo: &NovoUsuario) -> Result<(), AppError> {
    let mut erros = Vec::new();
    let email = novo.email.trim();
    if email.is_empty() || !email.contains('@') {
        erros.push(ErroCampo::new("email", "E-mail inválido."));
    }
    if novo.senha.chars().count() < TAMANHO_MINIMO_SENHA {
        erros.push(ErroCampo::new(
            "senha",
            format!("Senha deve ter pelo menos {TAMANHO_MINIMO_SENHA} caracteres."),
        ));
    }
    if erros.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validacao(erros))
    }
}

/// Rota para cadastrar um novo perfil. Perfis novos nunca são administradores.
#[post("/usuarios/cadastro")]
pub async fn cadastrar_usuario(
    data: web::Data<AppState>,
    novo_usuario: web::Json<NovoUsuario>,
) -> Result<HttpResponse, AppError> {
    validar_cadastro(&novo_usuario)?;
    let email = novo_usuario.email.trim().to_lowercase();

    // 1. Verificar se o e-mail já está em uso
    let existente = query("SELECT id FROM perfis WHERE email = $1")
        .bind(&email)
        .fetch_optional(&data.db_pool)
        .await?;
    if existente.is_some() {
        return Err(AppError::RequisicaoInvalida("E-mail já cadastrado.".to_string()));
    }

    // 2. Hash da senha
    let senha_hash = hash(&novo_usuario.senha, DEFAULT_COST)
        .map_err(|e| AppError::Interno(format!("falha no hash da senha: {e}")))?;

    // 3. Inserir o novo perfil no banco de dados
    let row = query(
        "INSERT INTO perfis (id, email, nome, senha_hash, is_admin) VALUES ($1, $2, $3, $4, FALSE) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(novo_usuario.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()))
    .bind(&senha_hash)
    .fetch_one(&data.db_pool)
    .await
    .map_err(|e| {
        // Corrida entre a verificação e o INSERT
        if violacao_unicidade(&e) {
            AppError::RequisicaoInvalida("E-mail já cadastrado.".to_string())
        } else {
            AppError::Banco(e)
        }
    })?;

    let id: Uuid = row.try_get("id")?;
    info!(user_id = %id, "perfil cadastrado");

    Ok(HttpResponse::Created().json(GenericResponse::sucesso(
        format!("Usuário cadastrado com sucesso! ID: {id}"),
        serde_json::json!({ "id": id }),
    )))
}

/// Rota para login. Devolve um JWT que carrega a flag de administrador.
#[post("/admin/login")]
pub async fn login_usuario(
    data: web::Data<AppState>,
    login_request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let email = login_request.email.trim().to_lowercase();
    if email.is_empty() || login_request.senha.is_empty() {
        return Err(AppError::RequisicaoInvalida(
            "Email e senha são obrigatórios.".to_string(),
        ));
    }

    // 1. Buscar o perfil pelo e-mail
    let perfil = query_as::<_, Perfil>(
        "SELECT id, email, nome, senha_hash, is_admin FROM perfis WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&data.db_pool)
    .await?;

    let credenciais_invalidas = AppError::NaoAutorizado("Email ou senha inválidos.");
    let Some(perfil) = perfil else {
        // Mesmo custo do caminho com e-mail cadastrado
        let _ = verify(&login_request.senha, hash_ficticio());
        warn!("login com e-mail desconhecido");
        return Err(credenciais_invalidas);
    };

    // 2. Verificar a senha
    let senha_confere = verify(&login_request.senha, &perfil.senha_hash)
        .map_err(|e| AppError::Interno(format!("falha ao verificar senha: {e}")))?;
    if !senha_confere {
        warn!(user_id = %perfil.id, "senha incorreta no login");
        return Err(credenciais_invalidas);
    }

    // 3. Gerar o JWT
    let (token, expira_em) = gerar_token(&perfil, &data.jwt_secret, data.jwt_expiracao_horas)
        .map_err(|e| AppError::Interno(format!("falha ao gerar token: {e}")))?;

    info!(user_id = %perfil.id, is_admin = perfil.is_admin, "login realizado");

    Ok(HttpResponse::Ok().json(GenericResponse::sucesso(
        "Login bem-sucedido!",
        AuthResponse {
            user_id: perfil.id,
            user_name: perfil.nome,
            user_email: perfil.email,
            is_admin: perfil.is_admin,
            token,
            expira_em,
        },
    )))
}

/// Logout sem estado: o cliente descarta o token.
#[post("/admin/logout")]
pub async fn logout_usuario(usuario: AuthenticatedUser) -> HttpResponse {
    info!(user_id = %usuario.user_id, "logout");
    HttpResponse::Ok().json(GenericResponse::mensagem("Logout realizado."))
}

/// Dados do usuário autenticado.
#[get("/usuarios/eu")]
pub async fn usuario_atual(usuario: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(GenericResponse::sucesso(
        "Usuário autenticado.",
        serde_json::json!({
            "id": usuario.user_id,
            "nome": usuario.user_name,
            "email": usuario.user_email,
            "is_admin": usuario.is_admin,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_ficticio_e_um_bcrypt_valido() {
        assert!(hash_ficticio().starts_with("$2"));
        assert!(!verify("qualquer-senha", hash_ficticio()).unwrap());
        assert!(std::ptr::eq(hash_ficticio(), hash_ficticio()));
    }

    #[test]
    fn cadastro_valida_email_e_senha() {
        let novo = NovoUsuario {
            nome: None,
            email: "sem-arroba".to_string(),
            senha: "123".to_string(),
        };
        match validar_cadastro(&novo) {
            Err(AppError::Validacao(erros)) => {
                let campos: Vec<_> = erros.iter().map(|e| e.campo).collect();
                assert_eq!(campos, vec!["email", "senha"]);
            }
            _ => panic!("esperava erro de validação"),
        }
    }

    #[test]
    fn cadastro_valido() {
        let novo = NovoUsuario {
            nome: Some("Ana".to_string()),
            email: "ana@exemplo.com".to_string(),
            senha: "senha-forte".to_string(),
        };
        assert!(validar_cadastro(&novo).is_ok());
    }
}
