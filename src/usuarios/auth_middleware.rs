// src/usuarios/auth_middleware.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::query_scalar;
use tracing::{error, warn};
use uuid::Uuid;

use super::token::{mensagem_de_erro, validar_token};
use crate::shared::erros::AppError;
use crate::AppState;

/// Usuário autenticado, extraído do JWT do cabeçalho Authorization.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_email: String,
    pub is_admin: bool,
}

/// Usuário autenticado com a flag de administrador.
/// Rotas que recebem este extrator respondem 403 para usuários comuns.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl AdminUser {
    pub fn id(&self) -> Uuid {
        self.0.user_id
    }
}

fn autenticar(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    // Acessa o AppState para obter a chave secreta JWT
    let Some(app_state) = req.app_data::<web::Data<AppState>>() else {
        error!("AppState não disponível no extrator de autenticação");
        return Err(AppError::Interno("AppState ausente".to_string()));
    };

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::NaoAutorizado("Token de autenticação ausente."))?;

    let header_str = header_value
        .to_str()
        .map_err(|_| AppError::NaoAutorizado("Token de autenticação inválido."))?;

    let token = header_str.strip_prefix("Bearer ").ok_or(AppError::NaoAutorizado(
        "Formato de token inválido. Esperado 'Bearer <token>'.",
    ))?;

    let claims = validar_token(token.trim(), &app_state.jwt_secret).map_err(|e| {
        warn!(error = ?e, "JWT rejeitado");
        AppError::NaoAutorizado(mensagem_de_erro(&e))
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        user_name: claims.nome,
        user_email: claims.email,
        is_admin: claims.is_admin,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(autenticar(req))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    /// Além da flag no token, confere a flag atual do perfil no banco. Um perfil
    /// rebaixado ou removido perde o acesso mesmo com um token ainda válido.
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let autenticado = autenticar(req);
        let estado = req.app_data::<web::Data<AppState>>().cloned();
        let rota = req.path().to_string();

        Box::pin(async move {
            let usuario = autenticado?;
            let user_id = usuario.user_id;
            let negar = |motivo: &str| {
                warn!(
                    user_id = %user_id,
                    rota = %rota,
                    motivo,
                    "Tentativa de acesso administrativo sem permissão"
                );
                AppError::PermissaoNegada
            };

            if !usuario.is_admin {
                return Err(negar("token sem flag de administrador"));
            }

            let estado = estado.ok_or_else(|| AppError::Interno("AppState ausente".to_string()))?;
            let is_admin = query_scalar::<_, bool>("SELECT is_admin FROM perfis WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&estado.db_pool)
                .await?;

            match is_admin {
                Some(true) => Ok(AdminUser(usuario)),
                Some(false) => Err(negar("perfil sem flag de administrador")),
                None => Err(negar("perfil inexistente")),
            }
        })
    }
}
