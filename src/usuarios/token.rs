// src/usuarios/token.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::usuario_structs::{Claims, Perfil};

/// Gera um JWT HS256 para o perfil, válido por `horas`.
pub fn gerar_token(
    perfil: &Perfil,
    segredo: &str,
    horas: i64,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::hours(horas)).timestamp();
    let claims = Claims {
        sub: perfil.id,
        email: perfil.email.clone(),
        nome: perfil.nome.clone(),
        is_admin: perfil.is_admin,
        exp,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(segredo.as_bytes()),
    )?;
    Ok((token, exp))
}

/// Decodifica e valida um JWT (assinatura e expiração).
pub fn validar_token(token: &str, segredo: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(segredo.as_bytes()), &validation)
        .map(|data| data.claims)
}

/// Mensagem amigável para cada tipo de falha de validação.
pub fn mensagem_de_erro(e: &jsonwebtoken::errors::Error) -> &'static str {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token expirado.",
        jsonwebtoken::errors::ErrorKind::InvalidSignature => "Assinatura do token inválida.",
        jsonwebtoken::errors::ErrorKind::InvalidToken => "Token malformado.",
        _ => "Token de autenticação inválido.",
    }
}
