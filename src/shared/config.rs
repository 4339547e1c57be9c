// src/shared/config.rs

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

/// Tamanho mínimo da chave secreta JWT, em bytes.
const TAMANHO_MINIMO_SEGREDO: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErroConfig {
    #[error("variável de ambiente {0} é obrigatória")]
    Ausente(&'static str),
    #[error("valor inválido para {chave}: {detalhe}")]
    Invalida { chave: &'static str, detalhe: String },
}

/// Formato dos logs emitidos pelo servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatoLog {
    Compacto,
    Json,
}

impl FormatoLog {
    /// Lê `LOG_FORMAT` antes do restante da configuração, já que os logs vêm primeiro.
    pub fn do_ambiente() -> Self {
        env::var("LOG_FORMAT")
            .ok()
            .and_then(|valor| valor.parse().ok())
            .unwrap_or(FormatoLog::Compacto)
    }
}

impl FromStr for FormatoLog {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "compacto" => Ok(FormatoLog::Compacto),
            "json" => Ok(FormatoLog::Json),
            outro => Err(format!("formato de log desconhecido: {outro}")),
        }
    }
}

/// Configuração do servidor, lida das variáveis de ambiente.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiracao_horas: i64,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self, ErroConfig> {
        Self::from_lookup(|chave| env::var(chave).ok())
    }

    /// Monta a configuração a partir de uma função de busca de variáveis.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ErroConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < TAMANHO_MINIMO_SEGREDO {
            return Err(ErroConfig::Invalida {
                chave: "JWT_SECRET",
                detalhe: format!("precisa de pelo menos {TAMANHO_MINIMO_SEGREDO} bytes"),
            });
        }

        let jwt_expiracao_horas: i64 = try_load(&lookup, "JWT_EXPIRACAO_HORAS", "24")?;
        if jwt_expiracao_horas <= 0 {
            return Err(ErroConfig::Invalida {
                chave: "JWT_EXPIRACAO_HORAS",
                detalhe: "precisa ser positivo".to_string(),
            });
        }

        let public_base_url: String =
            try_load(&lookup, "PUBLIC_BASE_URL", "http://127.0.0.1:8080")?;

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            jwt_secret,
            jwt_expiracao_horas,
            host: try_load(&lookup, "HOST", "127.0.0.1")?,
            port: try_load(&lookup, "PORT", "8080")?,
            upload_dir: try_load(&lookup, "UPLOAD_DIR", "uploads")?,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn required<F>(lookup: &F, chave: &'static str) -> Result<String, ErroConfig>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(chave)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ErroConfig::Ausente(chave))
}

fn try_load<F, T>(lookup: &F, chave: &'static str, default: &str) -> Result<T, ErroConfig>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(chave)
        .unwrap_or_else(|| {
            info!("{chave} não definida, usando padrão: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Valor inválido para {chave}: {e}");
            ErroConfig::Invalida {
                chave,
                detalhe: e.to_string(),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SEGREDO: &str = "0123456789abcdef0123456789abcdef";

    fn ambiente(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> = pares
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |chave| mapa.get(chave).cloned()
    }

    #[test]
    fn usa_padroes_quando_opcionais_ausentes() {
        let config = Config::from_lookup(ambiente(&[
            ("DATABASE_URL", "postgres://localhost/classificados"),
            ("JWT_SECRET", SEGREDO),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.jwt_expiracao_horas, 24);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn database_url_obrigatoria() {
        let erro = Config::from_lookup(ambiente(&[("JWT_SECRET", SEGREDO)])).unwrap_err();
        assert_eq!(erro, ErroConfig::Ausente("DATABASE_URL"));
    }

    #[test]
    fn segredo_curto_e_rejeitado() {
        let erro = Config::from_lookup(ambiente(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", "curto"),
        ]))
        .unwrap_err();
        assert!(matches!(erro, ErroConfig::Invalida { chave: "JWT_SECRET", .. }));
    }

    #[test]
    fn porta_invalida_e_erro() {
        let erro = Config::from_lookup(ambiente(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", SEGREDO),
            ("PORT", "oitenta"),
        ]))
        .unwrap_err();
        assert!(matches!(erro, ErroConfig::Invalida { chave: "PORT", .. }));
    }

    #[test]
    fn base_url_sem_barra_final() {
        let config = Config::from_lookup(ambiente(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", SEGREDO),
            ("PUBLIC_BASE_URL", "https://classificados.example/"),
        ]))
        .unwrap();
        assert_eq!(config.public_base_url, "https://classificados.example");
    }

    #[test]
    fn formatos_de_log() {
        assert_eq!("json".parse::<FormatoLog>(), Ok(FormatoLog::Json));
        assert_eq!(" Compact ".parse::<FormatoLog>(), Ok(FormatoLog::Compacto));
        assert!("xml".parse::<FormatoLog>().is_err());
    }
}
