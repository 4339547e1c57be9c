// src/shared/telemetria.rs

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

use super::config::FormatoLog;

/// Instala o subscriber global de tracing. `RUST_LOG` sobrescreve o nível padrão (info).
pub fn init(formato: FormatoLog) -> Result<(), String> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = match formato {
        FormatoLog::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        FormatoLog::Compacto => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| format!("falha ao instalar subscriber de tracing: {err}"))
}
