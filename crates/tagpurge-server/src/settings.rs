//! Configuracion del servidor.
//!
//! Se carga de un archivo TOML opcional (ruta en `TAGPURGE_CONFIG`, por
//! defecto `tagpurge.toml`) y se sobreescribe con variables de entorno
//! `TAGPURGE__SECCION__CLAVE`, por ejemplo `TAGPURGE__FASTLY__API_KEY`.

use std::net::SocketAddr;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use tagpurge_core::{DEFAULT_HASH_LENGTH, TagHasher, TagpurgeError};
use tagpurge_fastly::FastlyConfig;

use crate::cache::DedupConfig;

/// Variable con la ruta del archivo de configuracion.
pub const CONFIG_PATH_ENV: &str = "TAGPURGE_CONFIG";

/// Prefijo de las variables de entorno.
pub const ENV_PREFIX: &str = "TAGPURGE";

/// Errores al cargar la configuracion.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid listen address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error(transparent)]
    InvalidTags(#[from] TagpurgeError),
}

/// Direccion de escucha del servidor HTTP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|e: std::net::AddrParseError| SettingsError::InvalidAddress {
                reason: e.to_string(),
                address,
            })
    }
}

/// Como se convierten los cache tags en surrogate keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TagSettings {
    /// Digitos base-32 por key.
    pub hash_length: usize,
    /// Prefijo que separa sitios que comparten un servicio.
    pub site_id: Option<String>,
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            hash_length: DEFAULT_HASH_LENGTH,
            site_id: None,
        }
    }
}

impl TagSettings {
    /// Construye el hasher, validando la longitud.
    pub fn hasher(&self) -> Result<TagHasher, TagpurgeError> {
        let hasher = TagHasher::new(self.hash_length)?;
        Ok(match &self.site_id {
            Some(site_id) => hasher.with_site_id(site_id.as_str()),
            None => hasher,
        })
    }
}

/// Configuracion completa del servidor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub fastly: FastlyConfig,
    pub tags: TagSettings,
    pub dedup: DedupConfig,
}

impl Settings {
    /// Carga la configuracion del archivo y del entorno.
    pub fn load() -> Result<Self, SettingsError> {
        let file = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => File::with_name(&path),
            Err(_) => File::with_name("tagpurge").required(false),
        };

        Self::from_builder(Config::builder().add_source(file))
    }

    /// Aplica el entorno sobre `builder` y deserializa el resultado.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.tags.hasher()?;
        settings.server.socket_addr()?;
        Ok(settings)
    }
}
