use serde::Deserialize;

use crate::infrastructure::memory_repository::DEFAULT_MAX_ITEMS;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub influx: Option<InfluxSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Influx,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Item limit for the memory backend; oldest items are evicted past it
    #[serde(default = "default_memory_max_items")]
    pub memory_max_items: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            memory_max_items: default_memory_max_items(),
        }
    }
}

fn default_memory_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

/// Load `config/service.*` (optional) overlaid with `ROBOT_TELEMETRY__*`
/// environment variables.
pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/service").required(false))
        .add_source(config::Environment::with_prefix("ROBOT_TELEMETRY").separator("__"))
        .build()?;

    let service_config: ServiceConfig = settings.try_deserialize()?;
    if service_config.store.backend == StoreBackend::Influx && service_config.influx.is_none() {
        anyhow::bail!("store.backend is \"influx\" but no [influx] settings were given");
    }

    Ok(service_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> ServiceConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let service_config = parse("");
        assert_eq!(service_config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(service_config.store.backend, StoreBackend::Memory);
        assert_eq!(service_config.store.memory_max_items, DEFAULT_MAX_ITEMS);
        assert!(service_config.influx.is_none());
    }

    #[test]
    fn test_memory_item_limit() {
        let service_config = parse(
            r#"
            [store]
            memory_max_items = 250
            "#,
        );

        assert_eq!(service_config.store.backend, StoreBackend::Memory);
        assert_eq!(service_config.store.memory_max_items, 250);
    }

    #[test]
    fn test_influx_backend() {
        let service_config = parse(
            r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [store]
            backend = "influx"

            [influx]
            host = "http://localhost:8086"
            token = "secret"
            database = "robots"
            retention_policy = "autogen"
            "#,
        );

        assert_eq!(service_config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(service_config.store.backend, StoreBackend::Influx);
        assert_eq!(service_config.influx.unwrap().database, "robots");
    }
}
