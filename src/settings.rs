//! # Settings — Configuração do Processo
//!
//! | Variável | Padrão | Uso |
//! |----------|--------|-----|
//! | `PORT` | `8080` | porta HTTP |
//! | `BIND_ADDR` | `0.0.0.0` | interface |
//! | `DEMOS_DIR` | `demos` | diretório dos JSON de demonstração |
//! | `DATA_DIR` | `data` | destino dos dumps de sessão |
//!
//! O nível de log vem de `RUST_LOG` (ver `main`).

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub bind_addr: String,
    pub demos_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: "0.0.0.0".to_string(),
            demos_dir: PathBuf::from("demos"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta as settings a partir de uma função de consulta.
    ///
    /// Valores vazios ou inválidos caem no padrão.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match value("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(port = %raw, error = %e, "PORT inválida, usando padrão");
                defaults.port
            }),
            None => defaults.port,
        };

        Self {
            port,
            bind_addr: value("BIND_ADDR").unwrap_or(defaults.bind_addr),
            demos_dir: value("DEMOS_DIR").map(PathBuf::from).unwrap_or(defaults.demos_dir),
            data_dir: value("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
        }
    }

    /// Endereço no formato `host:porta`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DEMOS_DIR", "/srv/demos"),
            ("DATA_DIR", "/var/lib/pipeline"),
        ]));
        assert_eq!(settings.addr(), "127.0.0.1:3000");
        assert_eq!(settings.demos_dir, PathBuf::from("/srv/demos"));
        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/pipeline"));
    }

    #[test]
    fn invalid_or_blank_values_fall_back() {
        let settings = Settings::from_lookup(lookup(&[("PORT", "oitenta"), ("BIND_ADDR", "  ")]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_addr, "0.0.0.0");
    }
}
