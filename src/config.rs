use std::net::IpAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "PatientRegistry";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port used when `PORT` is unset or unparsable.
pub const DEFAULT_PORT: u16 = 5001;

/// Get the application data directory
/// ~/PatientRegistry/ on all platforms, falling back to the working
/// directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite file location.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("patients.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,patient_registry_lib=debug"
}

/// Runtime settings for the REST server, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            database_path: default_database_path(),
            seed_demo_data: true,
        }
    }
}

impl ServerConfig {
    /// Read `BIND_ADDR`, `PORT`, `PATIENTS_DB_PATH` and `SEED_DEMO_DATA`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid values fall back to
    /// defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid BIND_ADDR, using default");
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using default");
                defaults.port
            }),
            None => defaults.port,
        };

        let database_path = lookup("PATIENTS_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let seed_demo_data = match lookup("SEED_DEMO_DATA").as_deref() {
            Some("0") | Some("false") | Some("no") | Some("off") => false,
            Some(_) | None => defaults.seed_demo_data,
        };

        Self {
            bind_addr,
            port,
            database_path,
            seed_demo_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        let dir = app_data_dir();
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn default_database_under_app_data() {
        let db = default_database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("patients.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 5001);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "8080"),
            ("PATIENTS_DB_PATH", "/tmp/test-patients.db"),
            ("SEED_DEMO_DATA", "false"),
        ]));
        assert_eq!(config.bind_addr, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("/tmp/test-patients.db"));
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("BIND_ADDR", "not-an-ip"),
            ("PORT", "seventy"),
            ("PATIENTS_DB_PATH", "  "),
        ]));
        assert_eq!(config.bind_addr, ServerConfig::default().bind_addr);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_path, default_database_path());
    }
}
