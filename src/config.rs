use rocket::figment::Figment;
use serde::Deserialize;

use std::path::PathBuf;

/// Application settings, read from the same figment as rocket's own
/// (`Rocket.toml` and `ROCKET_*` environment variables).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_database_path() -> String {
    "lifeos.db".to_string()
}

fn default_log_filter() -> String {
    "lifeos=info,rocket=warn".to_string()
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<AppConfig, rocket::figment::Error> {
        figment.extract()
    }
}

impl Default for AppConfig {
    fn default() -> AppConfig {
        AppConfig {
            database_path: default_database_path(),
            static_dir: None,
            log_filter: default_log_filter(),
        }
    }
}
