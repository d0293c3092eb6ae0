use crate::error::ConfigurationError;
use crate::util;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_mongodb_uri() -> String {
    if let Ok(uri) = env::var("MONGODB_URI") {
        return uri;
    }

    match (env::var("DB_USER"), env::var("DB_PASS")) {
        (Ok(user), Ok(pass)) => {
            let cluster =
                env::var("DB_CLUSTER").unwrap_or("cluster0.mongodb.net".to_string());
            format!("mongodb+srv://{user}:{pass}@{cluster}/?retryWrites=true&w=majority")
        }
        _ => "mongodb://localhost:27017".to_string(),
    }
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("assignment-12".to_string())
}

fn default_access_token_secret() -> String {
    env::var("ACCESS_TOKEN_SECRET").unwrap_or_default()
}

fn default_payment_secret_key() -> String {
    env::var("PAYMENT_SECRET_KEY")
        .or_else(|_| env::var("STRIPE_SECRET_KEY"))
        .unwrap_or_default()
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(5000)
}

fn default_token_lifetime_secs() -> i64 {
    3600
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    #[serde(default = "default_access_token_secret")]
    pub access_token_secret: String,
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: i64,

    #[serde(default = "default_payment_secret_key")]
    pub payment_secret_key: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            access_token_secret: default_access_token_secret(),
            token_lifetime_secs: default_token_lifetime_secs(),
            payment_secret_key: default_payment_secret_key(),
            port: default_port(),
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("mongodb_db", &self.mongodb_db)
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .field("payment_configured", &!self.payment_secret_key.is_empty())
            .field("port", &self.port)
            .finish()
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(config_file)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;

        Ok(config)
    }

    /// Loads the settings file, falling back to environment defaults when
    /// there is none.
    pub fn load_or_default() -> Result<Config, ConfigurationError> {
        match Config::load() {
            Ok(c) => Ok(c),
            Err(ConfigurationError::NotFound(dir)) => {
                tracing::info!(
                    "No settings file in '{}', using environment.",
                    dir.display()
                );
                Ok(Config::default())
            }
            Err(other) => Err(other),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.access_token_secret.is_empty() {
            return Err(ConfigurationError::Missing("ACCESS_TOKEN_SECRET"));
        }
        Ok(())
    }

    pub fn payment_configured(&self) -> bool {
        !self.payment_secret_key.is_empty()
    }
}
