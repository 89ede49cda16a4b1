use once_cell::sync::Lazy;
use std::env;

use crate::constants::{DEFAULT_DB_NAME, DEFAULT_MONGO_URI};

#[derive(Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_db: String,
    pub issuer_verify_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_uri: env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_MONGO_URI.to_string()),
            mongo_db: env::var("MONGODB_DB").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            issuer_verify_url: env::var("ISSUER_VERIFY_URL").unwrap_or_default(),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
