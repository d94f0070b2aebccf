pub mod app_config;
pub mod catalog;
pub mod config;
pub mod similarity;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, RecommendationConfig};
pub use catalog::{load_catalog, parse_catalog, CatalogEntry, CatalogFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use similarity::{
    plan_fill, FillPlan, Similarity, SimilarityProfile, CATEGORY_WEIGHT, DEFAULT_SIMILAR_LIMIT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),
    #[error("catalog validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
}
