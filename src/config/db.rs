use crate::Error;
use anyhow::Result;
use serde::Deserialize;
use std::env;

/// Connection settings for the reporting warehouse that backs the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Connection settings for the external clinical system the pipeline can
/// extract from instead of generating sample data.
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicalConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl WarehouseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("WAREHOUSE_HOST")
                .map_err(|_| Error::Config("WAREHOUSE_HOST not set".to_string()))?,
            port: env::var("WAREHOUSE_PORT")
                .unwrap_or_else(|_| "3306".to_string())
                .parse()
                .map_err(|_| Error::Config("Invalid WAREHOUSE_PORT format".to_string()))?,
            user: env::var("WAREHOUSE_USER")
                .map_err(|_| Error::Config("WAREHOUSE_USER not set".to_string()))?,
            password: env::var("WAREHOUSE_PASSWORD")
                .map_err(|_| Error::Config("WAREHOUSE_PASSWORD not set".to_string()))?,
            database: env::var("WAREHOUSE_DATABASE")
                .map_err(|_| Error::Config("WAREHOUSE_DATABASE not set".to_string()))?,
        })
    }
}

impl ClinicalConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("CLINICAL_HOST")
                .map_err(|_| Error::Config("CLINICAL_HOST not set".to_string()))?,
            port: env::var("CLINICAL_PORT")
                .unwrap_or_else(|_| "3306".to_string())
                .parse()
                .map_err(|_| Error::Config("Invalid CLINICAL_PORT format".to_string()))?,
            user: env::var("CLINICAL_USER")
                .map_err(|_| Error::Config("CLINICAL_USER not set".to_string()))?,
            password: env::var("CLINICAL_PASSWORD")
                .map_err(|_| Error::Config("CLINICAL_PASSWORD not set".to_string()))?,
            database: env::var("CLINICAL_DATABASE")
                .map_err(|_| Error::Config("CLINICAL_DATABASE not set".to_string()))?,
        })
    }
}
