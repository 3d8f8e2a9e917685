pub mod api;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod etl;
pub mod models;

#[cfg(test)]
mod tests;

pub use api::serve;
pub use constants::*;
pub use error::Error;
pub use models::*;

use tracing::Level;

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();
}
