pub mod analysis;
pub mod common;
pub mod etl;
pub mod export;
pub mod health;
pub mod records;
pub mod stats;

pub use analysis::*;
pub use etl::*;
pub use export::*;
pub use health::*;
pub use records::*;
pub use stats::*;
