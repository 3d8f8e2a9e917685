pub mod aggregate;
pub mod cleaner;
pub mod pipeline;
pub mod sample;
