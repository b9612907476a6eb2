pub mod config;
pub mod engine;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod records;
pub mod report;
pub mod trend;
pub mod zones;
