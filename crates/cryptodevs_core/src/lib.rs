pub mod config;
pub mod logging;

pub use config::{AppConfig, DEFAULT_CHAIN_ID, DEFAULT_MINT_PRICE_ETH};
