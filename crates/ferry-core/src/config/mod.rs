//! Configuration for the ferry CLI
//!
//! Settings live in `ferry.toml`, looked up in this order:
//! - An explicit path given by the caller
//! - `./ferry.toml` in the working directory
//! - `<config dir>/ferry/ferry.toml`

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_ferry_toml, parse_ferry_toml_str};
pub use paths::{CONFIG_FILE_NAME, resolve_config_path};
pub use schema::{FerryConfig, OutputFormat};
pub use store::ConfigStore;
