//! Configuration module.

mod config_helper;
mod read_config;
mod types;

pub use config_helper::ConfigHelper;
pub use read_config::{ConfigError, ConfigResult, ConfigSource, parse_override, read_config};
pub use types::{
    BucketsConfig, Config, GithubConfig, Limit, NetworkConfig, NotifyConfig, S3Settings,
};
