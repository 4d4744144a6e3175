//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ChatRequestPolicy, ConfigError, Environment, LifecycleConfig,
};
