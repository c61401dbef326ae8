pub mod app_config;
pub mod app_env;
pub mod app_setting;
