use super::models::app_env::{AppEnv, Env};
use crate::error::{PredictError, PredictResult};
use std::env;
use std::str::FromStr;

impl AppEnv {
    pub fn new() -> PredictResult<AppEnv> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the environment from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> PredictResult<AppEnv>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_env_var = |name: &str| {
            lookup(name)
                .ok_or_else(|| PredictError::configuration(format!("ENV -> {} is not set", name)))
        };

        Ok(AppEnv {
            env: Env::from_str(&get_env_var("ENV")?).map_err(PredictError::configuration)?,
            server_port: get_env_var("SERVER_PORT")?
                .parse()
                .map_err(|_| PredictError::configuration("SERVER_PORT must be a number"))?,
            server_address: get_env_var("SERVER_ADDRESS")?,
            model_dir: lookup("MODEL_DIR").filter(|dir| !dir.trim().is_empty()),
        })
    }
}
