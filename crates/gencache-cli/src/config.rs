use std::env;

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("GENCACHE_LOG") {
            if !v.trim().is_empty() {
                cfg.log_level = v;
            }
        }
        cfg
    }
}
