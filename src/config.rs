#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind: std::env::var("PARLEY_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        }
    }
}
