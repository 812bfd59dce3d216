use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Chat-completion API key. Without it every forwarded question is answered
    /// with the error reply.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat-completion API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,

    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,

    /// Tourist attraction CSV
    #[serde(default = "default_tourism_data_path")]
    pub tourism_data_path: String,

    /// Small business CSV
    #[serde(default = "default_business_data_path")]
    pub business_data_path: String,

    /// Minutes without activity before a chat session is discarded
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_openai_max_tokens() -> u32 {
    500
}

fn default_openai_temperature() -> f32 {
    0.7
}

fn default_tourism_data_path() -> String {
    "./data/대전관광명소.csv".to_string()
}

fn default_business_data_path() -> String {
    "./data/소상공인_성심당_거리계산.csv".to_string()
}

fn default_session_idle_minutes() -> i64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_model, "gpt-4");
        assert_eq!(config.openai_max_tokens, 500);
        assert!((config.openai_temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.session_idle_minutes, 30);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides_are_read() {
        let vars = vec![
            ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
            ("OPENAI_MODEL".to_string(), "gpt-4o-mini".to_string()),
            ("PORT".to_string(), "8080".to_string()),
            ("TOURISM_DATA_PATH".to_string(), "/tmp/t.csv".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.port, 8080);
        assert_eq!(config.tourism_data_path, "/tmp/t.csv");
    }
}
