use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 采样温度
    pub llm_temperature: f32,
    /// 最大生成 token 数
    pub llm_max_tokens: u32,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 界面配置 ---
    /// 进度提示轮换间隔（秒）
    pub progress_interval_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-3-pro-preview".to_string(),
            llm_temperature: 0.2,
            llm_max_tokens: 8192,
            request_timeout_secs: 180,
            progress_interval_secs: 3,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            progress_interval_secs: std::env::var("PROGRESS_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.progress_interval_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查必填项和取值范围
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(AppError::config_missing("LLM_API_KEY"));
        }
        if self.progress_interval_secs == 0 {
            return Err(invalid("PROGRESS_INTERVAL_SECS", "0", "必须大于 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("REQUEST_TIMEOUT_SECS", "0", "必须大于 0"));
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(invalid(
                "LLM_TEMPERATURE",
                &self.llm_temperature.to_string(),
                "取值范围为 0.0 - 2.0",
            ));
        }
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn invalid(var_name: &str, value: &str, reason: &str) -> AppError {
    AppError::Config(ConfigError::Invalid {
        var_name: var_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            llm_api_key: "test-key".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_requires_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
        assert_eq!(valid_config().progress_interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = Config {
            progress_interval_secs: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_temperature_is_rejected() {
        let config = Config {
            llm_temperature: 3.5,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
