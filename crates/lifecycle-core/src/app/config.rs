//! Config - 起動・定期実行の設定

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 設定読み込みのエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("update_interval must be greater than zero")]
    ZeroUpdateInterval,
}

/// コンポーネントの on_load が失敗したときの起動ドライバの振る舞い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// パスを中断してエラーを返す（デフォルト）
    #[default]
    Abort,
    /// 失敗をログとレポートに記録して続行
    Continue,
}

/// LifecycleConfig は起動パスと update loop の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// update loop の tick 間隔
    #[serde(default = "default_update_interval", with = "duration_ms")]
    pub update_interval: Duration,

    /// この期間実行されていない updater を stale として warn
    #[serde(default = "default_stale_update_warning", with = "duration_secs")]
    pub stale_update_warning: Duration,

    /// on_load 失敗時のポリシー
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            update_interval: default_update_interval(),
            stale_update_warning: default_stale_update_warning(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl LifecycleConfig {
    /// JSON 文字列から読み込み
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()
    }

    /// JSON ファイルから読み込み
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.update_interval.is_zero() {
            return Err(ConfigError::ZeroUpdateInterval);
        }
        Ok(self)
    }
}

fn default_update_interval() -> Duration {
    Duration::from_millis(5000)
}

fn default_stale_update_warning() -> Duration {
    Duration::from_secs(20 * 60)
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = LifecycleConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LifecycleConfig::default());
        assert_eq!(config.update_interval, Duration::from_secs(5));
        assert_eq!(config.stale_update_warning, Duration::from_secs(1200));
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn parses_all_fields() {
        let config = LifecycleConfig::from_json_str(
            r#"{"update_interval": 250, "stale_update_warning": 60, "failure_policy": "continue"}"#,
        )
        .unwrap();
        assert_eq!(config.update_interval, Duration::from_millis(250));
        assert_eq!(config.stale_update_warning, Duration::from_secs(60));
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = LifecycleConfig::from_json_str(r#"{"update_interval": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroUpdateInterval));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = LifecycleConfig::from_json_str(r#"{"failure_policy": "retry"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn serializes_back_to_the_same_units() {
        let v = serde_json::to_value(LifecycleConfig::default()).unwrap();
        assert_eq!(v["update_interval"], 5000);
        assert_eq!(v["stale_update_warning"], 1200);
        assert_eq!(v["failure_policy"], "abort");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LifecycleConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
