//! Status - 起動パスと update tick の結果ビュー

use serde::{Deserialize, Serialize};

use crate::domain::Priority;

/// 読み込みに成功したコンポーネント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedComponent {
    pub route: String,
    pub priority: Priority,
}

/// 失敗したコンポーネント（Continue ポリシー時のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedComponent {
    pub route: String,
    pub priority: Priority,
    pub error: String,
}

/// 起動パスの結果（実行順）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupReport {
    pub loaded: Vec<LoadedComponent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedComponent>,
}

impl StartupReport {
    /// 読み込みに成功した route（実行順）
    pub fn loaded_routes(&self) -> Vec<&str> {
        self.loaded.iter().map(|c| c.route.as_str()).collect()
    }

    /// 失敗が一件もないか
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// update tick 一回分の結果（route ごと）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// 実行した
    pub ran: Vec<String>,
    /// まだ実行の必要がなかった
    pub idle: Vec<String>,
    /// エラーを返した
    pub failed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_omits_failed() {
        let report = StartupReport {
            loaded: vec![LoadedComponent {
                route: "db".to_string(),
                priority: Priority::new(0),
            }],
            failed: Vec::new(),
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["loaded"][0]["route"], "db");
        assert_eq!(v["loaded"][0]["priority"], 0);
        assert!(v.get("failed").is_none());
        assert!(report.is_clean());
        assert_eq!(report.loaded_routes(), vec!["db"]);
    }
}
