//! Errors - レジストリとコンポーネントのエラー型

use std::fmt;

use thiserror::Error;

/// Cursor の状態（エラー報告用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPhase {
    NotStarted,
    Positioned,
    Finished,
}

impl fmt::Display for CursorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CursorPhase::NotStarted => "not started",
            CursorPhase::Positioned => "positioned",
            CursorPhase::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Tier / Registry / Cursor のエラー
///
/// どのエラーでもデータ構造は変更されない
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("logical index {index} out of range for tier of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("cursor has no current element (state: {0})")]
    InvalidCursorState(CursorPhase),
}

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（次回の update で回復しうる）
/// - Permanent: 恒久的なエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// コンポーネントのアクションが返すエラー
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Action(String),

    #[error("transient: {0}")]
    Transient(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl LifecycleError {
    /// 恒久的なアクションエラーを作成
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }

    /// 一時的なエラーを作成
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// エラーの分類
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Transient(_) => ErrorKind::Transient,
            LifecycleError::Action(_)
            | LifecycleError::Registry(_)
            | LifecycleError::Json(_) => ErrorKind::Permanent,
        }
    }
}
