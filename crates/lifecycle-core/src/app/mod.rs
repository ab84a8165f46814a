//! App - アプリケーション層
//!
//! ports と registry を組み合わせて、起動パスと定期実行を実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: コンポーネントの登録と起動時検証
//! - **StartupDriver**: 優先度順に on_load を一度ずつ実行
//! - **UpdateLoop**: 固定 tick で on_update を呼び出す
//! - **LifecycleConfig**: tick 間隔・失敗時ポリシー

pub mod builder;
pub mod config;
pub mod startup;
pub mod status;
pub mod update_loop;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::config::{ConfigError, FailurePolicy, LifecycleConfig};
pub use self::startup::{StartupDriver, StartupError};
pub use self::status::{FailedComponent, LoadedComponent, StartupReport, TickReport};
pub use self::update_loop::UpdateLoop;
