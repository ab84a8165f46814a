//! lifecycle-core
//!
//! Startup and periodic lifecycle for the game-server emulator.
//!
//! # モジュール構成
//! - **domain**: Priority とエラー型
//! - **registry**: 優先度ごとの Tier、Registry、走査中の変更に耐える Cursor
//! - **ports**: コンポーネントの能力（OnLoad, OnUpdate）と Clock
//! - **app**: AppBuilder, StartupDriver, UpdateLoop, 設定と結果ビュー

pub mod app;
pub mod domain;
pub mod ports;
pub mod registry;

pub use app::{App, AppBuilder, FailurePolicy, LifecycleConfig, StartupReport};
pub use domain::{LifecycleError, Priority, RegistryError};
pub use ports::{LoadContext, LoadRegistry, OnLoad, OnUpdate};
pub use registry::{Cursor, Registry, Tier};
