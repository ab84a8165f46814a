//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! - 発見されたコンポーネントを優先度付きで登録
//! - 起動時検証（Fail-fast 設計）

use std::collections::HashSet;
use std::sync::Arc;

use crate::app::config::LifecycleConfig;
use crate::app::startup::{StartupDriver, StartupError};
use crate::app::status::StartupReport;
use crate::app::update_loop::UpdateLoop;
use crate::domain::Priority;
use crate::ports::{Clock, LoadRegistry, OnLoad, OnUpdate, SystemClock};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .on_load(Arc::new(DatabaseImporter), Priority::new(0))
///     .on_update(Arc::new(ProfileSaver::new()))?
///     .expect_routes(&["database-importer"])
///     .build()?;
///
/// let report = app.load().await?;
/// ```
///
/// # Fail-fast 設計
/// - expect_routes() で期待される route を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
pub struct AppBuilder {
    components: Vec<(Arc<dyn OnLoad>, Priority)>,
    updaters: Vec<Arc<dyn OnUpdate>>,
    expected_routes: Option<Vec<String>>,
    config: LifecycleConfig,
    clock: Arc<dyn Clock>,
}

/// 構築時エラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing routes: {0:?}. These components were expected but not registered.")]
    MissingRoutes(Vec<String>),

    #[error("Update route '{0}' is already registered")]
    DuplicateUpdateRoute(String),
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            updaters: Vec::new(),
            expected_routes: None,
            config: LifecycleConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// 起動コンポーネントを登録（呼び出し順 = 発見順）
    pub fn on_load(mut self, component: Arc<dyn OnLoad>, priority: Priority) -> Self {
        self.components.push((component, priority));
        self
    }

    /// 定期実行コンポーネントを登録（route は一意）
    pub fn on_update(mut self, component: Arc<dyn OnUpdate>) -> Result<Self, BuildError> {
        let route = component.route();
        if self.updaters.iter().any(|u| u.route() == route) {
            return Err(BuildError::DuplicateUpdateRoute(route.to_string()));
        }
        self.updaters.push(component);
        Ok(self)
    }

    /// 期待される route を設定
    pub fn expect_routes(mut self, routes: &[&str]) -> Self {
        self.expected_routes = Some(routes.iter().map(|r| r.to_string()).collect());
        self
    }

    /// 設定を差し替え
    pub fn with_config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock を差し替え（テスト用）
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// App を構築
    pub fn build(self) -> Result<App, BuildError> {
        if let Some(expected) = &self.expected_routes {
            let registered: HashSet<&str> = self
                .components
                .iter()
                .map(|(c, _)| c.route())
                .chain(self.updaters.iter().map(|u| u.route()))
                .collect();
            let missing: Vec<String> = expected
                .iter()
                .filter(|r| !registered.contains(r.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingRoutes(missing));
            }
        }

        let registry = LoadRegistry::from_components(self.components);
        let updates = UpdateLoop::new(self.updaters, self.clock, &self.config)?;
        Ok(App {
            registry,
            updates,
            config: self.config,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は起動パスと update loop を保持
pub struct App {
    registry: LoadRegistry,
    updates: UpdateLoop,
    config: LifecycleConfig,
}

impl App {
    /// 起動コンポーネントのレジストリ
    pub fn registry(&self) -> &LoadRegistry {
        &self.registry
    }

    /// 現在の設定
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// 起動パスを実行
    pub async fn load(&self) -> Result<StartupReport, StartupError> {
        StartupDriver::new(self.registry.clone(), self.config.failure_policy)
            .run()
            .await
    }

    /// update loop への可変参照
    pub fn updates_mut(&mut self) -> &mut UpdateLoop {
        &mut self.updates
    }

    /// update loop を取り出す（`tokio::spawn(updates.run(rx))` 用）
    pub fn into_update_loop(self) -> UpdateLoop {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LifecycleError;
    use crate::ports::LoadContext;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl OnLoad for Named {
        async fn on_load(&self, _ctx: &LoadContext) -> Result<(), LifecycleError> {
            Ok(())
        }

        fn route(&self) -> &str {
            self.0
        }
    }

    #[async_trait]
    impl OnUpdate for Named {
        async fn on_update(&self, _secs: u64) -> Result<bool, LifecycleError> {
            Ok(true)
        }

        fn route(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new()
            .on_load(Arc::new(Named("database")), Priority::new(0))
            .on_update(Arc::new(Named("saver")))
            .unwrap()
            .expect_routes(&["database", "saver"])
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_routes() {
        let app = AppBuilder::new()
            .on_load(Arc::new(Named("database")), Priority::new(0))
            .expect_routes(&["database", "http"])
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingRoutes(missing)) if missing == vec!["http".to_string()]
        ));
    }

    #[test]
    fn test_duplicate_update_route() {
        let result = AppBuilder::new()
            .on_update(Arc::new(Named("saver")))
            .unwrap()
            .on_update(Arc::new(Named("saver")));
        assert!(matches!(result, Err(BuildError::DuplicateUpdateRoute(r)) if r == "saver"));
    }

    #[tokio::test]
    async fn test_load_uses_discovery_order_within_priority() {
        let app = AppBuilder::new()
            .on_load(Arc::new(Named("http")), Priority::new(10))
            .on_load(Arc::new(Named("database")), Priority::new(0))
            .on_load(Arc::new(Named("config")), Priority::new(0))
            .build()
            .unwrap();

        assert_eq!(
            app.registry().ordered_priorities(),
            vec![Priority::new(0), Priority::new(10)]
        );
        let report = app.load().await.unwrap();
        assert_eq!(report.loaded_routes(), vec!["database", "config", "http"]);
    }

    #[tokio::test]
    async fn test_update_loop_is_wired() {
        let mut app = AppBuilder::new()
            .on_update(Arc::new(Named("saver")))
            .unwrap()
            .build()
            .unwrap();
        let report = app.updates_mut().tick().await;
        assert_eq!(report.ran, vec!["saver"]);
    }
}
