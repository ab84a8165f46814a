//! OnLoad port - 起動時に一度だけ実行されるアクション

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{LifecycleError, Priority, RegistryError};
use crate::registry::Registry;

/// ドライバとアクションが共有する起動コンポーネントのレジストリ
pub type LoadRegistry = Registry<Arc<dyn OnLoad>>;

/// 起動時に一度だけ実行されるアクションを持つコンポーネント
///
/// # 使用例
/// ```ignore
/// struct DatabaseImporter;
///
/// #[async_trait]
/// impl OnLoad for DatabaseImporter {
///     async fn on_load(&self, ctx: &LoadContext) -> Result<(), LifecycleError> {
///         ctx.register(Priority::new(100), Arc::new(LateExtension));
///         Ok(())
///     }
///
///     fn route(&self) -> &str {
///         "database-importer"
///     }
/// }
/// ```
#[async_trait]
pub trait OnLoad: Send + Sync {
    /// 起動アクションを実行
    async fn on_load(&self, ctx: &LoadContext) -> Result<(), LifecycleError>;

    /// ログとレポートに使う名前
    fn route(&self) -> &str;
}

/// 各 `on_load` に渡されるコンテキスト
///
/// 登録は走査中のレジストリに直接入るため、実行中のコンポーネント以降に
/// 登録されたものは同じパスの後半で読み込まれる
#[derive(Clone)]
pub struct LoadContext {
    registry: LoadRegistry,
}

impl LoadContext {
    /// 新しい LoadContext を作成
    pub fn new(registry: LoadRegistry) -> Self {
        Self { registry }
    }

    /// 走査中のレジストリ
    pub fn registry(&self) -> &LoadRegistry {
        &self.registry
    }

    /// 優先度 tier の末尾に追加
    pub fn register(&self, priority: Priority, component: Arc<dyn OnLoad>) {
        tracing::debug!(%priority, route = component.route(), "registered component");
        self.registry.register(priority, component);
    }

    /// 優先度 tier 内の論理位置に挿入（範囲外なら何も変えずにエラー）
    pub fn insert(
        &self,
        priority: Priority,
        index: usize,
        component: Arc<dyn OnLoad>,
    ) -> Result<(), RegistryError> {
        let route = component.route().to_string();
        self.registry.tier_for(priority).insert(index, component)?;
        tracing::debug!(%priority, index, route = %route, "inserted component");
        Ok(())
    }
}
