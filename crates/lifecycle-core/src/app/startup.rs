//! StartupDriver - 起動パスの実行
//!
//! レジストリを一度だけ列挙し、各コンポーネントの on_load を順番に await します。

use crate::app::config::FailurePolicy;
use crate::app::status::{FailedComponent, LoadedComponent, StartupReport};
use crate::domain::{LifecycleError, Priority};
use crate::ports::{LoadContext, LoadRegistry};

/// 起動パスのエラー
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("component '{route}' (priority {priority}) failed to load: {source}")]
    ComponentFailed {
        route: String,
        priority: Priority,
        #[source]
        source: LifecycleError,
    },
}

/// StartupDriver はレジストリに対して起動パスを一度だけ実行
///
/// 各アクションの完了を await してから cursor を進めるため、
/// アクション内で登録されたコンポーネントは同じパスの後半で拾われる
pub struct StartupDriver {
    registry: LoadRegistry,
    policy: FailurePolicy,
}

impl StartupDriver {
    /// 新しい StartupDriver を作成
    pub fn new(registry: LoadRegistry, policy: FailurePolicy) -> Self {
        Self { registry, policy }
    }

    /// 起動パスを実行
    pub async fn run(&self) -> Result<StartupReport, StartupError> {
        let ctx = LoadContext::new(self.registry.clone());
        let mut cursor = self.registry.enumerate();
        let mut report = StartupReport::default();

        tracing::info!(
            tiers = self.registry.visible_tier_count(),
            components = self.registry.component_count(),
            "starting load pass"
        );

        while let Some((priority, component)) = cursor.next_entry() {
            let route = component.route().to_string();
            tracing::debug!(%priority, route = %route, "loading component");

            match component.on_load(&ctx).await {
                Ok(()) => report.loaded.push(LoadedComponent { route, priority }),
                Err(source) => match self.policy {
                    FailurePolicy::Abort => {
                        tracing::error!(%priority, route = %route, error = %source, "load failed, aborting");
                        return Err(StartupError::ComponentFailed {
                            route,
                            priority,
                            source,
                        });
                    }
                    FailurePolicy::Continue => {
                        tracing::warn!(
                            %priority,
                            route = %route,
                            kind = ?source.kind(),
                            error = %source,
                            "load failed, continuing"
                        );
                        report.failed.push(FailedComponent {
                            route,
                            priority,
                            error: source.to_string(),
                        });
                    }
                },
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "load pass complete"
        );
        Ok(report)
    }
}
