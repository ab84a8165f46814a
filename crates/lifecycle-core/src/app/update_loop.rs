//! UpdateLoop - 定期実行ループ
//!
//! 固定 tick ごとに全 OnUpdate コンポーネントを呼び出し、
//! 最後に実行された時刻からの経過秒数を渡します。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::app::builder::BuildError;
use crate::app::config::LifecycleConfig;
use crate::app::status::TickReport;
use crate::ports::{Clock, OnUpdate};

/// UpdateLoop は tick ごとに全 OnUpdate を一度ずつ呼び出す
///
/// # 方針
/// - 経過秒数は最後に `true` を返した時刻（未実行ならループ作成時刻）から計算
/// - エラーはログに残すだけで、ループは止めない
/// - `stale_update_warning` を超えて idle のコンポーネントは、
///   次に実行されるまで一度だけ warn する
pub struct UpdateLoop {
    updaters: Vec<Arc<dyn OnUpdate>>,
    clock: Arc<dyn Clock>,
    last_run: HashMap<String, DateTime<Utc>>,
    stale_warned: HashSet<String>,
    interval: Duration,
    stale_after: Duration,
}

impl UpdateLoop {
    /// 新しい UpdateLoop を作成
    ///
    /// route は経過時間のキーになるため、重複があれば
    /// `BuildError::DuplicateUpdateRoute` を返す
    pub fn new(
        updaters: Vec<Arc<dyn OnUpdate>>,
        clock: Arc<dyn Clock>,
        config: &LifecycleConfig,
    ) -> Result<Self, BuildError> {
        let started = clock.now();
        let mut last_run = HashMap::with_capacity(updaters.len());
        for updater in &updaters {
            let route = updater.route().to_string();
            if last_run.insert(route.clone(), started).is_some() {
                return Err(BuildError::DuplicateUpdateRoute(route));
            }
        }
        Ok(Self {
            updaters,
            clock,
            last_run,
            stale_warned: HashSet::new(),
            interval: config.update_interval,
            stale_after: config.stale_update_warning,
        })
    }

    /// 登録順の route 一覧
    pub fn routes(&self) -> Vec<&str> {
        self.updaters.iter().map(|u| u.route()).collect()
    }

    /// route が最後に実行された時刻
    pub fn last_run(&self, route: &str) -> Option<DateTime<Utc>> {
        self.last_run.get(route).copied()
    }

    /// 現在の idle 期間ですでに warn 済みか
    pub(crate) fn is_stale_warned(&self, route: &str) -> bool {
        self.stale_warned.contains(route)
    }

    /// 全 updater を一巡する
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for updater in &self.updaters {
            let route = updater.route().to_string();
            let now = self.clock.now();
            let last = *self.last_run.entry(route.clone()).or_insert(now);
            let elapsed = (now - last).num_seconds().max(0) as u64;

            match updater.on_update(elapsed).await {
                Ok(true) => {
                    tracing::trace!(route = %route, elapsed, "update ran");
                    self.last_run.insert(route.clone(), now);
                    self.stale_warned.remove(&route);
                    report.ran.push(route);
                }
                Ok(false) => {
                    let stale = elapsed >= self.stale_after.as_secs();
                    if stale && self.stale_warned.insert(route.clone()) {
                        tracing::warn!(route = %route, elapsed, "updater has not run recently");
                    }
                    report.idle.push(route);
                }
                Err(err) => {
                    tracing::error!(route = %route, error = %err, "update failed");
                    report.failed.push(route);
                }
            }
        }

        report
    }

    /// `shutdown` が true になるか sender が drop されるまで tick し続ける
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            updaters = self.updaters.len(),
            interval_ms = self.interval.as_millis() as u64,
            "update loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        tracing::info!("update loop stopped");
    }
}
