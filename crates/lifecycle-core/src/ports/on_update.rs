//! OnUpdate port - 定期実行されるアクション

use async_trait::async_trait;

use crate::domain::LifecycleError;

/// 固定 tick ごとに呼び出されるコンポーネント
///
/// 十分な時間が経過したかはコンポーネント自身が判断し、実際に処理したときだけ
/// `true` を返す（経過時間がリセットされる）
#[async_trait]
pub trait OnUpdate: Send + Sync {
    /// 定期アクションを実行（実際に処理したら `true`）
    async fn on_update(&self, secs_since_last_run: u64) -> Result<bool, LifecycleError>;

    /// ログとレポートに使う名前
    fn route(&self) -> &str;
}
