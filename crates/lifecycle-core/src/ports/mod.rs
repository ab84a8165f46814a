//! Ports - 抽象化レイヤー
//!
//! コンポーネントが提供する能力（起動時アクション、定期アクション）と
//! 時刻の抽象化を定義します。レジストリはこれ以外の具体型を知りません。

pub mod clock;
pub mod on_load;
pub mod on_update;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::on_load::{LoadContext, LoadRegistry, OnLoad};
pub use self::on_update::OnUpdate;
