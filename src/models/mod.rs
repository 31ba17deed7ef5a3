// 基本的なデータ型と数学ユーティリティ
pub mod common;

// 物理・レース・車線選択のインターフェース（trait）定義
pub mod traits;

// レーンと目標探索
pub mod lane;
pub mod locator;

// ヘディング平滑化と運動更新
pub mod steering;

// 参照用の簡易剛体
pub mod body;

// 車線選択コントローラ
pub mod ai_controller;
pub mod player_controller;

// 車両本体
pub mod vehicle;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use lane::{Lane, LaneId, LaneSet};
pub use locator::{find_target, TargetFix};
pub use steering::{HeadingSmoother, MotionAdvancer, MotionStep};
pub use body::SimpleBody;
pub use ai_controller::{AiController, BlockState, BullyPolicy};
pub use player_controller::{LaneCommand, PlayerController};
pub use vehicle::{
    ConfigError, LapTriggerOutcome, SimulationMode, TickContext, TickOutcome, Vehicle, VehicleConfig, VehicleId,
    VehicleRuntimeState,
};
