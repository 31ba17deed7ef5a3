use std::any::Any;
use std::fmt::Debug;

use crate::models::{
    common::{Attitude3D, Vector3},
    lane::{LaneId, LaneSet},
    player_controller::LaneCommand,
    vehicle::VehicleId,
};

/// 物理コラボレータのインターフェース
///
/// 剛体の位置・姿勢・速度の読み書きと力の付加を提供します。
/// 衝突解決や接地はこの実装側の責務です。
pub trait IPhysicsBody: Debug {
    /// 現在位置の取得
    fn position(&self) -> Vector3;

    /// 位置の設定
    fn set_position(&mut self, position: Vector3);

    /// 現在姿勢の取得
    fn rotation(&self) -> Attitude3D;

    /// 姿勢の設定
    fn set_rotation(&mut self, rotation: Attitude3D);

    /// 継続的な加速度の付加（次の積分で適用）
    fn add_acceleration(&mut self, acceleration: Vector3);

    /// キネマティック（物理演算停止）状態かどうか
    fn is_kinematic(&self) -> bool;

    fn set_kinematic(&mut self, kinematic: bool);

    fn linear_velocity(&self) -> Vector3;

    fn set_linear_velocity(&mut self, velocity: Vector3);

    fn angular_velocity(&self) -> Vector3;

    fn set_angular_velocity(&mut self, velocity: Vector3);

    /// 1ティック分の積分（ホストのゲームループから呼ばれる）
    fn integrate(&mut self, dt: f64);
}

/// レースコントローラのインターフェース
///
/// 通知フックはすべて既定で何もしません。必要なものだけ上書きします。
pub trait IRaceController {
    /// 車両がレースを完走した
    fn on_vehicle_finished(&mut self, _vehicle_id: &VehicleId, _lap_count: u32, _time: f64) {}

    /// プレイヤーの周回数更新
    fn on_player_lap(&mut self, _vehicle_id: &VehicleId, _completed_laps: u32) {}

    /// プレイヤーがコースを外れた（目標ウェイポイントなし）
    fn on_vehicle_left_track(&mut self, _vehicle_id: &VehicleId, _time: f64) {}
}

/// 車線選択コントローラの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Ai,
    Player,
}

/// 他車両の観測スナップショット
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedVehicle {
    pub position: Vector3,
    pub lane: Option<LaneId>,
}

/// 車線選択時に参照する情報
#[derive(Debug, Clone, Copy)]
pub struct LaneSelectContext<'a> {
    /// シミュレーション時刻[s]
    pub now: f64,
    /// 自車位置
    pub position: Vector3,
    /// 自車の現在レーン
    pub current_lane: Option<LaneId>,
    /// レベルのレーン一覧
    pub lanes: &'a LaneSet,
    /// 観測対象車両（AIのブロック対象）
    pub observed: Option<ObservedVehicle>,
}

/// 車線変更の指示
///
/// 変更先が `None` の場合はレーン未設定に切り替えます
/// （レーンを持たない車両に合わせる場合）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneChange(pub Option<LaneId>);

impl LaneChange {
    pub fn to(lane: LaneId) -> Self {
        Self(Some(lane))
    }
}

/// 車線選択コントローラのインターフェース
///
/// AI用とプレイヤー用の実装を車両ごとに差し替えます。
pub trait ILaneSelector: Debug {
    fn kind(&self) -> ControllerKind;

    /// 毎ティック観測したい車両のID
    fn observed_vehicle(&self) -> Option<&VehicleId> {
        None
    }

    /// 車線選択の評価。レーンを変更する場合は変更先を返す
    fn select_lane(&mut self, ctx: &LaneSelectContext<'_>) -> Option<LaneChange>;

    /// 入力コマンドの受け付け（受け付けた場合true）
    fn push_command(&mut self, _command: LaneCommand) -> bool {
        false
    }

    /// 未処理の入力コマンドを捨てる（車線選択が止まっている間の入力は無効）
    fn discard_commands(&mut self) {}

    /// 一時状態のクリア
    fn reset(&mut self) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
