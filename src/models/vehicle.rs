use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::models::{
    ai_controller::AiController,
    common::{Vector3, VehiclePose},
    lane::{LaneId, LaneSet},
    locator::{find_target, TargetFix},
    player_controller::LaneCommand,
    steering::{HeadingSmoother, MotionAdvancer},
    traits::{
        ControllerKind, ILaneSelector, IPhysicsBody, IRaceController, LaneChange, LaneSelectContext, ObservedVehicle,
    },
};

/// 探索距離の既定値[m]
pub const DEFAULT_MAX_RANGE: f64 = 15.0;
/// 車両速度の既定値[m/s]
pub const DEFAULT_SPEED: f64 = 10.0;
/// 姿勢平滑化時定数の既定値[s]
pub const DEFAULT_ORIENTATION_SMOOTH_TIME: f64 = 0.05;
/// 完走周回数の既定値
pub const DEFAULT_RACE_NUM_LAPS: u32 = 6;
/// 周回トリガの再受付までの時間の既定値[s]
pub const DEFAULT_WAIT_TILL_NEXT_TRIGGER: f64 = 10.0;
/// 接地用加速度の既定値[m/s²]
pub const DEFAULT_GRAVITY_ACCEL: f64 = 100.0;

/// 車両識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// シミュレーションモード
///
/// `Editor` ではプレビューのみで、車両は動かず力も加えません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    #[default]
    Play,
    Editor,
}

/// 車両パラメータ設定エラー
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} は正の値である必要があります: {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} は0以上である必要があります: {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("race_num_laps は1以上である必要があります")]
    NoLaps,
}

/// 車両パラメータ
///
/// オーサリング時に設定し、レース中は変更しない前提の値です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// ウェイポイント探索距離[m]
    pub max_range: f64,
    /// 車両速度[m/s]
    pub speed: f64,
    /// 姿勢平滑化の時定数[s]
    pub orientation_smooth_time: f64,
    /// 完走に必要な周回数
    pub race_num_laps: u32,
    /// 周回トリガを再び受け付けるまでの時間[s]
    pub wait_till_next_trigger: f64,
    /// 接地用の下向き加速度[m/s²]
    pub gravity_accel: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_MAX_RANGE,
            speed: DEFAULT_SPEED,
            orientation_smooth_time: DEFAULT_ORIENTATION_SMOOTH_TIME,
            race_num_laps: DEFAULT_RACE_NUM_LAPS,
            wait_till_next_trigger: DEFAULT_WAIT_TILL_NEXT_TRIGGER,
            gravity_accel: DEFAULT_GRAVITY_ACCEL,
        }
    }
}

impl VehicleConfig {
    /// パラメータの検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_range <= 0.0 {
            return Err(ConfigError::NotPositive { name: "max_range", value: self.max_range });
        }
        if self.orientation_smooth_time <= 0.0 {
            return Err(ConfigError::NotPositive {
                name: "orientation_smooth_time",
                value: self.orientation_smooth_time,
            });
        }
        if self.speed < 0.0 {
            return Err(ConfigError::Negative { name: "speed", value: self.speed });
        }
        if self.wait_till_next_trigger < 0.0 {
            return Err(ConfigError::Negative {
                name: "wait_till_next_trigger",
                value: self.wait_till_next_trigger,
            });
        }
        if self.gravity_accel < 0.0 {
            return Err(ConfigError::Negative { name: "gravity_accel", value: self.gravity_accel });
        }
        if self.race_num_laps == 0 {
            return Err(ConfigError::NoLaps);
        }
        Ok(())
    }
}

/// 車両の実行時状態
#[derive(Debug, Clone)]
pub struct VehicleRuntimeState {
    /// 走行中のレーン（レーン自体は所有しない）
    pub active_lane: Option<LaneId>,
    /// 周回数
    pub lap_count: u32,
    /// レース中かどうか
    pub is_racing: bool,
    /// ヘディング平滑化の内部状態
    pub smoother: HeadingSmoother,
    /// 最後に受け付けた周回トリガの時刻[s]
    pub last_trigger_time: Option<f64>,
}

impl VehicleRuntimeState {
    fn new(active_lane: Option<LaneId>) -> Self {
        Self {
            active_lane,
            lap_count: 0,
            is_racing: true,
            smoother: HeadingSmoother::new(),
            last_trigger_time: None,
        }
    }
}

/// 周回トリガの処理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapTriggerOutcome {
    pub lap_count: u32,
    /// クールダウン外で受け付けられたか
    pub accepted: bool,
    /// 完走条件を満たしたか
    pub finished: bool,
}

/// 1ティックの処理に必要な外部情報
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub now: f64,
    pub dt: f64,
    pub lanes: &'a LaneSet,
    pub mode: SimulationMode,
    /// ブロック対象車両のスナップショット
    pub observed: Option<ObservedVehicle>,
}

/// 1ティックの処理結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub target: TargetFix,
    pub lane_changed: Option<LaneChange>,
    /// 位置・姿勢を更新したか
    pub moved: bool,
}

impl TickOutcome {
    fn idle() -> Self {
        Self {
            target: TargetFix::NONE,
            lane_changed: None,
            moved: false,
        }
    }
}

/// レーン追従車両
///
/// 車線選択（AI/プレイヤー）→ 目標探索 → ヘディング平滑化 → 運動更新 の順に
/// 1ティックを処理します。位置・姿勢の確定は物理コラボレータに委ねます。
#[derive(Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    config: VehicleConfig,
    controller: Box<dyn ILaneSelector>,
    body: Option<Box<dyn IPhysicsBody>>,
    pose: VehiclePose,
    start_pose: VehiclePose,
    /// 開始姿勢の上方向から求めた接地用加速度
    gravity: Vector3,
    state: VehicleRuntimeState,
}

impl Vehicle {
    /// 新しい車両を作成し、開始姿勢へリセットします
    ///
    /// # 引数
    ///
    /// * `id` - 車両ID
    /// * `config` - 車両パラメータ
    /// * `controller` - 車線選択コントローラ（AI/プレイヤー）
    /// * `start_pose` - 開始姿勢
    /// * `body` - 物理コラボレータ（無い場合は操舵と接地力を行わない）
    /// * `lane` - 初期レーン
    pub fn new(
        id: VehicleId,
        config: VehicleConfig,
        controller: Box<dyn ILaneSelector>,
        start_pose: VehiclePose,
        body: Option<Box<dyn IPhysicsBody>>,
        lane: Option<LaneId>,
    ) -> Self {
        let gravity = MotionAdvancer::gravity(start_pose.up(), config.gravity_accel);
        let mut vehicle = Self {
            id,
            config,
            controller,
            body,
            pose: start_pose,
            start_pose,
            gravity,
            state: VehicleRuntimeState::new(lane),
        };
        vehicle.reset_vehicle();
        vehicle
    }

    /// 1ティック分の処理
    pub fn tick(&mut self, ctx: &TickContext<'_>, race: &mut dyn IRaceController) -> TickOutcome {
        if ctx.mode == SimulationMode::Editor {
            self.controller.discard_commands();
            return TickOutcome::idle();
        }

        self.sync_pose_from_body();

        match self.body.as_mut() {
            Some(body) => body.add_acceleration(self.gravity),
            None => trace!("{}: 物理ボディ未設定のため接地力をスキップ", self.id),
        }

        if !self.state.is_racing {
            self.controller.discard_commands();
            return TickOutcome::idle();
        }

        let select_ctx = LaneSelectContext {
            now: ctx.now,
            position: self.pose.position,
            current_lane: self.state.active_lane,
            lanes: ctx.lanes,
            observed: ctx.observed,
        };
        let lane_changed = self.controller.select_lane(&select_ctx);
        if let Some(LaneChange(lane)) = lane_changed {
            info!("{}: レーン変更 {:?} -> {:?}", self.id, self.state.active_lane, lane);
            self.state.active_lane = lane;
        }

        let (target, moved) = self.follow_lane(ctx, race);

        TickOutcome {
            target,
            lane_changed,
            moved,
        }
    }

    /// 現在レーンに沿って操舵・前進する
    fn follow_lane(&mut self, ctx: &TickContext<'_>, race: &mut dyn IRaceController) -> (TargetFix, bool) {
        let target = self.preview_target(ctx.lanes);

        if !target.is_found() {
            debug!("{}: 目標ウェイポイントなし（コース外）", self.id);
            if self.controller.kind() == ControllerKind::Player {
                race.on_vehicle_left_track(&self.id, ctx.now);
            }
            return (target, false);
        }

        let Some(body) = self.body.as_mut() else {
            trace!("{}: 物理ボディ未設定のため操舵をスキップ", self.id);
            return (target, false);
        };

        let yaw = self.state.smoother.smooth(
            self.pose.attitude.yaw,
            target.angle_deg,
            self.config.orientation_smooth_time,
            ctx.dt,
        );
        let step = MotionAdvancer::advance(&self.pose.attitude, yaw, self.config.speed, ctx.dt);
        let position = self.pose.position + step.delta;

        body.set_rotation(step.attitude);
        body.set_position(position);
        self.pose = VehiclePose::new(position, step.attitude);

        trace!(
            "{}: 目標角度 {:.2}度, ヨー {:.2}度, 位置 ({:.2}, {:.2}, {:.2})",
            self.id, target.angle_deg, step.attitude.yaw, position.x, position.y, position.z
        );

        (target, true)
    }

    /// 現在の姿勢とレーンでの探索結果（状態は変更しない）
    pub fn preview_target(&self, lanes: &LaneSet) -> TargetFix {
        let lane = self.state.active_lane.and_then(|id| lanes.get(id));
        find_target(&self.pose, lane, self.config.max_range)
    }

    /// 物理ボディを1ティック積分し、姿勢を同期する
    pub fn step_physics(&mut self, dt: f64) {
        if let Some(body) = self.body.as_mut() {
            body.integrate(dt);
        }
        self.sync_pose_from_body();
    }

    fn sync_pose_from_body(&mut self) {
        if let Some(body) = self.body.as_ref() {
            self.pose = VehiclePose::new(body.position(), body.rotation());
        }
    }

    /// 周回トリガ領域への進入
    ///
    /// 周回数は常に加算します。前回受け付けから `wait_till_next_trigger` 秒を
    /// 超えている場合（または初回）のみ受け付け、完走判定と通知を行います。
    pub fn on_lap_trigger(&mut self, now: f64, race: &mut dyn IRaceController) -> LapTriggerOutcome {
        self.state.lap_count += 1;

        let accepted = match self.state.last_trigger_time {
            None => true,
            Some(last) => now - last > self.config.wait_till_next_trigger,
        };

        let mut finished = false;
        if accepted {
            if self.controller.kind() == ControllerKind::Player {
                race.on_player_lap(&self.id, self.state.lap_count.saturating_sub(1));
            }

            if self.state.lap_count >= self.config.race_num_laps {
                finished = true;
                info!("{}: 完走 ({}周, {:.1}秒)", self.id, self.state.lap_count, now);
                race.on_vehicle_finished(&self.id, self.state.lap_count, now);
            }

            self.state.last_trigger_time = Some(now);
        } else {
            debug!("{}: 周回トリガはクールダウン中 (周回数: {})", self.id, self.state.lap_count);
        }

        LapTriggerOutcome {
            lap_count: self.state.lap_count,
            accepted,
            finished,
        }
    }

    pub fn is_racing(&self) -> bool {
        self.state.is_racing
    }

    pub fn start_race(&mut self) {
        self.state.is_racing = true;
        self.state.lap_count = 0;
        self.controller.discard_commands();
    }

    pub fn stop_race(&mut self) {
        self.state.is_racing = false;
        self.state.lap_count = 0;
        self.controller.discard_commands();
    }

    /// 開始位置・姿勢へ戻す
    ///
    /// 瞬間移動中の衝突反発を避けるため、一時的にキネマティックにしてから戻します。
    pub fn reset_vehicle(&mut self) {
        if let Some(body) = self.body.as_mut() {
            body.set_linear_velocity(Vector3::ZERO);
            body.set_angular_velocity(Vector3::ZERO);
            body.set_kinematic(true);
            body.set_rotation(self.start_pose.attitude);
            body.set_position(self.start_pose.position);
        }

        self.pose = self.start_pose;

        if let Some(body) = self.body.as_mut() {
            body.set_kinematic(false);
        }

        self.state.smoother.reset();
        self.controller.reset();
        debug!("{}: 開始位置にリセット", self.id);
    }

    /// 入力コマンドを渡す（プレイヤー以外、またはレース中でなければ受け付けない）
    pub fn push_lane_command(&mut self, command: LaneCommand) -> bool {
        if !self.state.is_racing {
            trace!("{}: レース中でないため入力を破棄 ({:?})", self.id, command);
            return false;
        }
        self.controller.push_command(command)
    }

    /// ブロック対象など観測対象の車両ID
    pub fn observed_vehicle(&self) -> Option<&VehicleId> {
        self.controller.observed_vehicle()
    }

    /// 他車両から見た自車のスナップショット
    pub fn observation(&self) -> ObservedVehicle {
        ObservedVehicle {
            position: self.pose.position,
            lane: self.state.active_lane,
        }
    }

    pub fn controller_kind(&self) -> ControllerKind {
        self.controller.kind()
    }

    /// AIコントローラへの可変参照（AI車両のみ）
    pub fn ai_controller_mut(&mut self) -> Option<&mut AiController> {
        self.controller.as_any_mut().downcast_mut::<AiController>()
    }

    pub fn pose(&self) -> &VehiclePose {
        &self.pose
    }

    pub fn start_pose(&self) -> &VehiclePose {
        &self.start_pose
    }

    pub fn state(&self) -> &VehicleRuntimeState {
        &self.state
    }

    pub fn body(&self) -> Option<&dyn IPhysicsBody> {
        self.body.as_deref()
    }

    pub fn lap_count(&self) -> u32 {
        self.state.lap_count
    }

    pub fn active_lane(&self) -> Option<LaneId> {
        self.state.active_lane
    }

    pub fn set_active_lane(&mut self, lane: Option<LaneId>) {
        self.state.active_lane = lane;
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: VehicleConfig) {
        self.config = config;
        self.gravity = MotionAdvancer::gravity(self.start_pose.up(), self.config.gravity_accel);
    }

    pub fn set_max_range(&mut self, max_range: f64) {
        self.config.max_range = max_range;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.config.speed = speed;
    }

    pub fn set_orientation_smooth_time(&mut self, smooth_time: f64) {
        self.config.orientation_smooth_time = smooth_time;
    }

    pub fn set_race_num_laps(&mut self, laps: u32) {
        self.config.race_num_laps = laps;
    }

    pub fn set_wait_till_next_trigger(&mut self, wait: f64) {
        self.config.wait_till_next_trigger = wait;
    }

    pub fn set_gravity_accel(&mut self, gravity_accel: f64) {
        self.config.gravity_accel = gravity_accel;
        self.gravity = MotionAdvancer::gravity(self.start_pose.up(), gravity_accel);
    }
}
