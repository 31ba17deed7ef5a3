use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::models::{
    ai_controller::{DEFAULT_BLOCK_DISTANCE, DEFAULT_BLOCK_WAIT_TIME},
    common::{Attitude3D, Vector3},
    player_controller::LaneCommand,
    vehicle::{ConfigError, SimulationMode, VehicleConfig},
};

/// シナリオメタデータ
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

/// シミュレーション設定
#[derive(Debug, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub dt_s: f64,
    pub t_max_s: f64,
    #[serde(default)]
    pub mode: SimulationMode,
}

/// 物理設定（参照実装の簡易剛体用）
#[derive(Debug, Deserialize, Serialize)]
pub struct PhysicsConfig {
    /// 地面の高さ[m]（省略時は0.0、`null` で地面なし）
    #[serde(default = "default_ground_height")]
    pub ground_height_m: Option<f64>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            ground_height_m: default_ground_height(),
        }
    }
}

fn default_ground_height() -> Option<f64> {
    Some(0.0)
}

/// レーン設定
#[derive(Debug, Deserialize, Serialize)]
pub struct LaneConfig {
    pub name: String,
    pub points: Vec<Vector3>,
}

/// 周回トリガ領域（球）
#[derive(Debug, Deserialize, Serialize)]
pub struct LapTriggerConfig {
    pub center: Vector3,
    pub radius_m: f64,
}

/// 開始姿勢
#[derive(Debug, Deserialize, Serialize)]
pub struct StartConfig {
    pub position: Vector3,
    #[serde(default)]
    pub attitude: Attitude3D,
}

/// ブロック（いじわる）設定
#[derive(Debug, Deserialize, Serialize)]
pub struct BullyConfig {
    pub target: String,
    #[serde(default = "default_block_distance")]
    pub block_distance_m: f64,
    #[serde(default = "default_block_wait_time")]
    pub block_wait_time_s: f64,
}

fn default_block_distance() -> f64 {
    DEFAULT_BLOCK_DISTANCE
}

fn default_block_wait_time() -> f64 {
    DEFAULT_BLOCK_WAIT_TIME
}

fn default_true() -> bool {
    true
}

/// スクリプト入力（プレイヤーのキー押下）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptedInput {
    pub time_s: f64,
    pub command: LaneCommand,
}

/// 車線選択コントローラ設定
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControllerConfig {
    Ai {
        #[serde(default)]
        bully: Option<BullyConfig>,
    },
    Player {
        #[serde(default)]
        inputs: Vec<ScriptedInput>,
    },
}

/// 車両設定
#[derive(Debug, Deserialize, Serialize)]
pub struct VehicleEntry {
    pub id: String,
    pub controller: ControllerConfig,
    pub start: StartConfig,
    /// 初期レーン名
    #[serde(default)]
    pub lane: Option<String>,
    #[serde(default)]
    pub params: VehicleParams,
    /// 物理ボディを持つか
    #[serde(default = "default_true")]
    pub physics: bool,
}

/// 車両パラメータ（YAML上の名前は単位付き）
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleParams {
    pub max_range_m: f64,
    pub speed_mps: f64,
    pub orientation_smooth_time_s: f64,
    pub race_num_laps: u32,
    pub wait_till_next_trigger_s: f64,
    pub gravity_mps2: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        VehicleConfig::default().into()
    }
}

impl From<VehicleConfig> for VehicleParams {
    fn from(config: VehicleConfig) -> Self {
        Self {
            max_range_m: config.max_range,
            speed_mps: config.speed,
            orientation_smooth_time_s: config.orientation_smooth_time,
            race_num_laps: config.race_num_laps,
            wait_till_next_trigger_s: config.wait_till_next_trigger,
            gravity_mps2: config.gravity_accel,
        }
    }
}

impl From<&VehicleParams> for VehicleConfig {
    fn from(params: &VehicleParams) -> Self {
        Self {
            max_range: params.max_range_m,
            speed: params.speed_mps,
            orientation_smooth_time: params.orientation_smooth_time_s,
            race_num_laps: params.race_num_laps,
            wait_till_next_trigger: params.wait_till_next_trigger_s,
            gravity_accel: params.gravity_mps2,
        }
    }
}

/// 完全なシナリオ設定（レベル構成）
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// レーン一覧（順序が左右の並びを表す）
    pub lanes: Vec<LaneConfig>,
    #[serde(default)]
    pub lap_trigger: Option<LapTriggerConfig>,
    pub vehicles: Vec<VehicleEntry>,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::ParseError(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// 設定の検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        // 時間設定の検証
        if self.sim.dt_s <= 0.0 {
            return Err(ScenarioError::ValidationError("dt_s must be positive".to_string()));
        }
        if self.sim.t_max_s <= 0.0 {
            return Err(ScenarioError::ValidationError("t_max_s must be positive".to_string()));
        }

        // レーンの検証
        if self.lanes.is_empty() {
            return Err(ScenarioError::ValidationError("at least one lane is required".to_string()));
        }
        let mut lane_names = HashSet::new();
        for lane in &self.lanes {
            if !lane_names.insert(lane.name.as_str()) {
                return Err(ScenarioError::ValidationError(format!("duplicate lane name: {}", lane.name)));
            }
            if lane.points.is_empty() {
                // 空レーンでは車両が目標を見つけられない（コース外扱いになる）
                warn!("レーン {} にウェイポイントがありません", lane.name);
            }
        }

        if self.physics.ground_height_m.is_none() && self.vehicles.iter().any(|v| v.physics) {
            // 地面がないと接地用加速度で落下し続け、目標を見失う
            warn!("physics.ground_height_m が未設定です。物理ボディを持つ車両は落下します");
        }

        if let Some(trigger) = &self.lap_trigger {
            if trigger.radius_m <= 0.0 {
                return Err(ScenarioError::ValidationError("lap_trigger.radius_m must be positive".to_string()));
            }
        }

        // 車両の検証
        let vehicle_ids: HashSet<&str> = self.vehicles.iter().map(|v| v.id.as_str()).collect();
        if vehicle_ids.len() != self.vehicles.len() {
            return Err(ScenarioError::ValidationError("duplicate vehicle id".to_string()));
        }

        for vehicle in &self.vehicles {
            if let Some(lane) = &vehicle.lane {
                if !lane_names.contains(lane.as_str()) {
                    return Err(ScenarioError::ValidationError(
                        format!("vehicle {} references unknown lane {}", vehicle.id, lane)
                    ));
                }
            }

            VehicleConfig::from(&vehicle.params)
                .validate()
                .map_err(|e| ScenarioError::InvalidVehicle(vehicle.id.clone(), e))?;

            match &vehicle.controller {
                ControllerConfig::Ai { bully: Some(bully) } => {
                    if bully.target == vehicle.id {
                        return Err(ScenarioError::ValidationError(
                            format!("vehicle {} cannot bully itself", vehicle.id)
                        ));
                    }
                    if !vehicle_ids.contains(bully.target.as_str()) {
                        return Err(ScenarioError::ValidationError(
                            format!("vehicle {} bullies unknown vehicle {}", vehicle.id, bully.target)
                        ));
                    }
                    if bully.block_distance_m < 0.0 || bully.block_wait_time_s < 0.0 {
                        return Err(ScenarioError::ValidationError(
                            format!("vehicle {} has negative bully parameters", vehicle.id)
                        ));
                    }
                }
                ControllerConfig::Ai { bully: None } => {}
                ControllerConfig::Player { inputs } => {
                    if inputs.iter().any(|input| input.time_s < 0.0) {
                        return Err(ScenarioError::ValidationError(
                            format!("vehicle {} has input scheduled before t=0", vehicle.id)
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}秒", self.sim.dt_s);
        println!("最大時間: {:.1}秒", self.sim.t_max_s);
        println!("モード: {:?}", self.sim.mode);
        println!();

        println!("=== レーン ===");
        for lane in &self.lanes {
            println!("  {}: {}点", lane.name, lane.points.len());
        }
        println!();

        println!("=== 車両 ===");
        for vehicle in &self.vehicles {
            let kind = match &vehicle.controller {
                ControllerConfig::Ai { bully: Some(bully) } => format!("AI (ブロック対象: {})", bully.target),
                ControllerConfig::Ai { bully: None } => "AI".to_string(),
                ControllerConfig::Player { inputs } => format!("プレイヤー (入力: {}件)", inputs.len()),
            };
            println!(
                "  {}: {} / レーン: {} / {}周",
                vehicle.id,
                kind,
                vehicle.lane.as_deref().unwrap_or("-"),
                vehicle.params.race_num_laps
            );
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    ValidationError(String),
    #[error("車両 {0} のパラメータが不正です: {1}")]
    InvalidVehicle(String, #[source] ConfigError),
}
