//! # Simulation モジュール
//!
//! レーン追従シミュレーションのゲームループを提供します。
//!
//! シナリオ（レベル構成）からレーンと車両を構築し、可変Δtのティックごとに
//! すべての車両を1回ずつ更新します。車両間の処理順序は登録順ですが、
//! 順序そのものは契約に含まれません。
//!
//! ## ティック内の処理順序
//!
//! 1. **入力配送**: 時刻に達したスクリプト入力をプレイヤー車両へ渡す
//! 2. **車両処理**: 車線選択 → 目標探索 → 平滑化 → 運動更新
//! 3. **物理処理**: 各車両の物理ボディを積分
//! 4. **周回判定**: 周回トリガ領域への進入を検出して通知
//!
//! ## 使用例
//!
//! ```no_run
//! use lanesim::scenario::ScenarioConfig;
//! use lanesim::simulation::SimulationEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/oval_track.yaml")?;
//! let mut engine = SimulationEngine::new(config, 1);
//! engine.initialize()?;
//! engine.run();
//! # Ok::<(), lanesim::scenario::ScenarioError>(())
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, trace, warn};

use crate::models::*;
use crate::scenario::{ControllerConfig, ScenarioConfig, ScenarioError};

/// 完走記録
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub vehicle_id: VehicleId,
    pub lap_count: u32,
    pub time: f64,
}

/// レースコントローラの実装（結果を記録してログに出す）
#[derive(Debug, Default)]
pub struct RaceLog {
    /// 完走順の記録
    pub finishes: Vec<RaceResult>,
    /// プレイヤーごとの完了周回数
    pub player_laps: HashMap<VehicleId, u32>,
    /// コース外イベントの回数
    pub left_track_events: HashMap<VehicleId, u64>,
}

impl RaceLog {
    pub fn has_finished(&self, vehicle_id: &VehicleId) -> bool {
        self.finishes.iter().any(|r| &r.vehicle_id == vehicle_id)
    }
}

impl IRaceController for RaceLog {
    fn on_vehicle_finished(&mut self, vehicle_id: &VehicleId, lap_count: u32, time: f64) {
        // 周回トリガは完走後も届くので最初の1回だけ記録する
        if self.has_finished(vehicle_id) {
            return;
        }
        info!("完走: {} ({}位, {}周, {:.1}秒)", vehicle_id, self.finishes.len() + 1, lap_count, time);
        self.finishes.push(RaceResult {
            vehicle_id: vehicle_id.clone(),
            lap_count,
            time,
        });
    }

    fn on_player_lap(&mut self, vehicle_id: &VehicleId, completed_laps: u32) {
        info!("プレイヤー {} 周回数: {}", vehicle_id, completed_laps);
        self.player_laps.insert(vehicle_id.clone(), completed_laps);
    }

    fn on_vehicle_left_track(&mut self, vehicle_id: &VehicleId, time: f64) {
        let count = self.left_track_events.entry(vehicle_id.clone()).or_insert(0);
        if *count == 0 {
            warn!("プレイヤー {} がコースを外れました ({:.2}秒)", vehicle_id, time);
        }
        *count += 1;
    }
}

/// 車両レジストリ
///
/// 車両間の参照（ブロック対象など）はIDで引きます。
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    vehicles: Vec<Vehicle>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 車両を登録（同じIDがあれば置き換えて古い車両を返す）
    pub fn insert(&mut self, vehicle: Vehicle) -> Option<Vehicle> {
        match self.index_of(&vehicle.id) {
            Some(index) => Some(std::mem::replace(&mut self.vehicles[index], vehicle)),
            None => {
                self.vehicles.push(vehicle);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &VehicleId) -> Option<Vehicle> {
        let index = self.index_of(id)?;
        Some(self.vehicles.remove(index))
    }

    pub fn get(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn get_mut(&mut self, id: &VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| &v.id == id)
    }

    pub fn index_of(&self, id: &VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| &v.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// 指定車両が観測している車両のスナップショット
    fn observation_for(&self, index: usize) -> Option<ObservedVehicle> {
        let target = self.vehicles[index].observed_vehicle()?;
        self.get(target).map(Vehicle::observation)
    }
}

/// 周回トリガ領域（球）
#[derive(Debug, Clone, Copy)]
pub struct LapRegion {
    pub center: Vector3,
    pub radius: f64,
}

impl LapRegion {
    pub fn contains(&self, position: &Vector3) -> bool {
        self.center.distance(position) <= self.radius
    }
}

/// 時刻指定の入力
#[derive(Debug, Clone)]
struct PendingInput {
    time: f64,
    vehicle_id: VehicleId,
    command: LaneCommand,
}

pub struct SimulationEngine {
    pub current_time: f64,
    pub dt: f64,
    pub max_time: f64,
    pub step_count: u64,
    pub mode: SimulationMode,

    pub lanes: LaneSet,
    pub vehicles: VehicleRegistry,
    pub race: RaceLog,
    pub lap_region: Option<LapRegion>,

    /// 周回トリガ領域内にいる車両
    inside_lap_region: HashSet<VehicleId>,
    /// 時刻順に並んだスクリプト入力
    scripted_inputs: Vec<PendingInput>,
    next_input: usize,

    pub scenario_config: Option<ScenarioConfig>,
    pub verbose_level: u8,
}

impl SimulationEngine {
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> Self {
        let mut engine = Self::with_lanes(LaneSet::default(), scenario.sim.dt_s, scenario.sim.t_max_s, scenario.sim.mode);
        engine.lap_region = scenario.lap_trigger.as_ref().map(|trigger| LapRegion {
            center: trigger.center,
            radius: trigger.radius_m,
        });
        engine.scenario_config = Some(scenario);
        engine.verbose_level = verbose_level;
        engine
    }

    /// シナリオを使わずにレーン一覧だけで作成（ホストから車両を追加する場合）
    ///
    /// `run()` は `max_time` に達するか全車完走で終了します。
    pub fn with_lanes(lanes: LaneSet, dt: f64, max_time: f64, mode: SimulationMode) -> Self {
        Self {
            current_time: 0.0,
            dt,
            max_time,
            step_count: 0,
            mode,
            lanes,
            vehicles: VehicleRegistry::new(),
            race: RaceLog::default(),
            lap_region: None,
            inside_lap_region: HashSet::new(),
            scripted_inputs: Vec::new(),
            next_input: 0,
            scenario_config: None,
            verbose_level: 0,
        }
    }

    /// シナリオからレーンと車両を構築
    pub fn initialize(&mut self) -> Result<(), ScenarioError> {
        let Some(scenario) = self.scenario_config.take() else {
            return Ok(());
        };
        scenario.validate()?;

        if self.verbose_level > 0 {
            info!("シミュレーションエンジンを初期化中...");
        }

        self.initialize_lanes(&scenario);
        self.initialize_vehicles(&scenario)?;
        self.scripted_inputs
            .sort_by(|a, b| a.time.total_cmp(&b.time));

        if self.verbose_level > 0 {
            info!("初期化完了:");
            info!("  レーン: {}本", self.lanes.len());
            info!("  車両: {}台", self.vehicles.len());
            info!("  スクリプト入力: {}件", self.scripted_inputs.len());
        }

        self.scenario_config = Some(scenario);
        Ok(())
    }

    fn initialize_lanes(&mut self, scenario: &ScenarioConfig) {
        for lane_config in &scenario.lanes {
            let id = self.lanes.push(Lane::new(lane_config.name.clone(), lane_config.points.clone()));

            if self.verbose_level > 1 {
                debug!("レーン初期化: {} ({:?}, {}点)", lane_config.name, id, lane_config.points.len());
            }
        }
    }

    fn initialize_vehicles(&mut self, scenario: &ScenarioConfig) -> Result<(), ScenarioError> {
        for entry in &scenario.vehicles {
            let id = VehicleId::from(entry.id.as_str());
            let config = VehicleConfig::from(&entry.params);
            let start_pose = VehiclePose::new(entry.start.position, entry.start.attitude);

            let lane = match &entry.lane {
                Some(name) => Some(self.lanes.find_by_name(name).ok_or_else(|| {
                    ScenarioError::ValidationError(format!("unknown lane {}", name))
                })?),
                None => None,
            };

            let controller: Box<dyn ILaneSelector> = match &entry.controller {
                ControllerConfig::Ai { bully: Some(bully) } => {
                    let mut policy = BullyPolicy::new(VehicleId::from(bully.target.as_str()));
                    policy.block_distance = bully.block_distance_m;
                    policy.block_wait_time = bully.block_wait_time_s;
                    Box::new(AiController::with_bully(policy))
                }
                ControllerConfig::Ai { bully: None } => Box::new(AiController::new()),
                ControllerConfig::Player { inputs } => {
                    for input in inputs {
                        self.scripted_inputs.push(PendingInput {
                            time: input.time_s,
                            vehicle_id: id.clone(),
                            command: input.command,
                        });
                    }
                    Box::new(PlayerController::new())
                }
            };

            let body: Option<Box<dyn IPhysicsBody>> = entry.physics.then(|| {
                let mut body = SimpleBody::new(start_pose.position, start_pose.attitude);
                body.ground_height = scenario.physics.ground_height_m;
                Box::new(body) as Box<dyn IPhysicsBody>
            });
            if body.is_none() {
                warn!("車両 {} は物理ボディを持たないため移動しません", id);
            }

            let vehicle = Vehicle::new(id.clone(), config, controller, start_pose, body, lane);

            if self.verbose_level > 1 {
                debug!("車両初期化: {} ({:?}, レーン: {:?})", id, vehicle.controller_kind(), lane);
            }

            self.add_vehicle(vehicle);
        }

        Ok(())
    }

    /// 車両を追加（開始位置が周回トリガ領域内なら進入済みとして扱う）
    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        if self.lap_region.is_some_and(|region| region.contains(&vehicle.pose().position)) {
            self.inside_lap_region.insert(vehicle.id.clone());
        }
        if self.vehicles.insert(vehicle).is_some() {
            warn!("同じIDの車両を置き換えました");
        }
    }

    pub fn remove_vehicle(&mut self, id: &VehicleId) -> Option<Vehicle> {
        self.inside_lap_region.remove(id);
        self.vehicles.remove(id)
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn vehicle_mut(&mut self, id: &VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id)
    }

    /// シナリオの最大時間まで実行（全車完走で打ち切り）
    pub fn run(&mut self) {
        if !self.max_time.is_finite() {
            warn!("最大時間が有限ではないため実行しません: {}", self.max_time);
            return;
        }

        info!("=== シミュレーション実行開始 ===");

        while self.current_time < self.max_time {
            self.tick(self.dt);

            if self.verbose_level > 2 {
                trace!("時刻: {:.2}秒 (ステップ: {})", self.current_time, self.step_count);
            }

            if self.step_count % 500 == 0 && self.verbose_level > 0 {
                let progress = (self.current_time / self.max_time) * 100.0;
                info!("進行状況: {:.1}% ({:.1}/{:.1}秒)", progress, self.current_time, self.max_time);
            }

            if self.all_finished() {
                info!("全車両が完走しました");
                break;
            }
        }

        info!("=== シミュレーション完了 ===");
        info!("実行時間: {:.1}秒", self.current_time);
        info!("総ステップ数: {}", self.step_count);
    }

    /// 1ティック分の処理
    pub fn tick(&mut self, dt: f64) {
        self.deliver_inputs();
        self.process_vehicles(dt);

        if self.mode == SimulationMode::Play {
            self.process_physics(dt);
            self.process_lap_region();
        }

        self.current_time += dt;
        self.step_count += 1;
    }

    fn deliver_inputs(&mut self) {
        while let Some(input) = self.scripted_inputs.get(self.next_input) {
            if input.time > self.current_time {
                break;
            }
            let input = input.clone();
            self.next_input += 1;
            self.push_lane_command(&input.vehicle_id, input.command);
        }
    }

    fn process_vehicles(&mut self, dt: f64) {
        for index in 0..self.vehicles.len() {
            let observed = self.vehicles.observation_for(index);
            let ctx = TickContext {
                now: self.current_time,
                dt,
                lanes: &self.lanes,
                mode: self.mode,
                observed,
            };
            self.vehicles.vehicles[index].tick(&ctx, &mut self.race);
        }
    }

    fn process_physics(&mut self, dt: f64) {
        for vehicle in self.vehicles.iter_mut() {
            vehicle.step_physics(dt);
        }
    }

    fn process_lap_region(&mut self) {
        let Some(region) = self.lap_region else {
            return;
        };

        let mut entered = Vec::new();
        for vehicle in self.vehicles.iter() {
            let inside = region.contains(&vehicle.pose().position);
            if inside {
                if self.inside_lap_region.insert(vehicle.id.clone()) {
                    entered.push(vehicle.id.clone());
                }
            } else {
                self.inside_lap_region.remove(&vehicle.id);
            }
        }

        for id in entered {
            self.on_lap_trigger(&id, self.current_time);
        }
    }

    /// 周回トリガ領域への進入イベント
    pub fn on_lap_trigger(&mut self, vehicle_id: &VehicleId, sim_time: f64) -> Option<LapTriggerOutcome> {
        let Some(vehicle) = self.vehicles.get_mut(vehicle_id) else {
            warn!("未登録の車両への周回トリガ: {}", vehicle_id);
            return None;
        };
        let outcome = vehicle.on_lap_trigger(sim_time, &mut self.race);
        debug!("周回トリガ: {} ({:?})", vehicle_id, outcome);
        Some(outcome)
    }

    /// プレイヤーの車線変更入力
    pub fn push_lane_command(&mut self, vehicle_id: &VehicleId, command: LaneCommand) -> bool {
        match self.vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                let accepted = vehicle.push_lane_command(command);
                if !accepted {
                    debug!("車両 {} は入力を受け付けません", vehicle_id);
                }
                accepted
            }
            None => {
                warn!("未登録の車両への入力: {}", vehicle_id);
                false
            }
        }
    }

    pub fn start_race(&mut self) {
        for vehicle in self.vehicles.iter_mut() {
            vehicle.start_race();
        }
        info!("レース開始");
    }

    pub fn stop_race(&mut self) {
        for vehicle in self.vehicles.iter_mut() {
            vehicle.stop_race();
        }
        info!("レース停止");
    }

    /// いずれかの車両がレース中か
    pub fn is_racing(&self) -> bool {
        self.vehicles.iter().any(Vehicle::is_racing)
    }

    pub fn reset_vehicle(&mut self, vehicle_id: &VehicleId) -> bool {
        match self.vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.reset_vehicle();
                true
            }
            None => false,
        }
    }

    pub fn all_finished(&self) -> bool {
        !self.vehicles.is_empty() && self.vehicles.iter().all(|v| self.race.has_finished(&v.id))
    }

    /// 結果の表示
    pub fn print_results(&self) {
        println!("=== レース結果 ===");
        for (rank, result) in self.race.finishes.iter().enumerate() {
            println!("  {}位: {} ({}周, {:.2}秒)", rank + 1, result.vehicle_id, result.lap_count, result.time);
        }
        for vehicle in self.vehicles.iter() {
            if !self.race.has_finished(&vehicle.id) {
                println!("  未完走: {} ({}周)", vehicle.id, vehicle.lap_count());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 半径 `radius` の円周上に `count` 点（反時計回り・上から見て+Z→-X方向）
    fn circle(radius: f64, count: usize) -> Vec<Vector3> {
        (0..count)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / count as f64;
                Vector3::new(radius * a.cos(), 0.0, radius * a.sin())
            })
            .collect()
    }

    const SCENARIO: &str = r#"
meta:
  name: engine-test
sim:
  dt_s: 0.02
  t_max_s: 60.0
physics:
  ground_height_m: 0.0
lanes:
  - name: inner
    points: [[0.0, 0.0, 5.0], [0.0, 0.0, 10.0], [0.0, 0.0, 15.0], [0.0, 0.0, 20.0], [0.0, 0.0, 25.0], [0.0, 0.0, 30.0]]
  - name: outer
    points: [[4.0, 0.0, 5.0], [4.0, 0.0, 10.0], [4.0, 0.0, 15.0], [4.0, 0.0, 20.0], [4.0, 0.0, 25.0], [4.0, 0.0, 30.0]]
vehicles:
  - id: player
    controller:
      type: player
      inputs:
        - { time_s: 0.1, command: right }
    start:
      position: [0.0, 0.0, 0.0]
    lane: inner
  - id: bully
    controller:
      type: ai
      bully:
        target: player
        block_distance_m: 25.0
        block_wait_time_s: 0.5
    start:
      position: [4.0, 0.0, -3.0]
    lane: inner
"#;

    fn engine_from(yaml: &str) -> SimulationEngine {
        let config = ScenarioConfig::from_yaml_str(yaml).unwrap();
        let mut engine = SimulationEngine::new(config, 0);
        engine.initialize().unwrap();
        engine
    }

    fn player_id() -> VehicleId {
        VehicleId::from("player")
    }

    fn bully_id() -> VehicleId {
        VehicleId::from("bully")
    }

    #[test]
    fn test_initialize_builds_level() {
        let engine = engine_from(SCENARIO);
        assert_eq!(engine.lanes.len(), 2);
        assert_eq!(engine.vehicles.len(), 2);
        assert_eq!(engine.vehicle(&player_id()).unwrap().active_lane(), Some(LaneId(0)));
        assert_eq!(engine.vehicle(&bully_id()).unwrap().controller_kind(), ControllerKind::Ai);
        assert!(engine.is_racing());
    }

    #[test]
    fn test_scripted_input_and_bully_follow() {
        let mut engine = engine_from(SCENARIO);

        // 0.1秒で入力が届き、プレイヤーは外側レーンへ
        for _ in 0..10 {
            engine.tick(engine.dt);
        }
        assert_eq!(engine.vehicle(&player_id()).unwrap().active_lane(), Some(LaneId(1)));

        // ブロック側は待ち時間の後に同じレーンへ
        let mut switched_at = None;
        for _ in 0..100 {
            engine.tick(engine.dt);
            if switched_at.is_none() && engine.vehicle(&bully_id()).unwrap().active_lane() == Some(LaneId(1)) {
                switched_at = Some(engine.current_time);
            }
        }
        let switched_at = switched_at.expect("bully never switched lanes");
        assert!(switched_at >= 0.6);
        assert_eq!(
            engine.vehicle_mut(&bully_id()).unwrap().ai_controller_mut().unwrap().block_state(),
            Some(BlockState::NotBlocking)
        );
    }

    #[test]
    fn test_removed_target_freezes_bully() {
        let mut engine = engine_from(SCENARIO);
        for _ in 0..12 {
            engine.tick(engine.dt);
        }
        let state = engine.vehicle_mut(&bully_id()).unwrap().ai_controller_mut().unwrap().block_state();
        assert!(matches!(state, Some(BlockState::Blocking { .. })));

        assert!(engine.remove_vehicle(&player_id()).is_some());
        for _ in 0..100 {
            engine.tick(engine.dt);
        }
        let bully = engine.vehicle_mut(&bully_id()).unwrap();
        assert_eq!(bully.active_lane(), Some(LaneId(0)));
        assert_eq!(bully.ai_controller_mut().unwrap().block_state(), state);
    }

    #[test]
    fn test_player_completes_laps_on_circle() {
        let mut lanes = LaneSet::default();
        let lane = lanes.push(Lane::new("ring", circle(30.0, 24)));
        let mut engine = SimulationEngine::with_lanes(lanes, 1.0 / 60.0, 60.0, SimulationMode::Play);
        engine.lap_region = Some(LapRegion { center: Vector3::new(30.0, 0.0, 0.0), radius: 3.0 });

        // (30, 0, 0) から +Z 方向（円の接線方向）へ出発
        let start = VehiclePose::new(Vector3::new(30.0, 0.0, 0.0), Attitude3D::new(0.0, 0.0, 0.0));
        let config = VehicleConfig {
            race_num_laps: 2,
            ..VehicleConfig::default()
        };
        let body = SimpleBody::new(start.position, start.attitude).with_ground(0.0);
        engine.add_vehicle(Vehicle::new(
            player_id(),
            config,
            Box::new(PlayerController::new()),
            start,
            Some(Box::new(body)),
            Some(lane),
        ));

        engine.run();

        assert!(engine.all_finished());
        let result = &engine.race.finishes[0];
        assert_eq!(result.vehicle_id, player_id());
        assert_eq!(result.lap_count, 2);
        // 円周 ≒ 188m を 10m/s で2周
        assert!(result.time > 30.0 && result.time < 45.0);
        assert_eq!(engine.race.player_laps.get(&player_id()), Some(&1));
        assert!(engine.race.left_track_events.is_empty());

        let pos = engine.vehicle(&player_id()).unwrap().pose().position;
        assert_eq!(pos.y, 0.0);
    }

    #[test]
    fn test_vehicles_stay_grounded_without_physics_section() {
        let yaml = SCENARIO.replace("physics:\n  ground_height_m: 0.0\n", "");
        assert_ne!(yaml, SCENARIO);
        let mut engine = engine_from(&yaml);

        for _ in 0..50 {
            engine.tick(engine.dt);
        }

        for vehicle in engine.vehicles.iter() {
            assert_eq!(vehicle.pose().position.y, 0.0);
        }
        assert!(engine.vehicle(&player_id()).unwrap().pose().position.z > 8.0);
        assert!(engine.race.left_track_events.is_empty());
    }

    #[test]
    fn test_run_requires_finite_max_time() {
        let mut engine = SimulationEngine::with_lanes(LaneSet::default(), 0.1, f64::INFINITY, SimulationMode::Play);
        engine.run();
        assert_eq!(engine.step_count, 0);

        engine.max_time = 1.0;
        engine.run();
        assert!(engine.current_time >= 1.0);
    }

    #[test]
    fn test_editor_mode_keeps_vehicles_still() {
        let yaml = SCENARIO.replace("t_max_s: 60.0", "t_max_s: 60.0\n  mode: editor");
        let mut engine = engine_from(&yaml);
        for _ in 0..50 {
            engine.tick(engine.dt);
        }
        let player = engine.vehicle(&player_id()).unwrap();
        assert_eq!(player.pose().position, Vector3::ZERO);
        assert!(player.preview_target(&engine.lanes).is_found());
        assert_eq!(engine.step_count, 50);
    }

    #[test]
    fn test_manual_lap_trigger_and_reset() {
        let mut engine = engine_from(SCENARIO);
        let outcome = engine.on_lap_trigger(&player_id(), 1.0).unwrap();
        assert!(outcome.accepted);
        assert_eq!(engine.race.player_laps.get(&player_id()), Some(&0));
        assert!(engine.on_lap_trigger(&VehicleId::from("ghost"), 1.0).is_none());

        for _ in 0..30 {
            engine.tick(engine.dt);
        }
        assert!(engine.reset_vehicle(&player_id()));
        assert_eq!(engine.vehicle(&player_id()).unwrap().pose().position, Vector3::ZERO);

        engine.stop_race();
        assert!(!engine.is_racing());
        engine.start_race();
        assert!(engine.is_racing());
    }

    #[test]
    fn test_ai_does_not_accept_commands() {
        let mut engine = engine_from(SCENARIO);
        assert!(!engine.push_lane_command(&bully_id(), LaneCommand::Left));
        assert!(engine.push_lane_command(&player_id(), LaneCommand::Left));
        assert!(!engine.push_lane_command(&VehicleId::from("ghost"), LaneCommand::Left));
    }
}
