use std::any::Any;

use tracing::debug;

use crate::models::{
    traits::{ControllerKind, ILaneSelector, LaneChange, LaneSelectContext},
    vehicle::VehicleId,
};

/// ブロック判定距離の既定値[m]
pub const DEFAULT_BLOCK_DISTANCE: f64 = 25.0;
/// レーン変更までの待ち時間の既定値[s]
pub const DEFAULT_BLOCK_WAIT_TIME: f64 = 1.5;

/// ブロック状態
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockState {
    /// ブロックしていない
    NotBlocking,
    /// `since` からブロック待機中
    Blocking { since: f64 },
}

/// いじわる（ブロック）ポリシー
///
/// 対象車両が近くにいてレーンが異なる場合、一定時間待ってから
/// 対象車両と同じレーンに移って進路を塞ぎます。
#[derive(Debug, Clone)]
pub struct BullyPolicy {
    /// ブロック対象の車両
    pub target: VehicleId,
    /// ブロックを開始する距離[m]
    pub block_distance: f64,
    /// レーンを合わせるまでの待ち時間[s]
    pub block_wait_time: f64,
    pub state: BlockState,
}

impl BullyPolicy {
    pub fn new(target: VehicleId) -> Self {
        Self {
            target,
            block_distance: DEFAULT_BLOCK_DISTANCE,
            block_wait_time: DEFAULT_BLOCK_WAIT_TIME,
            state: BlockState::NotBlocking,
        }
    }

    /// 1ティック分の評価
    ///
    /// 対象が範囲外のときは状態を変えません（短時間の範囲外で待ち時間が
    /// リセットされないようにするため）。
    pub fn evaluate(&mut self, ctx: &LaneSelectContext<'_>) -> Option<LaneChange> {
        let observed = ctx.observed?;

        let distance = observed.position.distance(&ctx.position);
        if distance > self.block_distance {
            return None;
        }

        if ctx.current_lane == observed.lane {
            if self.state != BlockState::NotBlocking {
                debug!("ブロック解除: 対象 {} と同じレーン", self.target);
            }
            self.state = BlockState::NotBlocking;
            return None;
        }

        match self.state {
            BlockState::NotBlocking => {
                debug!("ブロック待機開始: 対象 {} (距離: {:.1}m)", self.target, distance);
                self.state = BlockState::Blocking { since: ctx.now };
                None
            }
            BlockState::Blocking { since } if ctx.now - since >= self.block_wait_time => {
                debug!("レーン変更: 対象 {} のレーン {:?} に合わせる", self.target, observed.lane);
                Some(LaneChange(observed.lane))
            }
            BlockState::Blocking { .. } => None,
        }
    }
}

/// AI車両の車線選択コントローラ
#[derive(Debug, Clone, Default)]
pub struct AiController {
    /// ブロックポリシー（Noneなら車線変更しない）
    pub bully: Option<BullyPolicy>,
}

impl AiController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bully(policy: BullyPolicy) -> Self {
        Self { bully: Some(policy) }
    }

    /// ブロック対象の設定（Noneでブロック無効）
    pub fn set_bully_target(&mut self, target: Option<VehicleId>) {
        self.bully = match (target, self.bully.take()) {
            (Some(target), Some(mut policy)) => {
                policy.target = target;
                policy.state = BlockState::NotBlocking;
                Some(policy)
            }
            (Some(target), None) => Some(BullyPolicy::new(target)),
            (None, _) => None,
        };
    }

    pub fn set_block_distance(&mut self, distance: f64) {
        if let Some(policy) = self.bully.as_mut() {
            policy.block_distance = distance;
        }
    }

    pub fn set_block_wait_time(&mut self, wait_time: f64) {
        if let Some(policy) = self.bully.as_mut() {
            policy.block_wait_time = wait_time;
        }
    }

    pub fn block_state(&self) -> Option<BlockState> {
        self.bully.as_ref().map(|policy| policy.state)
    }
}

impl ILaneSelector for AiController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Ai
    }

    fn observed_vehicle(&self) -> Option<&VehicleId> {
        self.bully.as_ref().map(|policy| &policy.target)
    }

    fn select_lane(&mut self, ctx: &LaneSelectContext<'_>) -> Option<LaneChange> {
        self.bully.as_mut()?.evaluate(ctx)
    }

    fn reset(&mut self) {
        if let Some(policy) = self.bully.as_mut() {
            policy.state = BlockState::NotBlocking;
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        common::Vector3,
        lane::{Lane, LaneId, LaneSet},
        traits::ObservedVehicle,
    };

    fn lanes() -> LaneSet {
        LaneSet::new(vec![Lane::new("inner", Vec::new()), Lane::new("outer", Vec::new())])
    }

    fn ctx<'a>(lanes: &'a LaneSet, now: f64, target_x: f64, target_lane: usize) -> LaneSelectContext<'a> {
        LaneSelectContext {
            now,
            position: Vector3::ZERO,
            current_lane: Some(LaneId(0)),
            lanes,
            observed: Some(ObservedVehicle {
                position: Vector3::new(target_x, 0.0, 0.0),
                lane: Some(LaneId(target_lane)),
            }),
        }
    }

    fn bully() -> AiController {
        AiController::with_bully(BullyPolicy::new(VehicleId::from("player")))
    }

    #[test]
    fn test_timer_starts_on_entering_range() {
        let lanes = lanes();
        let mut ai = bully();

        assert_eq!(ai.select_lane(&ctx(&lanes, 1.0, 40.0, 1)), None);
        assert_eq!(ai.block_state(), Some(BlockState::NotBlocking));

        assert_eq!(ai.select_lane(&ctx(&lanes, 2.0, 10.0, 1)), None);
        assert_eq!(ai.block_state(), Some(BlockState::Blocking { since: 2.0 }));
    }

    #[test]
    fn test_switches_lane_after_wait_time() {
        let lanes = lanes();
        let mut ai = bully();

        ai.select_lane(&ctx(&lanes, 2.0, 10.0, 1));
        assert_eq!(ai.select_lane(&ctx(&lanes, 3.4, 10.0, 1)), None);
        assert_eq!(ai.select_lane(&ctx(&lanes, 3.5, 10.0, 1)), Some(LaneChange::to(LaneId(1))));
        // 切り替え時にはタイマーをリセットしない
        assert_eq!(ai.block_state(), Some(BlockState::Blocking { since: 2.0 }));
    }

    #[test]
    fn test_matching_lane_resets_timer() {
        let lanes = lanes();
        let mut ai = bully();

        ai.select_lane(&ctx(&lanes, 2.0, 10.0, 1));
        assert_eq!(ai.select_lane(&ctx(&lanes, 2.5, 10.0, 0)), None);
        assert_eq!(ai.block_state(), Some(BlockState::NotBlocking));
    }

    #[test]
    fn test_out_of_range_freezes_state() {
        let lanes = lanes();
        let mut ai = bully();

        ai.select_lane(&ctx(&lanes, 2.0, 10.0, 1));
        assert_eq!(ai.select_lane(&ctx(&lanes, 3.0, 100.0, 0)), None);
        assert_eq!(ai.block_state(), Some(BlockState::Blocking { since: 2.0 }));

        // 範囲に戻ったら待ち時間は継続している
        assert_eq!(ai.select_lane(&ctx(&lanes, 3.6, 10.0, 1)), Some(LaneChange::to(LaneId(1))));
    }

    #[test]
    fn test_follows_target_without_lane() {
        let lanes = lanes();
        let mut ai = bully();
        let mut lane = Some(LaneId(0));

        for step in 0..=30 {
            let mut context = ctx(&lanes, step as f64 * 0.1, 10.0, 0);
            context.current_lane = lane;
            context.observed = context.observed.map(|o| ObservedVehicle { lane: None, ..o });
            if let Some(LaneChange(next)) = ai.select_lane(&context) {
                lane = next;
            }
        }

        // 待ち時間の後にレーン未設定へ切り替わり、次のティックで解除される
        assert_eq!(lane, None);
        assert_eq!(ai.block_state(), Some(BlockState::NotBlocking));
    }

    #[test]
    fn test_missing_target_is_ignored() {
        let lanes = lanes();
        let mut ai = bully();
        let mut context = ctx(&lanes, 2.0, 10.0, 1);
        context.observed = None;
        assert_eq!(ai.select_lane(&context), None);
        assert_eq!(ai.block_state(), Some(BlockState::NotBlocking));
    }

    #[test]
    fn test_without_bully_never_changes_lane() {
        let lanes = lanes();
        let mut ai = AiController::new();
        assert_eq!(ai.observed_vehicle(), None);
        assert_eq!(ai.select_lane(&ctx(&lanes, 5.0, 1.0, 1)), None);
    }

    #[test]
    fn test_setters() {
        let mut ai = AiController::new();
        ai.set_bully_target(Some(VehicleId::from("p2")));
        ai.set_block_distance(5.0);
        ai.set_block_wait_time(0.5);

        let policy = ai.bully.as_ref().unwrap();
        assert_eq!(policy.target, VehicleId::from("p2"));
        assert_eq!(policy.block_distance, 5.0);
        assert_eq!(policy.block_wait_time, 0.5);

        ai.set_bully_target(None);
        assert!(ai.bully.is_none());
    }
}
