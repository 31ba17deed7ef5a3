use std::any::Any;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    traits::{ControllerKind, ILaneSelector, LaneChange, LaneSelectContext},
};

/// プレイヤーの車線変更コマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneCommand {
    /// 1つ左（レーン一覧の前）のレーンへ
    Left,
    /// 1つ右（レーン一覧の後）のレーンへ
    Right,
}

/// プレイヤー車両の車線選択コントローラ
///
/// キー押下（エッジトリガ）で届いたコマンドを貯めておき、次のティックで
/// 到着順に処理します。
#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    pending: VecDeque<LaneCommand>,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }
}

impl ILaneSelector for PlayerController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Player
    }

    fn select_lane(&mut self, ctx: &LaneSelectContext<'_>) -> Option<LaneChange> {
        let mut lane = ctx.current_lane;
        let mut changed = false;

        while let Some(command) = self.pending.pop_front() {
            let next = match command {
                LaneCommand::Left => ctx.lanes.previous(lane),
                LaneCommand::Right => ctx.lanes.next(lane),
            };

            match next {
                Some(next) => {
                    lane = Some(next);
                    changed = true;
                }
                None => debug!("車線変更不可: {:?} (現在レーン: {:?})", command, lane),
            }
        }

        changed.then_some(LaneChange(lane))
    }

    fn push_command(&mut self, command: LaneCommand) -> bool {
        self.pending.push_back(command);
        true
    }

    fn discard_commands(&mut self) {
        self.pending.clear();
    }

    fn reset(&mut self) {
        self.pending.clear();
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
