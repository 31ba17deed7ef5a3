use crate::models::common::Point3;

/// レーン識別子（レベル内のレーン一覧でのインデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneId(pub usize);

/// ウェイポイントレーン
///
/// 名前付きの順序付きウェイポイント列です。格納順が走行方向を表します。
/// 車両からは読み取り専用で、複数の車両から参照されます。
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub name: String,
    pub points: Vec<Point3>,
}

impl Lane {
    pub fn new(name: impl Into<String>, points: Vec<Point3>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// レベルが保持するレーンの順序付き一覧
///
/// 並び順はプレイヤーの左右レーン変更に使われます（先頭が最も左）。
#[derive(Debug, Clone, Default)]
pub struct LaneSet {
    lanes: Vec<Lane>,
}

impl LaneSet {
    pub fn new(lanes: Vec<Lane>) -> Self {
        Self { lanes }
    }

    /// レーンを末尾に追加し、そのIDを返す
    pub fn push(&mut self, lane: Lane) -> LaneId {
        self.lanes.push(lane);
        LaneId(self.lanes.len() - 1)
    }

    pub fn get(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.0)
    }

    pub fn contains(&self, id: LaneId) -> bool {
        id.0 < self.lanes.len()
    }

    /// 名前からレーンIDを検索
    pub fn find_by_name(&self, name: &str) -> Option<LaneId> {
        self.lanes.iter().position(|lane| lane.name == name).map(LaneId)
    }

    /// 指定レーンの1つ前（左）のレーン
    ///
    /// 現在レーンが未設定・一覧外・先頭の場合はNone
    pub fn previous(&self, current: Option<LaneId>) -> Option<LaneId> {
        let current = current.filter(|id| self.contains(*id))?;
        current.0.checked_sub(1).map(LaneId)
    }

    /// 指定レーンの1つ後（右）のレーン
    ///
    /// 現在レーンが未設定・一覧外・末尾の場合はNone
    pub fn next(&self, current: Option<LaneId>) -> Option<LaneId> {
        let current = current.filter(|id| self.contains(*id))?;
        let next = current.0 + 1;
        self.contains(LaneId(next)).then_some(LaneId(next))
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LaneId, &Lane)> {
        self.lanes.iter().enumerate().map(|(i, lane)| (LaneId(i), lane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Vector3;

    fn three_lanes() -> LaneSet {
        LaneSet::new(vec![
            Lane::new("inner", vec![Vector3::new(0.0, 0.0, 0.0)]),
            Lane::new("middle", vec![Vector3::new(1.0, 0.0, 0.0)]),
            Lane::new("outer", Vec::new()),
        ])
    }

    #[test]
    fn test_find_by_name() {
        let lanes = three_lanes();
        assert_eq!(lanes.find_by_name("middle"), Some(LaneId(1)));
        assert_eq!(lanes.find_by_name("missing"), None);
    }

    #[test]
    fn test_neighbours() {
        let lanes = three_lanes();
        assert_eq!(lanes.previous(Some(LaneId(1))), Some(LaneId(0)));
        assert_eq!(lanes.next(Some(LaneId(1))), Some(LaneId(2)));
        assert_eq!(lanes.previous(Some(LaneId(0))), None);
        assert_eq!(lanes.next(Some(LaneId(2))), None);
    }

    #[test]
    fn test_neighbours_of_unknown_lane() {
        let lanes = three_lanes();
        assert_eq!(lanes.previous(None), None);
        assert_eq!(lanes.next(None), None);
        assert_eq!(lanes.previous(Some(LaneId(7))), None);
        assert_eq!(lanes.next(Some(LaneId(7))), None);
    }
}
