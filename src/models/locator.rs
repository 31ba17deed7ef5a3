//! # 最近傍ウェイポイント探索
//!
//! 車両の姿勢とレーンから、次に向かうべきウェイポイントと
//! そこまでの符号付き角度を求めます。
//!
//! 探索範囲（`max_range`）外の点を除外したうえで、前方ベクトルとの角度が
//! 最小の点を選びます。同じ角度の点が複数ある場合はレーン順で最後の点が
//! 採用されます。候補が無い場合は `TargetFix::NONE`（ゼロベクトル・0度）を
//! 返し、呼び出し側はこれを「コース外」として扱います。原点上のウェイポイントも
//! 有効な目標として扱えるよう、検出の有無は点の値ではなくフラグで保持します。

use crate::models::{
    common::{Point3, Vector3, VehiclePose},
    lane::Lane,
};

/// 前方コーン判定の角度[deg]
///
/// 判定は現在の候補の角度を計算する前の値で行われるため、実質的に
/// すべての点を通します（範囲のみのフィルタ）。
const FORWARD_CONE_DEG: f64 = 80.0;

/// 探索結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFix {
    /// 目標ウェイポイント
    pub point: Point3,
    /// 前方ベクトルから目標点までの符号付き角度[deg]（負: 右、正: 左）
    pub angle_deg: f64,
    found: bool,
}

impl TargetFix {
    /// 目標なしを表す番兵値
    pub const NONE: TargetFix = TargetFix {
        point: Vector3::ZERO,
        angle_deg: 0.0,
        found: false,
    };

    /// 有効な目標かどうか
    pub fn is_found(&self) -> bool {
        self.found
    }
}

/// レーンをスキャンして目標ウェイポイントを探す
///
/// # 引数
///
/// * `pose` - 車両の姿勢
/// * `lane` - 走行中のレーン（未設定ならNone）
/// * `max_range` - 探索距離[m]
///
/// # 戻り値
///
/// 目標点と符号付き角度。候補が無ければ `TargetFix::NONE`
pub fn find_target(pose: &VehiclePose, lane: Option<&Lane>, max_range: f64) -> TargetFix {
    let Some(lane) = lane else {
        return TargetFix::NONE;
    };

    let forward = pose.forward();

    let mut nearest_point: Option<Point3> = None;
    let mut min_angle_rad = std::f64::consts::TAU;
    let mut sign = 1.0;
    let mut guard_angle_deg = 0.0_f64;

    for point in &lane.points {
        let offset = *point - pose.position;
        if offset.magnitude() >= max_range {
            continue;
        }

        let dir = offset.normalize();
        let angle_rad = dir.dot(&forward).clamp(-1.0, 1.0).acos();

        if guard_angle_deg.abs() <= FORWARD_CONE_DEG && angle_rad <= min_angle_rad {
            min_angle_rad = angle_rad;
            sign = if dir.cross(&forward).y < 0.0 { -1.0 } else { 1.0 };
            nearest_point = Some(*point);
        }
    }

    let Some(nearest_point) = nearest_point else {
        return TargetFix::NONE;
    };

    guard_angle_deg = min_angle_rad.to_degrees() * sign;

    TargetFix {
        point: nearest_point,
        angle_deg: guard_angle_deg,
        found: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Attitude3D;

    fn pose_facing_z() -> VehiclePose {
        VehiclePose::new(Vector3::new(0.0, 0.0, 0.0), Attitude3D::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn test_empty_lane_has_no_target() {
        let lane = Lane::new("empty", Vec::new());
        let fix = find_target(&pose_facing_z(), Some(&lane), 15.0);
        assert_eq!(fix, TargetFix::NONE);
        assert!(!fix.is_found());
    }

    #[test]
    fn test_missing_lane_has_no_target() {
        assert_eq!(find_target(&pose_facing_z(), None, 15.0), TargetFix::NONE);
    }

    #[test]
    fn test_out_of_range_points_are_skipped() {
        let lane = Lane::new(
            "far",
            vec![Vector3::new(0.0, 0.0, 20.0), Vector3::new(0.0, 0.0, 15.0)],
        );
        assert_eq!(find_target(&pose_facing_z(), Some(&lane), 15.0), TargetFix::NONE);
    }

    #[test]
    fn test_picks_smallest_angle_in_range() {
        let ahead = Vector3::new(1.0, 0.0, 10.0);
        let lane = Lane::new(
            "l",
            vec![
                Vector3::new(5.0, 0.0, 1.0),
                ahead,
                Vector3::new(0.0, 0.0, 40.0),
            ],
        );
        let fix = find_target(&pose_facing_z(), Some(&lane), 15.0);
        assert_eq!(fix.point, ahead);
        assert!(lane.points.contains(&fix.point));
    }

    #[test]
    fn test_sign_encodes_side() {
        let right = Lane::new("r", vec![Vector3::new(5.0, 0.0, 5.0)]);
        let left = Lane::new("l", vec![Vector3::new(-5.0, 0.0, 5.0)]);

        let right_fix = find_target(&pose_facing_z(), Some(&right), 15.0);
        let left_fix = find_target(&pose_facing_z(), Some(&left), 15.0);

        assert!((right_fix.angle_deg + 45.0).abs() < 1e-9);
        assert!((left_fix.angle_deg - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_behind_are_not_rejected() {
        // 前方コーン判定は実質無効なので後方の点も候補になる
        let lane = Lane::new("behind", vec![Vector3::new(1.0, 0.0, -5.0)]);
        let fix = find_target(&pose_facing_z(), Some(&lane), 15.0);
        assert!(fix.is_found());
        assert!(fix.angle_deg.abs() > 90.0);
    }

    #[test]
    fn test_waypoint_at_origin_is_a_valid_target() {
        let pose = VehiclePose::new(Vector3::new(0.0, 0.0, -5.0), Attitude3D::default());
        let lane = Lane::new("origin", vec![Vector3::ZERO]);
        let fix = find_target(&pose, Some(&lane), 15.0);
        assert!(fix.is_found());
        assert_eq!(fix.point, Vector3::ZERO);
    }

    #[test]
    fn test_tie_prefers_last_point() {
        let first = Vector3::new(0.0, 0.0, 3.0);
        let last = Vector3::new(0.0, 0.0, 6.0);
        let lane = Lane::new("tie", vec![first, last]);
        let fix = find_target(&pose_facing_z(), Some(&lane), 15.0);
        assert_eq!(fix.point, last);
        assert_eq!(fix.angle_deg, 0.0);
    }

    #[test]
    fn test_uses_vehicle_heading() {
        let pose = VehiclePose::new(Vector3::new(10.0, 0.0, 10.0), Attitude3D::new(0.0, 90.0, 0.0));
        let along = Vector3::new(18.0, 0.0, 10.0);
        let lane = Lane::new("x", vec![Vector3::new(10.0, 0.0, 18.0), along]);
        let fix = find_target(&pose, Some(&lane), 15.0);
        assert_eq!(fix.point, along);
    }
}
