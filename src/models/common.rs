use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 3次元ベクトル（位置・方向・加速度に共通で使用）
///
/// 座標系はY軸上向き。ヨー角0度で+Z方向を向き、ヨー角が増えると+X方向（右）へ旋回します。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3 {
    pub x: f64, // m
    pub y: f64, // m (高さ)
    pub z: f64, // m
}

/// レーン上のウェイポイント位置
pub type Point3 = Vector3;

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// ベクトルの長さ
    pub fn magnitude(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2) + self.z.powi(2)).sqrt()
    }

    /// 3次元距離を計算
    pub fn distance(&self, other: &Vector3) -> f64 {
        (*other - *self).magnitude()
    }

    /// 正規化（長さ0のベクトルはゼロベクトルのまま返す）
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > f64::EPSILON {
            Self::new(self.x / mag, self.y / mag, self.z / mag)
        } else {
            Self::ZERO
        }
    }

    /// 内積
    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// 外積
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// 3次元姿勢
///
/// 車両の姿勢をオイラー角（度）で表現します。
/// 回転順序はロール(Z) → ピッチ(X) → ヨー(Y)です。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude3D {
    /// ピッチ角（X軸まわり、度）
    #[serde(default)]
    pub pitch: f64,
    /// ヨー角（上方向軸まわり、度）
    #[serde(default)]
    pub yaw: f64,
    /// ロール角（Z軸まわり、度）
    #[serde(default)]
    pub roll: f64,
}

impl Attitude3D {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// ヨー角だけを差し替えた姿勢を返す
    pub fn with_yaw(&self, yaw: f64) -> Self {
        Self { yaw, ..*self }
    }

    /// 前方向の単位ベクトル
    pub fn forward(&self) -> Vector3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vector3::new(cp * sy, -sp, cp * cy)
    }

    /// 上方向の単位ベクトル
    pub fn up(&self) -> Vector3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sr, cr) = self.roll.to_radians().sin_cos();
        Vector3::new(-sr * cy + cr * sp * sy, cr * cp, sr * sy + cr * sp * cy)
    }
}

/// 車両の姿勢（位置＋向き）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehiclePose {
    pub position: Vector3,
    pub attitude: Attitude3D,
}

impl VehiclePose {
    pub fn new(position: Vector3, attitude: Attitude3D) -> Self {
        Self { position, attitude }
    }

    pub fn forward(&self) -> Vector3 {
        self.attitude.forward()
    }

    pub fn up(&self) -> Vector3 {
        self.attitude.up()
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// smooth_damp に渡す時定数の下限[s]
    pub const MIN_SMOOTH_TIME: f64 = 1.0e-4;

    /// 角度を-180度〜180度の範囲に正規化
    pub fn normalize_angle(angle_deg: f64) -> f64 {
        let mut normalized = angle_deg % 360.0;
        if normalized > 180.0 {
            normalized -= 360.0;
        } else if normalized <= -180.0 {
            normalized += 360.0;
        }
        normalized
    }

    /// 臨界減衰ばねによる平滑化
    ///
    /// `current` を `target` へ時定数 `smooth_time` で近づけます。`velocity` は
    /// ティック間で引き継がれる内部状態で、目標が急に変わっても速度が連続します。
    /// 減衰項に厳密な指数関数を使うため、目標が一定であれば Δt の刻み方によらず
    /// 同じ軌跡になります。
    ///
    /// # 引数
    ///
    /// * `current` - 現在値
    /// * `target` - 目標値
    /// * `velocity` - 内部速度状態（更新されます）
    /// * `smooth_time` - 時定数[s]
    /// * `dt` - 時間刻み[s]
    ///
    /// # 戻り値
    ///
    /// 平滑化後の値
    pub fn smooth_damp(current: f64, target: f64, velocity: &mut f64, smooth_time: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return current;
        }

        let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
        let omega = 2.0 / smooth_time;
        let decay = (-omega * dt).exp();

        let change = current - target;
        let temp = (*velocity + omega * change) * dt;
        let mut output = target + (change + temp) * decay;
        *velocity = (*velocity - omega * temp) * decay;

        // 目標を越えた場合は目標で止める
        if (target - current > 0.0) == (output > target) {
            output = target;
            *velocity = 0.0;
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::math_utils::*;
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_attitude_axes() {
        let forward = Attitude3D::new(0.0, 90.0, 0.0).forward();
        assert!((forward.x - 1.0).abs() < EPS);
        assert!(forward.z.abs() < EPS);

        let up = Attitude3D::new(0.0, 37.0, 0.0).up();
        assert!((up.y - 1.0).abs() < EPS);

        // ロール90度で上方向は-X側に倒れる
        let rolled = Attitude3D::new(0.0, 0.0, 90.0).up();
        assert!((rolled.x + 1.0).abs() < EPS);
    }

    #[test]
    fn test_cross_sign_convention() {
        let forward = Vector3::new(0.0, 0.0, 1.0);
        let right = Vector3::new(1.0, 0.0, 0.0);
        assert!(right.cross(&forward).y < 0.0);
        assert!((-right).cross(&forward).y > 0.0);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);
        let n = Vector3::new(3.0, 0.0, 4.0).normalize();
        assert!((n.magnitude() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(190.0), -170.0);
        assert_eq!(normalize_angle(-180.0), 180.0);
        assert_eq!(normalize_angle(45.0), 45.0);
    }

    #[test]
    fn test_smooth_damp_matches_closed_form() {
        let smooth_time = 0.3;
        let omega = 2.0 / smooth_time;
        let mut velocity = 0.0;
        let mut value = 0.0;
        for _ in 0..50 {
            value = smooth_damp(value, 90.0, &mut velocity, smooth_time, 0.02);
        }
        let t: f64 = 1.0;
        let expected = 90.0 - 90.0 * (1.0 + omega * t) * (-omega * t).exp();
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_damp_frame_rate_independent() {
        let run = |steps: usize, dt: f64| {
            let mut velocity = 0.0;
            let mut value = 10.0;
            for _ in 0..steps {
                value = smooth_damp(value, -45.0, &mut velocity, 0.25, dt);
            }
            (value, velocity)
        };
        let (coarse, coarse_v) = run(100, 0.02);
        let (fine, fine_v) = run(200, 0.01);
        assert!((coarse - fine).abs() < 1e-9);
        assert!((coarse_v - fine_v).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_damp_zero_dt_is_noop() {
        let mut velocity = 3.0;
        assert_eq!(smooth_damp(5.0, 10.0, &mut velocity, 0.1, 0.0), 5.0);
        assert_eq!(velocity, 3.0);
    }
}
