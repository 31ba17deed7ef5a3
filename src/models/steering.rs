use crate::models::common::{math_utils, Attitude3D, Vector3};

/// ヘディング平滑化器
///
/// 生の角度オフセットを臨界減衰ばねでなまらせ、1ティック分のヨー角変化に変換します。
/// 内部の角速度状態はティック間で連続し、車両リセット時のみクリアされます。
#[derive(Debug, Clone, Default)]
pub struct HeadingSmoother {
    /// 平滑化の内部角速度[deg/s]
    velocity: f64,
}

impl HeadingSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のヨー角を `current_yaw - angle_offset` に向けて平滑化
    ///
    /// # 引数
    ///
    /// * `current_yaw` - 現在のヨー角[deg]
    /// * `angle_offset` - 探索で得た符号付き角度[deg]
    /// * `smooth_time` - 時定数[s]
    /// * `dt` - 時間刻み[s]
    ///
    /// # 戻り値
    ///
    /// 新しいヨー角[deg]
    pub fn smooth(&mut self, current_yaw: f64, angle_offset: f64, smooth_time: f64, dt: f64) -> f64 {
        math_utils::smooth_damp(
            current_yaw,
            current_yaw - angle_offset,
            &mut self.velocity,
            smooth_time,
            dt,
        )
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn reset(&mut self) {
        self.velocity = 0.0;
    }
}

/// 1ティック分の移動指令
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// 新しい姿勢（ヨー角のみ更新）
    pub attitude: Attitude3D,
    /// 位置の変化量[m]
    pub delta: Vector3,
}

/// 運動更新
///
/// ヨー角と速度から新しい姿勢と前進量を求めます。実際の位置・姿勢の反映は
/// 物理コラボレータ側で行います。
pub struct MotionAdvancer;

impl MotionAdvancer {
    pub fn advance(attitude: &Attitude3D, new_yaw: f64, speed: f64, dt: f64) -> MotionStep {
        let attitude = attitude.with_yaw(math_utils::normalize_angle(new_yaw));
        MotionStep {
            attitude,
            delta: attitude.forward() * (speed * dt),
        }
    }

    /// 車両の上方向と逆向きの一定加速度（接地用）
    pub fn gravity(up: Vector3, gravity_accel: f64) -> Vector3 {
        -up * gravity_accel
    }
}
