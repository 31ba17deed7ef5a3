use crate::models::{
    common::{Attitude3D, Vector3},
    traits::IPhysicsBody,
};

/// 簡易剛体
///
/// 物理コラボレータの参照実装です。加速度→速度→位置の順に積分し、
/// 地面の高さが設定されていれば地面より下に沈まないよう位置と鉛直速度を補正します。
/// 衝突解決は行いません。
#[derive(Debug, Clone)]
pub struct SimpleBody {
    pub position: Vector3,
    pub rotation: Attitude3D,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
    pub kinematic: bool,
    /// 地面の高さ[m]（Noneなら地面なし）
    pub ground_height: Option<f64>,
    /// 次の積分で適用する加速度の累積
    pending_acceleration: Vector3,
}

impl SimpleBody {
    pub fn new(position: Vector3, rotation: Attitude3D) -> Self {
        Self {
            position,
            rotation,
            linear_velocity: Vector3::ZERO,
            angular_velocity: Vector3::ZERO,
            kinematic: false,
            ground_height: None,
            pending_acceleration: Vector3::ZERO,
        }
    }

    pub fn with_ground(mut self, ground_height: f64) -> Self {
        self.ground_height = Some(ground_height);
        self
    }

    pub fn pending_acceleration(&self) -> Vector3 {
        self.pending_acceleration
    }
}

impl IPhysicsBody for SimpleBody {
    fn position(&self) -> Vector3 {
        self.position
    }

    fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    fn rotation(&self) -> Attitude3D {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Attitude3D) {
        self.rotation = rotation;
    }

    fn add_acceleration(&mut self, acceleration: Vector3) {
        self.pending_acceleration += acceleration;
    }

    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    fn linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vector3) {
        self.linear_velocity = velocity;
    }

    fn angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, velocity: Vector3) {
        self.angular_velocity = velocity;
    }

    fn integrate(&mut self, dt: f64) {
        let acceleration = std::mem::take(&mut self.pending_acceleration);
        if self.kinematic || dt <= 0.0 {
            return;
        }

        self.linear_velocity += acceleration * dt;
        self.position += self.linear_velocity * dt;

        if let Some(ground) = self.ground_height {
            if self.position.y < ground {
                self.position.y = ground;
                self.linear_velocity.y = self.linear_velocity.y.max(0.0);
            }
        }
    }
}
