//! Parametric flight loops for the butterfly and the dragonfly.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use foundation::math::Vec3;
use scene::components::Transform;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FlierKind {
    Butterfly,
    Dragonfly,
}

/// A wing hinged at `offset` in the flier's local frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WingRig {
    pub offset: Vec3,
    /// Rest angle around the flap axis.
    pub base_angle: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Heading around +Y.
    pub yaw: f64,
}

const BUTTERFLY_WINGS: [WingRig; 2] = [
    WingRig {
        offset: Vec3::new(-0.25, 0.0, 0.0),
        base_angle: FRAC_PI_2,
    },
    WingRig {
        offset: Vec3::new(0.25, 0.0, 0.0),
        base_angle: -FRAC_PI_2,
    },
];

const DRAGONFLY_WINGS: [WingRig; 4] = [
    WingRig {
        offset: Vec3::new(-0.3, 0.0, -0.2),
        base_angle: FRAC_PI_4,
    },
    WingRig {
        offset: Vec3::new(-0.3, 0.0, 0.2),
        base_angle: FRAC_PI_4,
    },
    WingRig {
        offset: Vec3::new(0.3, 0.0, -0.2),
        base_angle: -FRAC_PI_4,
    },
    WingRig {
        offset: Vec3::new(0.3, 0.0, 0.2),
        base_angle: -FRAC_PI_4,
    },
];

impl FlierKind {
    /// Centre of the flight loop.
    pub fn home(self) -> Vec3 {
        match self {
            FlierKind::Butterfly => Vec3::new(3.0, 4.0, 2.0),
            FlierKind::Dragonfly => Vec3::new(-3.0, 3.0, -2.0),
        }
    }

    pub fn wings(self) -> &'static [WingRig] {
        match self {
            FlierKind::Butterfly => &BUTTERFLY_WINGS,
            FlierKind::Dragonfly => &DRAGONFLY_WINGS,
        }
    }

    pub fn pose(self, t: f64) -> Pose {
        let home = self.home();
        match self {
            FlierKind::Butterfly => Pose {
                position: Vec3::new(
                    home.x + (t * 0.5).sin() * 2.0,
                    home.y + (t * 0.7).sin() * 0.5,
                    home.z + (t * 0.5).cos() * 2.0,
                ),
                yaw: (t * 0.5).sin(),
            },
            FlierKind::Dragonfly => {
                let (s, c) = (t * 0.7).sin_cos();
                Pose {
                    position: Vec3::new(
                        home.x + s * 3.0,
                        home.y + (t * 0.5).sin() * 0.5,
                        home.z + c * 3.0,
                    ),
                    yaw: (c * 3.0).atan2(s * 3.0),
                }
            }
        }
    }

    /// Current flap angle of `wing`.
    pub fn wing_angle(self, wing: &WingRig, t: f64) -> f64 {
        match self {
            // Butterfly wings mirror each other around the body.
            FlierKind::Butterfly => {
                wing.base_angle + wing.base_angle.signum() * (t * 15.0).sin() * 0.2
            }
            FlierKind::Dragonfly => wing.base_angle + (t * 30.0).sin() * 0.2,
        }
    }

    /// Body transform at time `t`.
    pub fn body_transform(self, t: f64) -> Transform {
        let pose = self.pose(t);
        Transform::translate(pose.position).with_rotation(Vec3::new(0.0, pose.yaw, 0.0))
    }

    /// World transform of `wing` at time `t`.
    ///
    /// Butterfly wings flap around local Z, dragonfly wings around local Y,
    /// both composed with the body's heading.
    pub fn wing_transform(self, wing: &WingRig, t: f64) -> Transform {
        let body = self.body_transform(t);
        let angle = self.wing_angle(wing, t);
        let rotation = match self {
            FlierKind::Butterfly => Vec3::new(0.0, body.rotation.y, angle),
            FlierKind::Dragonfly => Vec3::new(0.0, body.rotation.y + angle, 0.0),
        };
        Transform::translate(body.apply(wing.offset)).with_rotation(rotation)
    }
}
