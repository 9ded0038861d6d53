/// Substepped character integrator: gravity, horizontal intent, jumps and
/// sphere-vs-triangle penetration resolution against a static collider.
///
/// The character is a sphere of `radius` whose bottom sits at the feet pivot
/// (`position`), so the sphere center is `position + radius·Y`.
use super::collider::Collider;
use super::geometry::sphere_contact;
use crate::config::PhysicsConfig;
use crate::{count_add, count_call};
use glam::Vec3;

/// dt above this is logged as a stall before being clamped
const STALL_DT: f32 = 1.0;

/// Desired horizontal movement for a tick
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MoveIntent {
    /// Only the XZ part is used; any non-zero length means full speed.
    pub direction: Vec3,
    pub sprint: bool,
}

impl MoveIntent {
    pub fn new(direction: Vec3, sprint: bool) -> Self {
        Self { direction, sprint }
    }

    /// Direction from stick/key axes relative to a camera yaw.
    /// `forward` moves along `(sin yaw, 0, cos yaw)`, `right` along its
    /// right-handed right vector `(-cos yaw, 0, sin yaw)`.
    pub fn camera_relative(forward: f32, right: f32, yaw: f32, sprint: bool) -> Self {
        let (sy, cy) = yaw.sin_cos();
        let fwd = Vec3::new(sy, 0.0, cy);
        let rgt = Vec3::new(-cy, 0.0, sy);
        Self {
            direction: (fwd * forward + rgt * right).normalize_or_zero(),
            sprint,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CharacterState {
    /// Feet pivot
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub radius: f32,
    pub intent: MoveIntent,
    /// Consumed by the next non-zero step whether or not the jump happens
    pub jump_requested: bool,
}

impl CharacterState {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
            radius,
            intent: MoveIntent::default(),
            jump_requested: false,
        }
    }

    pub fn from_config(position: Vec3, config: &PhysicsConfig) -> Self {
        Self::new(position, config.character_radius)
    }

    /// Collision sphere center
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.position + Vec3::Y * self.radius
    }

    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }
}

/// What one `step` did
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// dt after clamping
    pub dt: f32,
    pub substeps: u32,
    pub contacts: usize,
    pub jumped: bool,
    pub grounded: bool,
}

pub struct CharacterController {
    pub config: PhysicsConfig,
    candidates: Vec<u32>,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl CharacterController {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            candidates: Vec::new(),
        }
    }

    /// Clamp a frame dt into `[0, max_dt]`. Non-finite input becomes 0.
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("invalid physics dt {dt}, treating as 0");
            return 0.0;
        }
        if dt > STALL_DT {
            log::warn!("physics dt {dt:.3}s after a stall, clamping to {}", self.config.max_dt);
        }
        dt.min(self.config.max_dt.max(0.0))
    }

    /// Substeps needed so no slice travels further than the per-substep limit
    fn substep_count(&self, horizontal: Vec3, vy: f32, radius: f32, dt: f32) -> u32 {
        let cfg = &self.config;
        let max_step = cfg
            .min_substep_distance
            .max(radius * cfg.substep_radius_fraction);
        let vy_est = vy - cfg.gravity * dt;
        let travel = Vec3::new(horizontal.x, vy_est, horizontal.z).length() * dt;
        let cap = cfg.max_substeps.max(1);
        if travel > 0.0 && max_step > 0.0 {
            ((travel / max_step).ceil() as u32).clamp(1, cap)
        } else {
            1
        }
    }

    /// Advance `state` by one tick of `dt` seconds against `collider`.
    ///
    /// `on_ground` is re-derived every tick: it is true only if some substep
    /// resolved an upward-facing contact while the character was not rising.
    /// A zero dt integrates nothing, so the state (ground flag and any pending
    /// jump included) is left as it was.
    pub fn step(&mut self, state: &mut CharacterState, collider: &Collider, dt: f32) -> StepReport {
        let dt = self.clamp_dt(dt);
        if dt == 0.0 {
            return StepReport {
                dt,
                substeps: 0,
                contacts: 0,
                jumped: false,
                grounded: state.on_ground,
            };
        }
        let cfg = &self.config;
        let radius = state.radius.max(0.0);

        let speed = cfg.walk_speed
            * if state.intent.sprint {
                cfg.sprint_multiplier
            } else {
                1.0
            };
        let dir = state.intent.direction.normalize_or_zero();
        let horizontal = Vec3::new(dir.x * speed, 0.0, dir.z * speed);

        let mut velocity = Vec3::new(horizontal.x, state.velocity.y, horizontal.z);
        let jumped = state.jump_requested && state.on_ground;
        if jumped {
            velocity.y = cfg.jump_speed;
        }
        state.jump_requested = false;

        let substeps = self.substep_count(horizontal, velocity.y, radius, dt);
        let sub_dt = dt / substeps as f32;
        let lift = Vec3::Y * radius;

        let mut position = state.position;
        let mut grounded = false;
        let mut contacts = 0usize;

        for _ in 0..substeps {
            count_call!(crate::perf::FUNCTION_COUNTERS.physics_substeps);

            position.x += horizontal.x * sub_dt;
            position.z += horizontal.z * sub_dt;
            velocity.y -= self.config.gravity * sub_dt;
            position.y += velocity.y * sub_dt;

            let mut center = position + lift;
            let mut touched_ground = false;
            for _ in 0..self.config.resolve_iterations {
                collider.query_sphere_into(center, radius, &mut self.candidates);
                let mut moved = false;
                for &index in &self.candidates {
                    let Some(contact) = sphere_contact(center, radius, collider.triangle(index)) else {
                        continue;
                    };
                    moved = true;
                    contacts += 1;
                    center = contact.resolved_center(radius);
                    if contact.normal.y > self.config.ground_normal_min_y {
                        touched_ground = true;
                    }
                }
                if !moved {
                    break;
                }
            }
            position = center - lift;

            if touched_ground && velocity.y <= 0.0 {
                grounded = true;
                velocity.y = 0.0;
            }
        }
        count_add!(crate::perf::FUNCTION_COUNTERS.contacts_resolved, contacts);

        state.position = position;
        state.velocity = velocity;
        state.on_ground = grounded;

        log::trace!(
            "physics: dt={dt:.4} substeps={substeps} contacts={contacts} pos={position} vel={velocity} grounded={grounded}"
        );

        StepReport {
            dt,
            substeps,
            contacts,
            jumped,
            grounded,
        }
    }

    /// Surface height under the character's feet, searched from the sphere top
    pub fn ground_below(&self, state: &CharacterState, collider: &Collider) -> Option<f32> {
        let top = state.position.y + 2.0 * state.radius;
        collider.raycast_down(
            state.position.x,
            state.position.z,
            top,
            self.config.raycast_query_radius,
        )
    }
}
