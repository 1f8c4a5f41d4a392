use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Environment, Step, StepInfo};

const TRACK_LENGTH: f32 = 90.0;
const MAX_STEPS: usize = 1600;
const DT: f32 = 0.05;

const MAX_SPEED: f32 = 4.0;
const THRUST: f32 = 3.0;
const DRAG: f32 = 0.5;

const TIP_GAIN: f32 = 2.0;
const TORQUE: f32 = 4.0;
const THRUST_TILT: f32 = 0.6;
const ANGULAR_DAMPING: f32 = 0.2;
const FALL_ANGLE: f32 = 1.0;

const FALL_REWARD: f32 = -100.0;
const FORWARD_REWARD: f32 = 130.0 / TRACK_LENGTH;
const TILT_PENALTY: f32 = 5.0;
const EFFORT_PENALTY: f32 = 0.00035;

const RENDER_WIDTH: usize = 60;

/// A walker hull balancing on a straight track.
///
/// The first action dimension pushes the hull forward and tilts it, the second one
/// corrects its angle. Tipping over past `FALL_ANGLE` ends the episode with a
/// `-100` reward, reaching the end of the track or running out of steps ends it
/// normally.
///
/// # State
/// `[position / TRACK_LENGTH, velocity, angle, angular velocity, sin(angle), cos(angle)]`
///
/// # Reward
/// `r = 130 * Δx / TRACK_LENGTH - 5 * |angle| - 0.00035 * Σ|a|`
#[derive(Debug, Clone)]
pub struct Walker1D {
    position: f32,
    velocity: f32,
    angle: f32,
    angular_velocity: f32,
    steps: usize,
    rng: StdRng,
}

impl Walker1D {
    pub const ID: &'static str = "Walker1D-v0";

    /// Creates a new `Walker1D`.
    ///
    /// # Arguments
    /// * `seed` - Seeds the initial perturbations, `None` seeds them from the os.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            position: 0.0,
            velocity: 0.0,
            angle: 0.0,
            angular_velocity: 0.0,
            steps: 0,
            rng,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    fn state(&self) -> Vec<f32> {
        vec![
            self.position / TRACK_LENGTH,
            self.velocity,
            self.angle,
            self.angular_velocity,
            self.angle.sin(),
            self.angle.cos(),
        ]
    }
}

impl Environment for Walker1D {
    fn observation_dim(&self) -> usize {
        6
    }

    fn action_dim(&self) -> usize {
        2
    }

    fn action_bounds(&self) -> (Vec<f32>, Vec<f32>) {
        (vec![-1.0; 2], vec![1.0; 2])
    }

    fn reset(&mut self) -> Vec<f32> {
        self.position = 0.0;
        self.velocity = 0.0;
        self.angle = self.rng.random_range(-0.05..0.05);
        self.angular_velocity = self.rng.random_range(-0.05..0.05);
        self.steps = 0;
        self.state()
    }

    fn step(&mut self, action: &[f32]) -> Step {
        let thrust = action.first().copied().unwrap_or_default().clamp(-1.0, 1.0);
        let torque = action.get(1).copied().unwrap_or_default().clamp(-1.0, 1.0);

        let acc = THRUST * thrust - DRAG * self.velocity;
        self.velocity = (self.velocity + acc * DT).clamp(-MAX_SPEED, MAX_SPEED);

        let angular_acc = TIP_GAIN * self.angle.sin() + TORQUE * torque
            - THRUST_TILT * thrust
            - ANGULAR_DAMPING * self.angular_velocity;
        self.angular_velocity += angular_acc * DT;
        self.angle += self.angular_velocity * DT;

        let last_position = self.position;
        self.position += self.velocity * DT;
        self.steps += 1;

        let fell = self.angle.abs() > FALL_ANGLE;
        let reward = if fell {
            FALL_REWARD
        } else {
            FORWARD_REWARD * (self.position - last_position)
                - TILT_PENALTY * self.angle.abs()
                - EFFORT_PENALTY * (thrust.abs() + torque.abs())
        };

        let done = fell || self.position >= TRACK_LENGTH || self.steps >= MAX_STEPS;

        Step {
            state: self.state(),
            reward,
            done,
            info: StepInfo {
                position: self.position,
            },
        }
    }

    fn render(&self) {
        let at = (self.position / TRACK_LENGTH * RENDER_WIDTH as f32)
            .clamp(0.0, (RENDER_WIDTH - 1) as f32) as usize;

        let track: String = (0..RENDER_WIDTH)
            .map(|i| if i == at { 'W' } else { '_' })
            .collect();

        debug!("|{track}| pos {:.1} angle {:+.2}", self.position, self.angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_starts_at_the_origin() {
        let mut env = Walker1D::new(Some(1));
        let state = env.reset();

        assert_eq!(state.len(), env.observation_dim());
        assert_eq!(state[0], 0.0);
        assert!(state[2].abs() < 0.05);
    }

    #[test]
    fn pushing_forward_moves_forward() {
        let mut env = Walker1D::new(Some(1));
        env.reset();

        for _ in 0..10 {
            let step = env.step(&[1.0, 0.3]);
            assert!(!step.done);
        }

        assert!(env.position() > 0.0);
    }

    #[test]
    fn falling_gives_the_sentinel_reward() {
        let mut env = Walker1D::new(Some(1));
        env.reset();

        let step = (0..MAX_STEPS)
            .map(|_| env.step(&[0.0, 1.0]))
            .find(|step| step.done)
            .unwrap();

        assert_eq!(step.reward, FALL_REWARD);
        assert!(step.info.position.abs() < 1e-3);
    }

    #[test]
    fn episode_is_capped() {
        let mut env = Walker1D::new(Some(1));
        env.reset();
        env.angle = 0.0;
        env.angular_velocity = 0.0;

        let steps = (0..MAX_STEPS)
            .map(|_| env.step(&[0.0, 0.0]))
            .position(|step| step.done);

        assert_eq!(steps, Some(MAX_STEPS - 1));
    }

    #[test]
    fn reaching_the_end_of_the_track() {
        let mut env = Walker1D::new(Some(1));
        env.reset();
        env.position = TRACK_LENGTH - 0.01;
        env.velocity = MAX_SPEED;
        env.angle = 0.0;
        env.angular_velocity = 0.0;

        let step = env.step(&[0.0, 0.0]);
        assert!(step.done);
        assert!(step.info.position >= 88.0);
        assert!(step.reward > FALL_REWARD);
    }
}
