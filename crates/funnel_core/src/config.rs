//! Tuning configuration for the swarm coordination core.
//!
//! All values are plain data with documented defaults so scenarios can be
//! loaded from JSON or built in code with `..Default::default()`.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};

/// Spatial frame the swarm operates in.
///
/// Three parallel planes are derived from `center` and `depth_offset`:
/// - forward attack plane at `center.z - depth_offset`
/// - master plane at `center.z`
/// - holding plane at `center.z + depth_offset`
///
/// Lateral sampling extents shrink linearly from `max_scale` at the forward
/// plane to `min_scale` at the holding plane, which makes the holding
/// formation converge into a narrow pyramid behind the master plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFrame {
    /// Center of the master plane
    pub center: Point3<f32>,
    /// Lateral half-extent along X (기본: 5.0)
    pub extent_x: f32,
    /// Lateral half-extent along Y (기본: 5.0)
    pub extent_y: f32,
    /// Depth between the master plane and each outer plane (기본: 3.0)
    pub depth_offset: f32,
    /// Lateral scale at the holding plane (기본: 0.25)
    pub min_scale: f32,
    /// Lateral scale at the forward attack plane (기본: 1.0)
    pub max_scale: f32,
    /// Minimum distance between two simultaneously assigned positions (기본: 1.5)
    pub min_separation: f32,
}

impl Default for WorldFrame {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            extent_x: 5.0,
            extent_y: 5.0,
            depth_offset: 3.0,
            min_scale: 0.25,
            max_scale: 1.0,
            min_separation: 1.5,
        }
    }
}

impl WorldFrame {
    /// Validate the frame before handing it to the controller.
    pub fn validate(&self) -> Result<()> {
        let finite = self.center.coords.iter().all(|c| c.is_finite())
            && self.extent_x.is_finite()
            && self.extent_y.is_finite()
            && self.depth_offset.is_finite();
        if !finite {
            return Err(SwarmError::InvalidFrame("non-finite frame value".to_string()));
        }
        if self.extent_x <= 0.0 || self.extent_y <= 0.0 {
            return Err(SwarmError::InvalidFrame(format!(
                "extents must be positive: {} x {}",
                self.extent_x, self.extent_y
            )));
        }
        if self.depth_offset <= 0.0 {
            return Err(SwarmError::InvalidFrame(format!(
                "depth offset must be positive: {}",
                self.depth_offset
            )));
        }
        if self.min_scale <= 0.0 || self.max_scale <= self.min_scale {
            return Err(SwarmError::InvalidFrame(format!(
                "scale range must satisfy 0 < min < max: [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        if self.min_separation < 0.0 {
            return Err(SwarmError::InvalidFrame(format!(
                "min separation must be non-negative: {}",
                self.min_separation
            )));
        }
        Ok(())
    }
}

/// Behavior tuning for the controller and per-unit tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    /// Per-unit task start offset, applied as `index * stagger_secs` (기본: 0.25)
    pub stagger_secs: f32,
    /// Pause on the forward plane before firing (기본: 0.4)
    pub attack_pause_secs: f32,
    /// Standby watch loop polling interval (기본: 0.2)
    pub watch_interval_secs: f32,
    /// Per-unit cooldown between standby watch shots (기본: 2.0)
    pub attack_cooldown_secs: f32,
    /// Forward probe range for the standby watch loop (기본: 30.0)
    pub probe_range: f32,
    /// Forward probe half-angle in radians (기본: 0.15)
    pub probe_half_angle_rad: f32,
    /// Placement sampling attempts before the unchecked fallback (기본: 10)
    pub placement_retries: u32,
    /// Radius for the collision overlap query around a candidate (기본: 0.5)
    pub collision_probe_radius: f32,
    /// Arrival distance epsilon for movement steps (기본: 0.05)
    pub arrive_epsilon: f32,
    /// Alignment epsilon in radians for rotation steps (기본: 0.02)
    pub align_epsilon_rad: f32,
    /// Movement speed applied to units built without an explicit one (기본: 6.0)
    pub default_move_speed: f32,
    /// Rotation speed in radians/sec for units without an explicit one (기본: PI)
    pub default_rot_speed_rad: f32,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            stagger_secs: 0.25,
            attack_pause_secs: 0.4,
            watch_interval_secs: 0.2,
            attack_cooldown_secs: 2.0,
            probe_range: 30.0,
            probe_half_angle_rad: 0.15,
            placement_retries: 10,
            collision_probe_radius: 0.5,
            arrive_epsilon: 0.05,
            align_epsilon_rad: 0.02,
            default_move_speed: 6.0,
            default_rot_speed_rad: std::f32::consts::PI,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stagger_secs < 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "stagger must be non-negative: {}",
                self.stagger_secs
            )));
        }
        if self.watch_interval_secs <= 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "watch interval must be positive: {}",
                self.watch_interval_secs
            )));
        }
        if self.placement_retries == 0 {
            return Err(SwarmError::InvalidConfig(
                "placement retries must be at least 1".to_string(),
            ));
        }
        if self.default_move_speed <= 0.0 || self.default_rot_speed_rad <= 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "default speeds must be positive: {} / {}",
                self.default_move_speed, self.default_rot_speed_rad
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_is_valid() {
        assert!(WorldFrame::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SwarmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_scale_range_rejected() {
        let frame = WorldFrame { min_scale: 1.0, max_scale: 0.5, ..Default::default() };
        assert!(frame.validate().is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = SwarmConfig { placement_retries: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frame_round_trips_through_json() {
        let frame = WorldFrame::default();
        let json = serde_json::to_string(&frame).unwrap();
        let back: WorldFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extent_x, frame.extent_x);
        assert_eq!(back.min_separation, frame.min_separation);
    }
}
