//! Vector math, angle helpers, and the projectile intercept solver (component C1).

use glam::Vec2;
use std::f32::consts::PI;

/// Angular velocity of an orbiting ship, in radians/tick.
pub const ORBIT_ANGULAR_VELOCITY: f32 = PI / 64.0;

/// Converts a warp-factor speed into world-units/tick for a non-orbiting ship.
pub const SPEED_TO_UNITS_PER_TICK: f32 = 20.0;

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Normalizes an angle into `[0, 2*PI)`.
pub fn normalize_angle(angle: f32) -> f32 {
    angle.rem_euclid(2.0 * PI)
}

/// Smallest angle between two headings, in `[0, PI]`.
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let d = (normalize_angle(a) - normalize_angle(b)).abs();
    d.min(2.0 * PI - d)
}

/// Result of solving for a projectile intercept course.
///
/// Kept as a tagged enum rather than a "no solution found" sentinel angle so every
/// caller has to decide what direct-aim fallback it wants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InterceptSolution {
    Found { direction: f32, time: f32 },
    None,
}

/// Solves `|target_pos + t*target_vel - shooter_pos| = proj_speed * t` for the
/// smallest positive `t`, returning the firing direction and time to intercept.
pub fn solve_intercept(
    shooter_pos: Vec2,
    target_pos: Vec2,
    target_vel: Vec2,
    proj_speed: f32,
) -> InterceptSolution {
    let r = target_pos - shooter_pos;
    let v = target_vel;

    let a = v.length_squared() - proj_speed * proj_speed;
    let b = 2.0 * r.dot(v);
    let c = r.length_squared();

    let t = if a.abs() < 1e-6 {
        if b.abs() < 1e-6 {
            return InterceptSolution::None;
        }
        let root = -c / b;
        if root > 0.0 { Some(root) } else { None }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            None
        } else {
            let sq = disc.sqrt();
            let t1 = (-b + sq) / (2.0 * a);
            let t2 = (-b - sq) / (2.0 * a);
            let candidates = [t1, t2];
            candidates
                .into_iter()
                .filter(|t| *t > 0.0)
                .fold(None, |acc, t| match acc {
                    Some(best) if best <= t => Some(best),
                    _ => Some(t),
                })
        }
    };

    match t {
        Some(t) if t > 0.0 => {
            let aim_point = target_pos + v * t;
            let dir = (aim_point - shooter_pos).normalize_or_zero();
            if dir == Vec2::ZERO {
                InterceptSolution::None
            } else {
                InterceptSolution::Found {
                    direction: dir.to_angle().rem_euclid(2.0 * PI),
                    time: t,
                }
            }
        }
        _ => InterceptSolution::None,
    }
}

/// Convenience wrapper returning only the aim direction, for callers that don't
/// need time-to-intercept.
pub fn intercept_direction(
    shooter_pos: Vec2,
    target_pos: Vec2,
    target_vel: Vec2,
    proj_speed: f32,
) -> Option<f32> {
    match solve_intercept(shooter_pos, target_pos, target_vel, proj_speed) {
        InterceptSolution::Found { direction, .. } => Some(direction),
        InterceptSolution::None => None,
    }
}

/// Velocity of a ship currently in orbit: `None` if the ship is not orbiting.
///
/// Orbital motion is tangential to the radius from the planet at a fixed
/// angular velocity; callers without an orbit fall back to straight-line motion.
pub fn orbital_velocity(ship_pos: Vec2, planet_pos: Vec2, orbiting: bool) -> Option<Vec2> {
    if !orbiting {
        return None;
    }
    let radius_vec = ship_pos - planet_pos;
    if radius_vec.length_squared() < 1e-6 {
        return Some(Vec2::ZERO);
    }
    let tangent = Vec2::new(-radius_vec.y, radius_vec.x).normalize_or_zero();
    let tangential_speed = ORBIT_ANGULAR_VELOCITY * radius_vec.length();
    Some(tangent * tangential_speed)
}

/// Straight-line velocity for a non-orbiting ship from `speed` (warp factor) and heading.
pub fn straight_line_velocity(speed: f32, direction: f32) -> Vec2 {
    Vec2::new(direction.cos(), direction.sin()) * speed * SPEED_TO_UNITS_PER_TICK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_angle_wraps_into_range() {
        assert!((normalize_angle(-0.1) - (2.0 * PI - 0.1)).abs() < 1e-5);
        assert!((normalize_angle(2.0 * PI + 0.2) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn angle_diff_is_symmetric_and_bounded() {
        assert!((angle_diff(0.0, PI) - PI).abs() < 1e-5);
        assert!(angle_diff(0.1, 6.2) < PI);
        assert_eq!(angle_diff(1.0, 1.0), 0.0);
    }

    #[test]
    fn stationary_target_in_front_gives_direct_aim() {
        let shooter = Vec2::new(0.0, 0.0);
        let target = Vec2::new(1000.0, 0.0);
        match solve_intercept(shooter, target, Vec2::ZERO, 500.0) {
            InterceptSolution::Found { direction, time } => {
                assert!(direction.abs() < 1e-3);
                assert!((time - 2.0).abs() < 1e-3);
            }
            InterceptSolution::None => panic!("expected a solution"),
        }
    }

    #[test]
    fn receding_target_faster_than_projectile_has_no_solution() {
        let shooter = Vec2::new(0.0, 0.0);
        let target = Vec2::new(1000.0, 0.0);
        let vel = Vec2::new(10_000.0, 0.0);
        assert_eq!(
            solve_intercept(shooter, target, vel, 500.0),
            InterceptSolution::None
        );
    }

    #[test]
    fn crossing_target_leads_the_shot() {
        let shooter = Vec2::new(0.0, 0.0);
        let target = Vec2::new(1000.0, 0.0);
        let vel = Vec2::new(0.0, 200.0);
        match solve_intercept(shooter, target, vel, 500.0) {
            InterceptSolution::Found { direction, .. } => {
                assert!(direction > 0.0 && direction < PI / 2.0);
            }
            InterceptSolution::None => panic!("expected a lead solution"),
        }
    }

    #[test]
    fn orbital_velocity_is_tangential() {
        let planet = Vec2::new(0.0, 0.0);
        let ship = Vec2::new(100.0, 0.0);
        let vel = orbital_velocity(ship, planet, true).unwrap();
        assert!(vel.dot(ship - planet).abs() < 1e-3);
        assert!(vel.length() > 0.0);
    }

    #[test]
    fn orbital_velocity_none_when_not_orbiting() {
        assert_eq!(orbital_velocity(Vec2::ZERO, Vec2::ZERO, false), None);
    }
}
