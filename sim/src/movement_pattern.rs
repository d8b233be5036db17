//! Movement patterns (`spec.md` §4.6): a closed tagged-variant set replacing
//! the source's interpreted movement scripts (§9 "source patterns requiring
//! re-architecture"). `apply_pattern` is a pure function of its inputs plus
//! the pattern's own persisted `pattern_time`, so two runs with identical
//! input traces stay deterministic (P8).

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementPattern {
    Straight { speed: f32 },
    Wave { amplitude: f32, frequency: f32, speed: f32 },
    Zigzag { amplitude: f32, frequency: f32, speed: f32 },
    SineWave { amplitude: f32, frequency: f32, speed: f32 },
    Circle { radius: f32, speed: f32 },
}

impl MovementPattern {
    /// Base horizontal speed carried by this pattern, used by the boss AI
    /// to decide whether the pattern contributes additively (`spec.md`
    /// §4.6a, resolving the source's `base_speed > 0` ambiguity).
    pub fn base_speed(&self) -> f32 {
        match *self {
            MovementPattern::Straight { speed }
            | MovementPattern::Wave { speed, .. }
            | MovementPattern::Zigzag { speed, .. }
            | MovementPattern::SineWave { speed, .. }
            | MovementPattern::Circle { speed, .. } => speed,
        }
    }
}

/// Advance `pattern_time` by `dt`, then evaluate the pattern at the new
/// time, returning `(vx, vy)`. Time always advances before evaluation, per
/// the contract in §4.6.
pub fn advance_and_apply(pattern: &MovementPattern, pattern_time: &mut f32, dt: f32) -> (f32, f32) {
    *pattern_time += dt;
    let t = *pattern_time;

    match *pattern {
        MovementPattern::Straight { speed } => (-speed, 0.0),
        MovementPattern::Wave { amplitude, frequency, speed } => (-speed, amplitude * (frequency * t).sin()),
        MovementPattern::Zigzag { amplitude, frequency, speed } => {
            let phase = (frequency * t) % 1.0;
            let vy = if phase < 0.5 { amplitude } else { -amplitude };
            (-speed, vy)
        }
        MovementPattern::SineWave { amplitude, frequency, speed } => {
            (-speed, amplitude * frequency * (frequency * t).cos())
        }
        MovementPattern::Circle { radius, speed } => {
            let angular = speed / radius.max(f32::EPSILON);
            (radius * angular * -(angular * t).sin(), radius * angular * (angular * t).cos())
        }
    }
}
