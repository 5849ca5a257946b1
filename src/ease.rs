//! Easing curves and periodic helpers shared by the text and transition animators.

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    OutQuad,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

pub fn clamp01(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Shake-intensity envelope over transition progress: zero at both ends,
/// peaking mid-transition.
pub fn sin_envelope(progress: f64) -> f64 {
    (clamp01(progress) * std::f64::consts::PI).sin().max(0.0)
}

/// Continuous 0..1 pulse for effects that breathe with absolute time rather
/// than line progress.
pub fn pulse01(x: f64) -> f64 {
    (x.sin() + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_stable() {
        for ease in [Ease::Linear, Ease::OutQuad, Ease::OutCubic, Ease::InOutCubic] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in [Ease::Linear, Ease::OutQuad, Ease::OutCubic, Ease::InOutCubic] {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn envelope_is_zero_at_both_ends_and_peaks_in_the_middle() {
        assert!(sin_envelope(0.0).abs() < 1e-12);
        assert!(sin_envelope(1.0).abs() < 1e-12);
        assert!((sin_envelope(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pulse_stays_in_unit_range() {
        for i in 0..100 {
            let p = pulse01(f64::from(i) * 0.37);
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
