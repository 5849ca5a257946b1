//! Background transition compositing: maps a transition effect and its
//! progress to the 0..2 layers drawn for the frame.

use kurbo::Vec2;

use crate::{
    core::Fnv1a64,
    ease::{clamp01, sin_envelope},
    model::TransitionEffect,
};

/// Extra uniform scale applied to the outgoing layer of a zoom-fade at full
/// progress.
pub const ZOOM_FADE_SCALE_BOOST: f64 = 0.2;

/// Peak glitch-shake translation in canvas pixels.
pub const GLITCH_MAX_OFFSET_PX: f64 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum LayerSlot {
    Current,
    Next,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum LayerBlend {
    Normal,
    /// "Lighter" additive blend, used for the incoming glitch layer.
    Additive,
}

/// One background layer to draw, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LayerPlan {
    pub slot: LayerSlot,
    pub opacity: f64,
    /// Multiplied into the cover-fit scale.
    pub extra_scale: f64,
    /// Translation jitter in canvas pixels.
    pub jitter: Vec2,
    pub blend: LayerBlend,
}

impl LayerPlan {
    fn solid(slot: LayerSlot, opacity: f64) -> Self {
        Self {
            slot,
            opacity,
            extra_scale: 1.0,
            jitter: Vec2::ZERO,
            blend: LayerBlend::Normal,
        }
    }
}

/// Seed material for the glitch jitter: reproducible across re-renders of the
/// same timeline because it derives from scene seed and frame time only.
#[derive(Clone, Copy, Debug)]
pub struct JitterSource {
    pub seed: u64,
    pub time_sec: f64,
}

impl JitterSource {
    /// Pseudo-random offset in [-1,1]² for one layer of this frame. Time is
    /// quantized to milliseconds so capture clocks and live playback agree.
    fn unit_offset(self, layer: u8) -> Vec2 {
        let time_ms = (self.time_sec.max(0.0) * 1000.0).round() as u64;
        Vec2::new(
            hash_to_unit(self.seed, time_ms, layer, 0),
            hash_to_unit(self.seed, time_ms, layer, 1),
        )
    }
}

fn hash_to_unit(seed: u64, time_ms: u64, layer: u8, axis: u8) -> f64 {
    let mut h = Fnv1a64::new(Fnv1a64::OFFSET_BASIS ^ seed);
    h.write_u64(time_ms);
    h.write_u8(layer);
    h.write_u8(axis);
    // Top 53 bits -> [0,1), remapped to [-1,1).
    let unit = (h.finish() >> 11) as f64 / (1u64 << 53) as f64;
    unit * 2.0 - 1.0
}

/// Progress through the transition window: 0 when the window opens, 1 at the
/// segment boundary. Continuous through 0 as the window opens.
pub fn progress(time_remaining_sec: f64, duration_sec: f64) -> f64 {
    if duration_sec <= 0.0 {
        return 1.0;
    }
    clamp01(1.0 - time_remaining_sec / duration_sec)
}

/// Layers to draw while the transition window is active. Callers outside the
/// window draw the current segment opaque and never reach this.
pub fn plan_layers(effect: TransitionEffect, progress: f64, jitter: JitterSource) -> Vec<LayerPlan> {
    let p = clamp01(progress);
    match effect {
        TransitionEffect::None => vec![LayerPlan::solid(LayerSlot::Current, 1.0)],
        TransitionEffect::Crossfade => vec![
            LayerPlan::solid(LayerSlot::Current, 1.0),
            LayerPlan::solid(LayerSlot::Next, p),
        ],
        TransitionEffect::FlashBlack => {
            // Two-phase: fade current out to black, then next in. The
            // midpoint frame is true black.
            if p < 0.5 {
                vec![LayerPlan::solid(LayerSlot::Current, 1.0 - 2.0 * p)]
            } else {
                vec![LayerPlan::solid(LayerSlot::Next, 2.0 * (p - 0.5))]
            }
        }
        TransitionEffect::ZoomFade => vec![
            LayerPlan {
                slot: LayerSlot::Current,
                opacity: 1.0 - p,
                extra_scale: 1.0 + ZOOM_FADE_SCALE_BOOST * p,
                jitter: Vec2::ZERO,
                blend: LayerBlend::Normal,
            },
            LayerPlan::solid(LayerSlot::Next, p),
        ],
        TransitionEffect::GlitchShake => {
            let envelope = sin_envelope(p) * GLITCH_MAX_OFFSET_PX;
            vec![
                LayerPlan {
                    slot: LayerSlot::Current,
                    opacity: 1.0,
                    extra_scale: 1.0,
                    jitter: jitter.unit_offset(0) * envelope,
                    blend: LayerBlend::Normal,
                },
                LayerPlan {
                    slot: LayerSlot::Next,
                    opacity: p,
                    extra_scale: 1.0,
                    jitter: jitter.unit_offset(1) * envelope,
                    blend: LayerBlend::Additive,
                },
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jitter_at(t: f64) -> JitterSource {
        JitterSource {
            seed: 42,
            time_sec: t,
        }
    }

    #[test]
    fn progress_is_continuous_through_window_open() {
        // Just outside the window.
        assert_eq!(progress(1.5, 1.5), 0.0);
        // Just inside.
        let p = progress(1.499, 1.5);
        assert!(p > 0.0 && p < 0.001);
        // At the boundary.
        assert_eq!(progress(0.0, 1.5), 1.0);
    }

    #[test]
    fn crossfade_keeps_current_opaque_and_fades_next_in() {
        let layers = plan_layers(TransitionEffect::Crossfade, 0.25, jitter_at(0.0));
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].slot, LayerSlot::Current);
        assert_eq!(layers[0].opacity, 1.0);
        assert_eq!(layers[1].slot, LayerSlot::Next);
        assert_eq!(layers[1].opacity, 0.25);
    }

    #[test]
    fn flash_black_midpoint_draws_nothing_visible() {
        let before = plan_layers(TransitionEffect::FlashBlack, 0.499, jitter_at(0.0));
        assert_eq!(before[0].slot, LayerSlot::Current);
        assert!(before[0].opacity < 0.01);

        let mid = plan_layers(TransitionEffect::FlashBlack, 0.5, jitter_at(0.0));
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].slot, LayerSlot::Next);
        assert_eq!(mid[0].opacity, 0.0);

        let after = plan_layers(TransitionEffect::FlashBlack, 0.75, jitter_at(0.0));
        assert_eq!(after[0].slot, LayerSlot::Next);
        assert!((after[0].opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zoom_fade_scales_and_fades_the_outgoing_layer() {
        let layers = plan_layers(TransitionEffect::ZoomFade, 0.5, jitter_at(0.0));
        assert!((layers[0].extra_scale - 1.1).abs() < 1e-9);
        assert!((layers[0].opacity - 0.5).abs() < 1e-9);
        assert_eq!(layers[1].extra_scale, 1.0);
    }

    #[test]
    fn glitch_jitter_is_zero_at_transition_ends() {
        for p in [0.0, 1.0] {
            let layers = plan_layers(TransitionEffect::GlitchShake, p, jitter_at(3.2));
            assert!(layers[0].jitter.hypot() < 1e-9);
            assert!(layers[1].jitter.hypot() < 1e-9);
        }
    }

    #[test]
    fn glitch_jitter_is_nonzero_and_bounded_mid_transition() {
        let layers = plan_layers(TransitionEffect::GlitchShake, 0.5, jitter_at(3.2));
        let magnitude = layers[0].jitter.hypot();
        assert!(magnitude > 0.0);
        assert!(magnitude <= GLITCH_MAX_OFFSET_PX * std::f64::consts::SQRT_2);
        assert_eq!(layers[1].blend, LayerBlend::Additive);
    }

    #[test]
    fn glitch_jitter_is_reproducible_for_equal_time_and_seed() {
        let a = plan_layers(TransitionEffect::GlitchShake, 0.4, jitter_at(7.77));
        let b = plan_layers(TransitionEffect::GlitchShake, 0.4, jitter_at(7.77));
        assert_eq!(a, b);

        let other_seed = plan_layers(
            TransitionEffect::GlitchShake,
            0.4,
            JitterSource {
                seed: 43,
                time_sec: 7.77,
            },
        );
        assert_ne!(a[0].jitter, other_seed[0].jitter);
    }
}
