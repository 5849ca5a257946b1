//! Media placement and video time mapping at the decoder boundary. The engine
//! never decodes; it computes where a decoded surface goes and which source
//! time its decoder should be showing.

use kurbo::Affine;

use crate::core::Canvas;

/// Playback-pointer drift tolerated before a driver should re-seek its video
/// decoder. Constant re-seeking stutters; this hysteresis is a performance
/// concession, not a correctness dependency.
pub const SEEK_EPSILON_SEC: f64 = 0.3;

/// Cover fit: uniform scale so the media fully fills the canvas, centered,
/// cropping overflow. `extra_scale` multiplies the fit (effect-driven zoom).
/// Returns `None` for surfaces that report zero size (not yet decoded).
pub fn cover_fit(canvas: Canvas, media_w: u32, media_h: u32, extra_scale: f64) -> Option<Affine> {
    if media_w == 0 || media_h == 0 || canvas.width == 0 || canvas.height == 0 {
        return None;
    }
    if !extra_scale.is_finite() || extra_scale <= 0.0 {
        return None;
    }

    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (mw, mh) = (f64::from(media_w), f64::from(media_h));
    let scale = (cw / mw).max(ch / mh) * extra_scale;

    let tx = (cw - mw * scale) / 2.0;
    let ty = (ch - mh * scale) / 2.0;
    Some(Affine::translate((tx, ty)) * Affine::scale(scale))
}

/// Internal playback pointer for the video occupying the *current* segment:
/// time into the segment, wrapped by the video's own intrinsic duration so
/// short clips loop within long segments.
pub fn current_video_time_sec(
    loop_time_sec: f64,
    segment_start_sec: f64,
    intrinsic_duration_sec: Option<f64>,
) -> f64 {
    let local = (loop_time_sec - segment_start_sec).max(0.0);
    match intrinsic_duration_sec {
        Some(d) if d.is_finite() && d > 0.0 => local.rem_euclid(d),
        _ => local,
    }
}

/// Internal playback pointer for a video being pre-rolled as the *next*
/// segment: starts at 0 the instant the transition window opens, so the
/// incoming clip begins at its own beginning.
pub fn incoming_video_time_sec(transition_duration_sec: f64, time_remaining_sec: f64) -> f64 {
    (transition_duration_sec - time_remaining_sec).max(0.0)
}

/// Whether a driver should correct its decoder's playback pointer. Below the
/// epsilon the drift is left alone.
pub fn needs_seek_correction(actual_sec: f64, target_sec: f64) -> bool {
    (actual_sec - target_sec).abs() > SEEK_EPSILON_SEC
}
