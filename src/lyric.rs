//! Lyric line animation: maps absolute playback time to the text draws for
//! the active line, its neighbors, and the pre-first-line intro state.

use kurbo::Point;

use crate::{
    core::Canvas,
    ease::{Ease, clamp01, pulse01},
    model::{LrcLine, LyricEffect, LyricStyle},
    plan::{TextOp, TextRole, estimate_line_height_px},
};

/// Segment duration assumed after the final line.
pub const LAST_LINE_LOOKAHEAD_SEC: f64 = 5.0;

pub const FADE_UP_DURATION_SEC: f64 = 0.5;
pub const FADE_UP_RISE_PX: f64 = 30.0;

/// Typewriter reveal window: 80% of the line's segment, capped at 2 seconds.
pub const TYPEWRITER_SEGMENT_FRAC: f64 = 0.8;
pub const TYPEWRITER_CAP_SEC: f64 = 2.0;

pub const BREATHING_RATE: f64 = 3.0;
pub const BREATHING_SCALE_BOOST: f64 = 0.05;
pub const BREATHING_GLOW_BOOST_PX: f64 = 8.0;

/// Scatter is an exit dissolve: idle until this progress, then dissolve over
/// the remainder.
pub const SCATTER_EXIT_START: f64 = 0.8;
pub const SCATTER_MAX_SCALE: f64 = 3.0;
pub const SCATTER_MAX_BLUR_PX: f64 = 10.0;

/// Adjacent-line preview: fixed size and pitch, independent of the active
/// line's effect.
pub const ADJACENT_FONT_SCALE: f64 = 0.7;
pub const ADJACENT_PITCH_LINE_HEIGHTS: f64 = 1.5;

const INTRO_ELLIPSIS: &str = "…";

/// Stable ascending order of lyric lines by timestamp. Duplicate and zero
/// timestamps keep their input order.
pub fn sorted_order(lines: &[LrcLine]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lines.len()).collect();
    order.sort_by(|&a, &b| {
        lines[a]
            .time_sec
            .partial_cmp(&lines[b].time_sec)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// The active line and where the playhead sits within its segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveLyric {
    /// Position within the sorted order.
    pub order_pos: usize,
    /// Index into the caller's line list.
    pub line_index: usize,
    pub elapsed_sec: f64,
    pub segment_duration_sec: f64,
    pub progress: f64,
}

/// Locate the line whose time has passed and whose successor's has not. The
/// last line stays active for all time beyond its own timestamp. `None`
/// before the first line (intro state).
pub fn locate_active(lines: &[LrcLine], order: &[usize], time_sec: f64) -> Option<ActiveLyric> {
    let mut active_pos = None;
    for (pos, &idx) in order.iter().enumerate() {
        if lines[idx].time_sec <= time_sec {
            active_pos = Some(pos);
        } else {
            break;
        }
    }
    let order_pos = active_pos?;
    let line_index = order[order_pos];
    let start = lines[line_index].time_sec;

    let segment_duration_sec = match order.get(order_pos + 1) {
        Some(&next_idx) => (lines[next_idx].time_sec - start).max(0.0),
        None => LAST_LINE_LOOKAHEAD_SEC,
    };

    let elapsed_sec = (time_sec - start).max(0.0);
    let progress = if segment_duration_sec > 0.0 {
        clamp01(elapsed_sec / segment_duration_sec)
    } else {
        1.0
    };

    Some(ActiveLyric {
        order_pos,
        line_index,
        elapsed_sec,
        segment_duration_sec,
        progress,
    })
}

/// Text draws for the lyric layer at `time_sec`.
pub fn plan_lyrics(
    lines: &[LrcLine],
    time_sec: f64,
    style: &LyricStyle,
    canvas: Canvas,
) -> Vec<TextOp> {
    let order = sorted_order(lines);
    let anchor = anchor_px(style, canvas);
    let pitch = estimate_line_height_px(style.font_px) * ADJACENT_PITCH_LINE_HEIGHTS;

    let Some(active) = locate_active(lines, &order, time_sec) else {
        // Intro: ellipsis in the active slot plus a preview of the first line.
        let mut ops = vec![base_op(
            INTRO_ELLIPSIS,
            TextRole::LyricIntro,
            anchor,
            style.font_px,
            style.active_rgba8,
            style,
        )];
        if let Some(&first) = order.first() {
            ops.push(adjacent_op(
                &lines[first].text,
                TextRole::LyricNext,
                Point::new(anchor.x, anchor.y + pitch),
                style,
            ));
        }
        return ops;
    };

    let mut ops = Vec::with_capacity(4);
    if active.order_pos > 0 {
        let prev = order[active.order_pos - 1];
        ops.push(adjacent_op(
            &lines[prev].text,
            TextRole::LyricPrev,
            Point::new(anchor.x, anchor.y - pitch),
            style,
        ));
    }

    push_active_ops(&mut ops, &lines[active.line_index].text, active, time_sec, style, anchor);

    if let Some(&next) = order.get(active.order_pos + 1) {
        ops.push(adjacent_op(
            &lines[next].text,
            TextRole::LyricNext,
            Point::new(anchor.x, anchor.y + pitch),
            style,
        ));
    }
    ops
}

fn push_active_ops(
    ops: &mut Vec<TextOp>,
    text: &str,
    active: ActiveLyric,
    time_sec: f64,
    style: &LyricStyle,
    anchor: Point,
) {
    let mut op = base_op(
        text,
        TextRole::LyricActive,
        anchor,
        style.font_px,
        style.active_rgba8,
        style,
    );

    match style.effect {
        LyricEffect::None => {}
        LyricEffect::FadeUp => {
            let e = Ease::OutCubic.apply(clamp01(active.elapsed_sec / FADE_UP_DURATION_SEC));
            op.opacity = e;
            op.origin.y = anchor.y + (1.0 - e) * FADE_UP_RISE_PX;
        }
        LyricEffect::Typewriter => {
            let window = (active.segment_duration_sec * TYPEWRITER_SEGMENT_FRAC)
                .min(TYPEWRITER_CAP_SEC);
            let ratio = if window > 0.0 {
                clamp01(active.elapsed_sec / window)
            } else {
                1.0
            };
            let len = text.chars().count();
            op.visible_chars = Some(((len as f64) * ratio).floor() as usize);
        }
        LyricEffect::KaraokeWipe => {
            // Inactive base first, then the active color clipped to a
            // left-aligned rectangle growing with progress.
            let base = base_op(
                text,
                TextRole::LyricActive,
                anchor,
                style.font_px,
                style.inactive_rgba8,
                style,
            );
            ops.push(base);
            op.clip_width_frac = Some(active.progress);
        }
        LyricEffect::Breathing => {
            // Continuous pulse on absolute time, not line progress.
            let pulse = pulse01(time_sec * BREATHING_RATE);
            op.scale = 1.0 + BREATHING_SCALE_BOOST * pulse;
            op.glow_px = style.glow_px + BREATHING_GLOW_BOOST_PX * pulse;
        }
        LyricEffect::Scatter => {
            if active.progress >= SCATTER_EXIT_START {
                let local = clamp01(
                    (active.progress - SCATTER_EXIT_START) / (1.0 - SCATTER_EXIT_START),
                );
                op.scale = 1.0 + (SCATTER_MAX_SCALE - 1.0) * local;
                op.opacity = 1.0 - local;
                op.blur_px = SCATTER_MAX_BLUR_PX * local;
            }
        }
    }

    ops.push(op);
}

fn anchor_px(style: &LyricStyle, canvas: Canvas) -> Point {
    Point::new(
        style.anchor.x.clamp(0.0, 1.0) * f64::from(canvas.width),
        style.anchor.y.clamp(0.0, 1.0) * f64::from(canvas.height),
    )
}

fn base_op(
    text: &str,
    role: TextRole,
    origin: Point,
    font_px: f64,
    rgba8: [u8; 4],
    style: &LyricStyle,
) -> TextOp {
    TextOp {
        text: text.to_string(),
        role,
        origin,
        font_px,
        rgba8,
        opacity: 1.0,
        scale: 1.0,
        blur_px: 0.0,
        glow_px: style.glow_px,
        shadow: style.shadow,
        visible_chars: None,
        clip_width_frac: None,
    }
}

fn adjacent_op(text: &str, role: TextRole, origin: Point, style: &LyricStyle) -> TextOp {
    base_op(
        text,
        role,
        origin,
        style.font_px * ADJACENT_FONT_SCALE,
        style.inactive_rgba8,
        style,
    )
}
