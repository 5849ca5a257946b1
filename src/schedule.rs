//! Playlist scheduling: lays background items end-to-end into a looping
//! timeline and resolves which segment is active at a given playback time.

use crate::model::{BackgroundItem, MediaKind};

/// Used until the decoder reports a real intrinsic duration.
pub const FALLBACK_MEDIA_DURATION_SEC: f64 = 10.0;

/// Auto duration for still images.
pub const IMAGE_DEFAULT_DURATION_SEC: f64 = 5.0;

/// One `[start, end)` interval of the background timeline. Derived per frame;
/// identical inputs always produce identical segments.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlaylistSegment {
    pub item_index: usize,
    pub start_sec: f64,
    pub end_sec: f64,
}

impl PlaylistSegment {
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ActiveSegments {
    pub current: PlaylistSegment,
    /// Wraparound successor. `None` for single-segment playlists, where
    /// transitions are suppressed.
    pub next: Option<PlaylistSegment>,
    pub time_remaining_sec: f64,
    pub loop_time_sec: f64,
}

/// Duration a background item occupies on the timeline: the user-assigned
/// duration when set, else the intrinsic media duration, else a fallback that
/// holds until the real duration becomes known.
pub fn effective_duration_sec(item: &BackgroundItem) -> f64 {
    if item.user_duration_sec > 0.0 {
        return item.user_duration_sec;
    }
    match item.kind {
        MediaKind::Image => IMAGE_DEFAULT_DURATION_SEC,
        MediaKind::Video => match item.surface.duration_sec {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => FALLBACK_MEDIA_DURATION_SEC,
        },
    }
}

pub fn build_segments(items: &[BackgroundItem]) -> Vec<PlaylistSegment> {
    let mut segments = Vec::with_capacity(items.len());
    let mut cursor = 0.0;
    for (item_index, item) in items.iter().enumerate() {
        let duration = effective_duration_sec(item);
        segments.push(PlaylistSegment {
            item_index,
            start_sec: cursor,
            end_sec: cursor + duration,
        });
        cursor += duration;
    }
    segments
}

pub fn total_cycle_duration_sec(segments: &[PlaylistSegment]) -> f64 {
    segments.last().map_or(0.0, |s| s.end_sec)
}

/// Resolve the active segment, its wraparound successor and the time left in
/// the active segment. Returns `None` when there is nothing to draw (empty
/// list or degenerate zero-length cycle); the caller renders a blank frame.
pub fn resolve_active(items: &[BackgroundItem], current_time_sec: f64) -> Option<ActiveSegments> {
    let segments = build_segments(items);
    let total = total_cycle_duration_sec(&segments);
    if segments.is_empty() || total <= 0.0 {
        return None;
    }

    let loop_time_sec = current_time_sec.max(0.0).rem_euclid(total);

    // Linear scan; playlists are small. Float rounding at the cycle boundary
    // falls through to the last segment.
    let pos = segments
        .iter()
        .position(|s| s.start_sec <= loop_time_sec && loop_time_sec < s.end_sec)
        .unwrap_or(segments.len() - 1);

    let current = segments[pos];
    let next = if segments.len() > 1 {
        Some(segments[(pos + 1) % segments.len()])
    } else {
        None
    };

    Some(ActiveSegments {
        current,
        next,
        time_remaining_sec: (current.end_sec - loop_time_sec).max(0.0),
        loop_time_sec,
    })
}
