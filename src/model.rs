use kurbo::Point;

use crate::{
    core::Canvas,
    error::{VerseframeError, VerseframeResult},
};

/// Immutable per-frame configuration snapshot.
///
/// The editing layer owns and mutates this between frames; within a single
/// compose call it is read-only. Every derived structure (segments, title
/// elements, layout positions) is recomputed fresh from it on each call.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub canvas: Canvas,
    pub backgrounds: Vec<BackgroundItem>,
    pub transition: TransitionConfig,
    pub lyrics: Vec<LrcLine>,
    pub lyric_style: LyricStyle,
    pub title: TitleConfig,
    pub title_style: LyricStyle,
    pub seed: u64, // global determinism seed for jittered effects
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

/// Decoded-frame-source boundary: what the engine is allowed to know about a
/// background item's pixels. Populated asynchronously by the decoder
/// collaborator; any field may be "not yet" at any time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceState {
    pub ready: bool,
    pub width: u32,
    pub height: u32,
    /// Intrinsic media duration, once known. Videos only.
    pub duration_sec: Option<f64>,
}

impl SurfaceState {
    pub fn pending() -> Self {
        Self {
            ready: false,
            width: 0,
            height: 0,
            duration_sec: None,
        }
    }

    /// True when a draw of this surface can succeed this frame.
    pub fn has_pixels(&self) -> bool {
        self.ready && self.width > 0 && self.height > 0
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BackgroundItem {
    pub id: String,
    pub kind: MediaKind,
    /// User-assigned duration in seconds; 0 means "auto" (intrinsic media
    /// duration, or the image default).
    pub user_duration_sec: f64,
    pub surface: SurfaceState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransitionEffect {
    None,
    Crossfade,
    FlashBlack,
    ZoomFade,
    GlitchShake,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionConfig {
    pub effect: TransitionEffect,
    /// Lead time before a segment boundary during which the next segment is
    /// blended in.
    pub duration_sec: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            effect: TransitionEffect::Crossfade,
            duration_sec: 1.5,
        }
    }
}

/// One timed lyric line. Duplicate and zero timestamps are valid (unset or
/// instrumental placeholders) and must keep their relative order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LrcLine {
    pub time_sec: f64,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LyricEffect {
    None,
    FadeUp,
    Typewriter,
    KaraokeWipe,
    Breathing,
    Scatter,
}

/// Visual parameters for one text layer. One instance styles the lyric text,
/// an independent instance styles the title text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LyricStyle {
    pub font_px: f64,
    pub active_rgba8: [u8; 4],
    pub inactive_rgba8: [u8; 4],
    pub shadow: bool,
    pub glow_px: f64,
    /// Anchor as fractional canvas coordinates in [0,1].
    pub anchor: Point,
    /// Opacity of the dim overlay drawn between background and text.
    pub overlay_opacity: f64,
    pub effect: LyricEffect,
}

impl Default for LyricStyle {
    fn default() -> Self {
        Self {
            font_px: 48.0,
            active_rgba8: [255, 255, 255, 255],
            inactive_rgba8: [160, 160, 160, 255],
            shadow: true,
            glow_px: 0.0,
            anchor: Point::new(0.5, 0.5),
            overlay_opacity: 0.3,
            effect: LyricEffect::FadeUp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TitleLayout {
    Centered,
    VerticalRight,
    Cinematic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TitleEffect {
    Fade,
    FadeUp,
    Typewriter,
    Scatter,
}

/// Title/credit sequence configuration. Which elements exist is determined by
/// which textual fields are non-empty.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TitleConfig {
    pub enabled: bool,
    pub layout: TitleLayout,
    pub effect: TitleEffect,
    pub duration_sec: f64,
    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub author: String,
    pub composer: String,
    pub producer: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            layout: TitleLayout::Centered,
            effect: TitleEffect::FadeUp,
            duration_sec: 6.0,
            title: String::new(),
            subtitle: String::new(),
            artist: String::new(),
            author: String::new(),
            composer: String::new(),
            producer: String::new(),
        }
    }
}

impl Scene {
    pub fn validate(&self) -> VerseframeResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(VerseframeError::validation(
                "canvas width/height must be > 0",
            ));
        }

        if !self.transition.duration_sec.is_finite() || self.transition.duration_sec < 0.0 {
            return Err(VerseframeError::validation(
                "transition duration must be finite and >= 0",
            ));
        }

        for item in &self.backgrounds {
            if !item.user_duration_sec.is_finite() || item.user_duration_sec < 0.0 {
                return Err(VerseframeError::validation(format!(
                    "background '{}' user duration must be finite and >= 0",
                    item.id
                )));
            }
        }

        for line in &self.lyrics {
            if !line.time_sec.is_finite() || line.time_sec < 0.0 {
                return Err(VerseframeError::validation(
                    "lyric line timestamps must be finite and >= 0",
                ));
            }
        }

        self.lyric_style.validate()?;
        self.title_style.validate()?;

        if !self.title.duration_sec.is_finite() || self.title.duration_sec < 0.0 {
            return Err(VerseframeError::validation(
                "title duration must be finite and >= 0",
            ));
        }

        Ok(())
    }

    /// Lyric line indices in ascending time order. The sort is stable so that
    /// duplicate and zero timestamps keep their input order.
    pub fn sorted_lyric_order(&self) -> Vec<usize> {
        crate::lyric::sorted_order(&self.lyrics)
    }
}

impl LyricStyle {
    pub fn validate(&self) -> VerseframeResult<()> {
        if !self.font_px.is_finite() || self.font_px <= 0.0 {
            return Err(VerseframeError::validation(
                "style font_px must be finite and > 0",
            ));
        }
        if !self.anchor.x.is_finite() || !self.anchor.y.is_finite() {
            return Err(VerseframeError::validation("style anchor must be finite"));
        }
        if !self.overlay_opacity.is_finite() || !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(VerseframeError::validation(
                "style overlay_opacity must be within [0,1]",
            ));
        }
        if !self.glow_px.is_finite() || self.glow_px < 0.0 {
            return Err(VerseframeError::validation(
                "style glow_px must be finite and >= 0",
            ));
        }
        Ok(())
    }
}
