//! The per-frame display list. A [`FramePlan`] carries everything a
//! canvas-equivalent backend needs to draw one composited frame: background
//! layers, the dim overlay, then text. Plans are recomputed fresh each tick
//! and are serializable so hosts can snapshot and fingerprint them.

use kurbo::{Affine, Point};

use crate::{core::Canvas, model::MediaKind, transition::LayerBlend};

/// Fraction of the font size a glyph advances horizontally. Layout here is
/// estimated from font-size arithmetic rather than measured text; every
/// extent estimate funnels through the two functions below so a real text
/// measurer can replace them without touching animation logic.
pub const GLYPH_ADVANCE_FRAC: f64 = 0.6;

pub const LINE_HEIGHT_FRAC: f64 = 1.25;

pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * font_px * GLYPH_ADVANCE_FRAC
}

pub fn estimate_line_height_px(font_px: f64) -> f64 {
    font_px * LINE_HEIGHT_FRAC
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FramePlan {
    pub canvas: Canvas,
    pub time_sec: f64,
    /// Background layers in draw order (0..2 per frame).
    pub background: Vec<BackgroundOp>,
    /// Dim overlay between background and text.
    pub dim: Option<DimOp>,
    /// Text draws in draw order.
    pub text: Vec<TextOp>,
}

impl FramePlan {
    /// True when the frame has no background pixels to draw (empty playlist,
    /// degenerate cycle, or every layer's surface still pending).
    pub fn is_blank_background(&self) -> bool {
        self.background.is_empty()
    }
}

/// One background layer draw.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BackgroundOp {
    /// Index into the scene's background item list.
    pub item_index: usize,
    pub kind: MediaKind,
    /// Source time the item's decoder should be showing. 0 for images.
    pub source_time_sec: f64,
    /// Media pixel space -> canvas pixel space (cover fit, effect scale,
    /// jitter).
    pub placement: Affine,
    pub opacity: f64,
    pub blend: LayerBlend,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DimOp {
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TextRole {
    LyricActive,
    LyricPrev,
    LyricNext,
    LyricIntro,
    Title,
    Subtitle,
    Artist,
    Credit,
}

/// One text draw. `origin` is the anchor at the text's center in canvas
/// pixels; backends derive edges from the estimated extent.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextOp {
    pub text: String,
    pub role: TextRole,
    pub origin: Point,
    pub font_px: f64,
    pub rgba8: [u8; 4],
    pub opacity: f64,
    pub scale: f64,
    pub blur_px: f64,
    pub glow_px: f64,
    pub shadow: bool,
    /// Typewriter reveal: number of leading characters to draw.
    pub visible_chars: Option<usize>,
    /// Karaoke wipe: clip to this fraction of the measured width, from the
    /// text's left edge.
    pub clip_width_frac: Option<f64>,
}

impl TextOp {
    /// The character prefix a backend should draw, honoring the typewriter
    /// reveal. Safe on multi-byte text.
    pub fn visible_text(&self) -> &str {
        match self.visible_chars {
            None => &self.text,
            Some(n) => match self.text.char_indices().nth(n) {
                Some((byte_idx, _)) => &self.text[..byte_idx],
                None => &self.text,
            },
        }
    }

    /// Estimated drawn width in canvas pixels, honoring reveal, clip and
    /// scale.
    pub fn estimated_width_px(&self) -> f64 {
        let full = estimate_text_width_px(self.visible_text(), self.font_px) * self.scale;
        match self.clip_width_frac {
            Some(frac) => full * frac.clamp(0.0, 1.0),
            None => full,
        }
    }
}
