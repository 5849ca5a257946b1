//! Title/credit sequencing: builds the staggered element list from the title
//! configuration and maps playback time to per-element entry animation, a
//! global exit fade, and one of three layout modes.

use kurbo::Point;

use crate::{
    core::Canvas,
    ease::{Ease, clamp01},
    model::{LyricStyle, TitleConfig, TitleEffect, TitleLayout},
    plan::{TextOp, TextRole, estimate_line_height_px},
};

pub const ENTRY_DURATION_SEC: f64 = 1.0;
pub const EXIT_FADE_SEC: f64 = 1.0;

/// Stagger step between the first three element entrances, then between the
/// rest.
pub const STAGGER_PRIMARY_SEC: f64 = 0.4;
pub const STAGGER_CREDIT_SEC: f64 = 0.2;

pub const ENTRY_SLIDE_PX: f64 = 30.0;
pub const SCATTER_ENTRY_SCALE: f64 = 2.0;

/// Character pitch of vertical-right columns, as a fraction of the element's
/// font size.
pub const VERTICAL_CHAR_PITCH_FRAC: f64 = 1.1;
const VERTICAL_COLUMN_PITCH_FRAC: f64 = 1.5;
const VERTICAL_RIGHT_MARGIN_FRAC: f64 = 0.12;
const VERTICAL_TOP_MARGIN_FRAC: f64 = 0.15;
const CINEMATIC_BAND_Y_FRAC: f64 = 0.85;
const CENTERED_STACK_GAP_FRAC: f64 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TitleRole {
    Title,
    Subtitle,
    Artist,
    Credit,
}

impl TitleRole {
    fn font_scale(self) -> f64 {
        match self {
            Self::Title => 1.6,
            Self::Subtitle => 1.0,
            Self::Artist => 1.2,
            Self::Credit => 0.8,
        }
    }

    fn text_role(self) -> TextRole {
        match self {
            Self::Title => TextRole::Title,
            Self::Subtitle => TextRole::Subtitle,
            Self::Artist => TextRole::Artist,
            Self::Credit => TextRole::Credit,
        }
    }
}

/// One sequenced element, derived fresh each frame from the config's field
/// order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TitleElement {
    pub text: String,
    pub role: TitleRole,
    pub entry_delay_sec: f64,
    pub font_scale: f64,
}

/// Elements in title → subtitle → artist → credits order, one per non-empty
/// field, each staggered from the previous.
pub fn build_elements(config: &TitleConfig) -> Vec<TitleElement> {
    let fields: [(&str, TitleRole); 6] = [
        (&config.title, TitleRole::Title),
        (&config.subtitle, TitleRole::Subtitle),
        (&config.artist, TitleRole::Artist),
        (&config.author, TitleRole::Credit),
        (&config.composer, TitleRole::Credit),
        (&config.producer, TitleRole::Credit),
    ];

    let mut elements = Vec::new();
    let mut delay = 0.0;
    for (text, role) in fields {
        if text.trim().is_empty() {
            continue;
        }
        if !elements.is_empty() {
            delay += if elements.len() < 3 {
                STAGGER_PRIMARY_SEC
            } else {
                STAGGER_CREDIT_SEC
            };
        }
        elements.push(TitleElement {
            text: text.to_string(),
            role,
            entry_delay_sec: delay,
            font_scale: role.font_scale(),
        });
    }
    elements
}

/// Text draws for the title layer, or empty when the sequence is inactive.
pub fn plan_title(
    config: &TitleConfig,
    style: &LyricStyle,
    time_sec: f64,
    canvas: Canvas,
) -> Vec<TextOp> {
    if !config.enabled || time_sec < 0.0 || time_sec >= config.duration_sec {
        return Vec::new();
    }

    let elements = build_elements(config);
    if elements.is_empty() {
        return Vec::new();
    }

    let exit_alpha = clamp01((config.duration_sec - time_sec) / EXIT_FADE_SEC);
    let positions = layout_positions(config.layout, &elements, style, canvas);

    let mut ops = Vec::new();
    for (element, position) in elements.iter().zip(positions) {
        let local = time_sec - element.entry_delay_sec;
        if local < 0.0 {
            continue;
        }
        let entry = entry_state(config.effect, config.layout, local, &element.text);
        let opacity = entry.alpha * exit_alpha;
        if opacity <= 0.0 {
            continue;
        }

        let font_px = style.font_px * element.font_scale;
        match config.layout {
            TitleLayout::VerticalRight => {
                emit_vertical_column(&mut ops, element, &entry, position, font_px, opacity, style);
            }
            TitleLayout::Centered | TitleLayout::Cinematic => {
                let mut op = element_op(element, position + entry.offset, font_px, opacity, style);
                op.scale = entry.scale;
                op.visible_chars = entry.visible_chars;
                ops.push(op);
            }
        }
    }
    ops
}

struct EntryState {
    alpha: f64,
    scale: f64,
    offset: kurbo::Vec2,
    visible_chars: Option<usize>,
}

fn entry_state(effect: TitleEffect, layout: TitleLayout, local_sec: f64, text: &str) -> EntryState {
    let linear = clamp01(local_sec / ENTRY_DURATION_SEC);
    let eased = Ease::OutCubic.apply(linear);

    let mut state = EntryState {
        alpha: eased,
        scale: 1.0,
        offset: kurbo::Vec2::ZERO,
        visible_chars: None,
    };

    match effect {
        TitleEffect::Fade => {}
        TitleEffect::FadeUp => {
            let slide = (1.0 - eased) * ENTRY_SLIDE_PX;
            // Vertical text cannot sensibly slide "up"; vertical-right columns
            // slide in from the right instead.
            state.offset = match layout {
                TitleLayout::VerticalRight => kurbo::Vec2::new(slide, 0.0),
                TitleLayout::Centered | TitleLayout::Cinematic => kurbo::Vec2::new(0.0, slide),
            };
        }
        TitleEffect::Typewriter => {
            state.alpha = 1.0;
            let len = text.chars().count();
            state.visible_chars = Some(((len as f64) * linear).floor() as usize);
        }
        TitleEffect::Scatter => {
            state.scale = SCATTER_ENTRY_SCALE - (SCATTER_ENTRY_SCALE - 1.0) * eased;
        }
    }
    state
}

/// Anchor position per element, recomputed from estimated extents each frame.
fn layout_positions(
    layout: TitleLayout,
    elements: &[TitleElement],
    style: &LyricStyle,
    canvas: Canvas,
) -> Vec<Point> {
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let anchor = Point::new(
        style.anchor.x.clamp(0.0, 1.0) * cw,
        style.anchor.y.clamp(0.0, 1.0) * ch,
    );

    match layout {
        TitleLayout::Centered => {
            // Stack vertically around the anchor using estimated block
            // heights.
            let gap = style.font_px * CENTERED_STACK_GAP_FRAC;
            let heights: Vec<f64> = elements
                .iter()
                .map(|e| estimate_line_height_px(style.font_px * e.font_scale))
                .collect();
            let total: f64 = heights.iter().sum::<f64>() + gap * (elements.len() - 1) as f64;

            let mut positions = Vec::with_capacity(elements.len());
            let mut y = anchor.y - total / 2.0;
            for h in heights {
                positions.push(Point::new(anchor.x, y + h / 2.0));
                y += h + gap;
            }
            positions
        }
        TitleLayout::VerticalRight => {
            // Columns stack right-to-left from the right margin.
            let mut positions = Vec::with_capacity(elements.len());
            let mut x = cw * (1.0 - VERTICAL_RIGHT_MARGIN_FRAC);
            let y = ch * VERTICAL_TOP_MARGIN_FRAC;
            for element in elements {
                positions.push(Point::new(x, y));
                x -= style.font_px * element.font_scale * VERTICAL_COLUMN_PITCH_FRAC;
            }
            positions
        }
        TitleLayout::Cinematic => {
            // Title/subtitle pinned near the anchor; everything credit-like
            // spaced along a bottom band by index.
            let band_y = ch * CINEMATIC_BAND_Y_FRAC;
            let band_count = elements
                .iter()
                .filter(|e| !matches!(e.role, TitleRole::Title | TitleRole::Subtitle))
                .count();

            let mut positions = Vec::with_capacity(elements.len());
            let mut band_index = 0usize;
            for element in elements {
                match element.role {
                    TitleRole::Title => positions.push(anchor),
                    TitleRole::Subtitle => positions.push(Point::new(
                        anchor.x,
                        anchor.y + estimate_line_height_px(style.font_px * 1.6),
                    )),
                    TitleRole::Artist | TitleRole::Credit => {
                        let x = cw * (band_index + 1) as f64 / (band_count + 1) as f64;
                        positions.push(Point::new(x, band_y));
                        band_index += 1;
                    }
                }
            }
            positions
        }
    }
}

fn emit_vertical_column(
    ops: &mut Vec<TextOp>,
    element: &TitleElement,
    entry: &EntryState,
    top: Point,
    font_px: f64,
    opacity: f64,
    style: &LyricStyle,
) {
    // One draw per character, top-to-bottom at fixed pitch.
    let pitch = font_px * VERTICAL_CHAR_PITCH_FRAC;
    let limit = entry.visible_chars.unwrap_or(usize::MAX);
    for (i, ch) in element.text.chars().enumerate() {
        if i >= limit {
            break;
        }
        let origin = Point::new(top.x, top.y + i as f64 * pitch) + entry.offset;
        let mut op = element_op(element, origin, font_px, opacity, style);
        op.text = ch.to_string();
        op.scale = entry.scale;
        ops.push(op);
    }
}

fn element_op(
    element: &TitleElement,
    origin: Point,
    font_px: f64,
    opacity: f64,
    style: &LyricStyle,
) -> TextOp {
    let rgba8 = match element.role {
        TitleRole::Title => style.active_rgba8,
        TitleRole::Subtitle | TitleRole::Artist | TitleRole::Credit => style.inactive_rgba8,
    };
    TextOp {
        text: element.text.clone(),
        role: element.role.text_role(),
        origin,
        font_px,
        rgba8,
        opacity,
        scale: 1.0,
        blur_px: 0.0,
        glow_px: style.glow_px,
        shadow: style.shadow,
        visible_chars: None,
        clip_width_frac: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas {
        width: 1280,
        height: 720,
    };

    fn full_config() -> TitleConfig {
        TitleConfig {
            enabled: true,
            layout: TitleLayout::Centered,
            effect: TitleEffect::Fade,
            duration_sec: 6.0,
            title: "Song".to_string(),
            subtitle: "A Ballad".to_string(),
            artist: "Band".to_string(),
            author: "Author".to_string(),
            composer: "Composer".to_string(),
            producer: "Producer".to_string(),
        }
    }

    #[test]
    fn elements_follow_field_order_and_stagger() {
        let elements = build_elements(&full_config());
        assert_eq!(elements.len(), 6);
        assert_eq!(elements[0].role, TitleRole::Title);
        assert_eq!(elements[1].role, TitleRole::Subtitle);
        assert_eq!(elements[2].role, TitleRole::Artist);
        assert_eq!(elements[3].role, TitleRole::Credit);

        let delays: Vec<f64> = elements.iter().map(|e| e.entry_delay_sec).collect();
        assert_eq!(delays, vec![0.0, 0.4, 0.8, 1.0, 1.2, 1.4]);
    }

    #[test]
    fn empty_fields_produce_no_elements() {
        let mut config = full_config();
        config.subtitle = String::new();
        config.composer = "   ".to_string();
        let elements = build_elements(&config);
        assert_eq!(elements.len(), 4);
        // Stagger re-bases on the remaining elements.
        assert_eq!(elements[1].entry_delay_sec, 0.4);
        assert_eq!(elements[1].role, TitleRole::Artist);
    }

    #[test]
    fn elements_not_yet_entered_are_not_drawn() {
        let config = full_config();
        let style = LyricStyle::default();
        let ops = plan_title(&config, &style, 0.5, CANVAS);
        // Only the title (delay 0) and subtitle (delay 0.4) have entered.
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].role, TextRole::Title);
        assert_eq!(ops[1].role, TextRole::Subtitle);
    }

    #[test]
    fn sequence_is_inactive_outside_its_duration() {
        let config = full_config();
        let style = LyricStyle::default();
        assert!(plan_title(&config, &style, 6.0, CANVAS).is_empty());
        assert!(plan_title(&config, &style, -1.0, CANVAS).is_empty());

        let mut disabled = full_config();
        disabled.enabled = false;
        assert!(plan_title(&disabled, &style, 1.0, CANVAS).is_empty());
    }

    #[test]
    fn global_exit_fade_multiplies_entry_alpha() {
        let mut config = full_config();
        config.subtitle = String::new();
        config.artist = String::new();
        config.author = String::new();
        config.composer = String::new();
        config.producer = String::new();
        let style = LyricStyle::default();

        // Long past the 1.0s entry, 0.4s before the end: alpha == 0.4.
        let ops = plan_title(&config, &style, 5.6, CANVAS);
        assert_eq!(ops.len(), 1);
        assert!((ops[0].opacity - 0.4).abs() < 1e-9);
    }

    #[test]
    fn centered_layout_stacks_elements_downward() {
        let config = full_config();
        let style = LyricStyle::default();
        let ops = plan_title(&config, &style, 5.0, CANVAS);
        assert_eq!(ops.len(), 6);
        for w in ops.windows(2) {
            assert!(w[0].origin.y < w[1].origin.y);
        }
    }

    #[test]
    fn vertical_right_emits_one_op_per_character() {
        let mut config = full_config();
        config.layout = TitleLayout::VerticalRight;
        config.subtitle = String::new();
        config.artist = String::new();
        config.author = String::new();
        config.composer = String::new();
        config.producer = String::new();
        let style = LyricStyle::default();

        let ops = plan_title(&config, &style, 2.0, CANVAS);
        assert_eq!(ops.len(), config.title.chars().count());
        // Characters descend at fixed pitch in one column.
        for w in ops.windows(2) {
            assert_eq!(w[0].origin.x, w[1].origin.x);
            assert!(w[0].origin.y < w[1].origin.y);
        }
    }

    #[test]
    fn vertical_columns_advance_right_to_left() {
        let mut config = full_config();
        config.layout = TitleLayout::VerticalRight;
        let style = LyricStyle::default();
        let ops = plan_title(&config, &style, 5.0, CANVAS);

        let title_x = ops
            .iter()
            .find(|o| o.role == TextRole::Title)
            .unwrap()
            .origin
            .x;
        let subtitle_x = ops
            .iter()
            .find(|o| o.role == TextRole::Subtitle)
            .unwrap()
            .origin
            .x;
        assert!(subtitle_x < title_x);
    }

    #[test]
    fn cinematic_pushes_credits_to_the_bottom_band() {
        let mut config = full_config();
        config.layout = TitleLayout::Cinematic;
        let style = LyricStyle::default();
        let ops = plan_title(&config, &style, 5.0, CANVAS);

        let band_y = 720.0 * CINEMATIC_BAND_Y_FRAC;
        let mut credit_xs = Vec::new();
        for op in &ops {
            match op.role {
                TextRole::Title | TextRole::Subtitle => assert!(op.origin.y < band_y),
                _ => {
                    assert_eq!(op.origin.y, band_y);
                    credit_xs.push(op.origin.x);
                }
            }
        }
        // Spaced by index, strictly increasing.
        assert_eq!(credit_xs.len(), 4);
        for w in credit_xs.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn typewriter_reveals_characters_without_fading() {
        let mut config = full_config();
        config.effect = TitleEffect::Typewriter;
        config.subtitle = String::new();
        config.artist = String::new();
        config.author = String::new();
        config.composer = String::new();
        config.producer = String::new();
        let style = LyricStyle::default();

        let ops = plan_title(&config, &style, 0.5, CANVAS);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].opacity, 1.0);
        assert_eq!(ops[0].visible_chars, Some(2)); // "Song" at half entry
    }

    #[test]
    fn fade_up_slides_horizontally_in_vertical_layout() {
        let mut config = full_config();
        config.effect = TitleEffect::FadeUp;
        config.layout = TitleLayout::VerticalRight;
        config.subtitle = String::new();
        config.artist = String::new();
        config.author = String::new();
        config.composer = String::new();
        config.producer = String::new();
        let style = LyricStyle::default();

        let early = plan_title(&config, &style, 0.1, CANVAS);
        let settled = plan_title(&config, &style, 2.0, CANVAS);
        assert!(early[0].origin.x > settled[0].origin.x);
        assert_eq!(early[0].origin.y, settled[0].origin.y);
    }
}
