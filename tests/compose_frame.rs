//! End-to-end frame composition: scene in, display list out, pixels out.

use kurbo::Point;
use verseframe::{
    fingerprint_background, BackgroundItem, Canvas, CpuCompositor, FrameComposer, LrcLine,
    LyricStyle, MediaKind, Scene, SurfaceFrame, SurfaceSource, SurfaceState, TextRole,
    TitleConfig, TitleEffect, TransitionConfig, TransitionEffect,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct SolidSource {
    width: u32,
    height: u32,
    frames: Vec<Vec<u8>>,
}

impl SolidSource {
    fn new(colors: &[[u8; 4]]) -> Self {
        let (width, height) = (16, 9);
        let frames = colors
            .iter()
            .map(|c| c.repeat((width * height) as usize))
            .collect();
        Self {
            width,
            height,
            frames,
        }
    }
}

impl SurfaceSource for SolidSource {
    fn frame_at(&self, item_index: usize, _source_time_sec: f64) -> Option<SurfaceFrame<'_>> {
        let data = self.frames.get(item_index)?;
        Some(SurfaceFrame {
            width: self.width,
            height: self.height,
            data,
        })
    }
}

fn image(id: &str, dur: f64) -> BackgroundItem {
    BackgroundItem {
        id: id.to_string(),
        kind: MediaKind::Image,
        user_duration_sec: dur,
        surface: SurfaceState {
            ready: true,
            width: 16,
            height: 9,
            duration_sec: None,
        },
    }
}

fn two_image_scene(effect: TransitionEffect) -> Scene {
    Scene {
        canvas: Canvas {
            width: 32,
            height: 18,
        },
        backgrounds: vec![image("a", 5.0), image("b", 5.0)],
        transition: TransitionConfig {
            effect,
            duration_sec: 1.5,
        },
        lyrics: vec![],
        lyric_style: LyricStyle {
            overlay_opacity: 0.0,
            ..LyricStyle::default()
        },
        title: TitleConfig::default(),
        title_style: LyricStyle::default(),
        seed: 11,
    }
}

#[test]
fn crossfade_pixels_blend_through_the_window() {
    init_tracing();
    let scene = two_image_scene(TransitionEffect::Crossfade);
    let source = SolidSource::new(&[[255, 0, 0, 255], [0, 0, 255, 255]]);
    let compositor = CpuCompositor::default();

    // Window opens at t = 8.5: imgB current, imgA barely mixed in.
    let open = compositor
        .render(&FrameComposer::compose(&scene, 8.5).unwrap(), &source)
        .unwrap();
    let p = open.pixel(16, 9);
    assert_eq!(p[2], 255);
    assert_eq!(p[0], 0);

    // Mid-window the frame carries both colors.
    let mid = compositor
        .render(&FrameComposer::compose(&scene, 9.25).unwrap(), &source)
        .unwrap();
    let p = mid.pixel(16, 9);
    assert!(p[0] > 60, "red mixed in: {p:?}");
    assert!(p[2] > 60, "blue remains: {p:?}");
}

#[test]
fn flash_black_midpoint_renders_black() {
    init_tracing();
    let scene = two_image_scene(TransitionEffect::FlashBlack);
    let source = SolidSource::new(&[[255, 0, 0, 255], [0, 0, 255, 255]]);

    // progress 0.5 at t = 9.25 (0.75s remaining of a 1.5s window).
    let frame = CpuCompositor::default()
        .render(&FrameComposer::compose(&scene, 9.25).unwrap(), &source)
        .unwrap();
    assert_eq!(frame.pixel(16, 9), [0, 0, 0, 255]);
}

#[test]
fn glitch_plans_repeat_per_seed() {
    init_tracing();
    let scene = two_image_scene(TransitionEffect::GlitchShake);
    let t = 9.25;

    let p1 = FrameComposer::compose(&scene, t).unwrap();
    let p2 = FrameComposer::compose(&scene, t).unwrap();
    assert_eq!(p1.background, p2.background);

    let mut reseeded = two_image_scene(TransitionEffect::GlitchShake);
    reseeded.seed = 99;
    let p3 = FrameComposer::compose(&reseeded, t).unwrap();
    assert_ne!(
        p1.background[0].placement.as_coeffs(),
        p3.background[0].placement.as_coeffs()
    );
}

#[test]
fn background_repeats_exactly_across_cycles() {
    init_tracing();
    let scene = two_image_scene(TransitionEffect::Crossfade);
    for t in [0.0, 4.5, 8.5, 9.99] {
        let a = FrameComposer::compose(&scene, t).unwrap();
        let b = FrameComposer::compose(&scene, t + 10.0).unwrap();
        assert_eq!(fingerprint_background(&a), fingerprint_background(&b));
    }
}

#[test]
fn lyric_intro_shows_until_the_first_line() {
    init_tracing();
    let mut scene = two_image_scene(TransitionEffect::None);
    scene.lyrics = vec![
        LrcLine {
            time_sec: 10.0,
            text: "first words".to_string(),
        },
        LrcLine {
            time_sec: 14.0,
            text: "second words".to_string(),
        },
    ];

    let before = FrameComposer::compose(&scene, 9.0).unwrap();
    assert!(before.text.iter().any(|o| o.role == TextRole::LyricIntro));
    assert!(before
        .text
        .iter()
        .any(|o| o.role == TextRole::LyricNext && o.text == "first words"));
    assert!(before.text.iter().all(|o| o.role != TextRole::LyricActive));

    let during = FrameComposer::compose(&scene, 10.5).unwrap();
    let active = during
        .text
        .iter()
        .find(|o| o.role == TextRole::LyricActive)
        .unwrap();
    assert_eq!(active.text, "first words");

    // The last line never expires.
    let long_after = FrameComposer::compose(&scene, 500.0).unwrap();
    let active = long_after
        .text
        .iter()
        .find(|o| o.role == TextRole::LyricActive)
        .unwrap();
    assert_eq!(active.text, "second words");
}

#[test]
fn title_sequence_fades_out_then_yields_to_lyrics() {
    init_tracing();
    let mut scene = two_image_scene(TransitionEffect::None);
    scene.lyrics = vec![LrcLine {
        time_sec: 0.0,
        text: "verse".to_string(),
    }];
    scene.title = TitleConfig {
        enabled: true,
        effect: TitleEffect::Fade,
        duration_sec: 6.0,
        title: "Song Title".to_string(),
        artist: "Artist".to_string(),
        ..TitleConfig::default()
    };

    let fading = FrameComposer::compose(&scene, 5.6).unwrap();
    let title = fading
        .text
        .iter()
        .find(|o| o.role == TextRole::Title)
        .unwrap();
    assert!((title.opacity - 0.4).abs() < 1e-6);

    let after = FrameComposer::compose(&scene, 6.0).unwrap();
    assert!(after.text.iter().all(|o| o.role != TextRole::Title));
    assert!(after.text.iter().any(|o| o.role == TextRole::LyricActive));
}

#[test]
fn dim_overlay_sits_between_background_and_text() {
    init_tracing();
    let mut scene = two_image_scene(TransitionEffect::None);
    scene.lyric_style = LyricStyle {
        overlay_opacity: 0.4,
        anchor: Point::new(0.5, 0.5),
        ..LyricStyle::default()
    };
    let plan = FrameComposer::compose(&scene, 1.0).unwrap();
    assert!((plan.dim.unwrap().opacity - 0.4).abs() < 1e-12);

    let source = SolidSource::new(&[[255, 255, 255, 255], [0, 0, 255, 255]]);
    let frame = CpuCompositor::default().render(&plan, &source).unwrap();
    let p = frame.pixel(16, 9);
    assert!(p[0] < 255 && p[0] > 100, "dimmed white: {p:?}");
}
