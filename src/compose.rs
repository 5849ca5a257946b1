//! Top-level frame composition: one synchronous pass from playback time and a
//! scene snapshot to a complete display list. Output depends only on the
//! arguments; nothing is carried across calls, so scrubbing, live playback
//! and fixed-rate capture all see identical frames.

use crate::{
    error::{VerseframeError, VerseframeResult},
    lyric, media,
    model::{MediaKind, Scene, TransitionEffect},
    plan::{BackgroundOp, DimOp, FramePlan},
    schedule::{self, ActiveSegments},
    title,
    transition::{self, JitterSource, LayerPlan, LayerSlot},
};

pub struct FrameComposer;

impl FrameComposer {
    /// Compose the display list for one frame at `time_sec`.
    #[tracing::instrument(skip(scene), level = "debug")]
    pub fn compose(scene: &Scene, time_sec: f64) -> VerseframeResult<FramePlan> {
        scene.validate()?;
        if !time_sec.is_finite() {
            return Err(VerseframeError::validation(
                "compose time must be finite seconds",
            ));
        }
        let t = time_sec.max(0.0);

        let mut plan = FramePlan {
            canvas: scene.canvas,
            time_sec: t,
            background: Vec::new(),
            dim: None,
            text: Vec::new(),
        };

        match schedule::resolve_active(&scene.backgrounds, t) {
            Some(active) => Self::compose_background(scene, t, &active, &mut plan),
            None => tracing::debug!("no background cycle; frame stays blank"),
        }

        let title_active = scene.title.enabled && t < scene.title.duration_sec;

        // The dim overlay belongs to whichever text layer is on screen.
        let overlay_opacity = if title_active {
            scene.title_style.overlay_opacity
        } else {
            scene.lyric_style.overlay_opacity
        };
        if overlay_opacity > 0.0 {
            plan.dim = Some(DimOp {
                opacity: overlay_opacity.clamp(0.0, 1.0),
            });
        }

        plan.text = if title_active {
            title::plan_title(&scene.title, &scene.title_style, t, scene.canvas)
        } else {
            lyric::plan_lyrics(&scene.lyrics, t, &scene.lyric_style, scene.canvas)
        };

        Ok(plan)
    }

    fn compose_background(scene: &Scene, t: f64, active: &ActiveSegments, plan: &mut FramePlan) {
        let config = scene.transition;
        let in_window = active.next.is_some()
            && config.effect != TransitionEffect::None
            && config.duration_sec > 0.0
            && active.time_remaining_sec <= config.duration_sec;

        let layers: Vec<LayerPlan> = if in_window {
            transition::plan_layers(
                config.effect,
                transition::progress(active.time_remaining_sec, config.duration_sec),
                JitterSource {
                    seed: scene.seed,
                    time_sec: t,
                },
            )
        } else {
            transition::plan_layers(
                TransitionEffect::None,
                0.0,
                JitterSource {
                    seed: scene.seed,
                    time_sec: t,
                },
            )
        };

        for layer in layers {
            let segment = match layer.slot {
                LayerSlot::Current => active.current,
                LayerSlot::Next => match active.next {
                    Some(next) => next,
                    None => continue,
                },
            };
            let Some(item) = scene.backgrounds.get(segment.item_index) else {
                continue;
            };
            if !item.surface.has_pixels() {
                tracing::trace!(item = %item.id, "surface not decoded yet; skipping layer");
                continue;
            }
            let Some(fit) = media::cover_fit(
                scene.canvas,
                item.surface.width,
                item.surface.height,
                layer.extra_scale,
            ) else {
                continue;
            };

            let source_time_sec = match item.kind {
                MediaKind::Image => 0.0,
                MediaKind::Video => match layer.slot {
                    LayerSlot::Current => media::current_video_time_sec(
                        active.loop_time_sec,
                        segment.start_sec,
                        item.surface.duration_sec,
                    ),
                    LayerSlot::Next => media::incoming_video_time_sec(
                        config.duration_sec,
                        active.time_remaining_sec,
                    ),
                },
            };

            plan.background.push(BackgroundOp {
                item_index: segment.item_index,
                kind: item.kind,
                source_time_sec,
                placement: kurbo::Affine::translate(layer.jitter) * fit,
                opacity: layer.opacity.clamp(0.0, 1.0),
                blend: layer.blend,
            });
        }
    }
}
