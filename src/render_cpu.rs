//! Reference CPU backend: executes a [`FramePlan`] into a premultiplied RGBA8
//! buffer. Decoded pixels come from a [`SurfaceSource`] the host provides;
//! sampling is nearest-neighbor through the inverse placement transform, so
//! frames are bit-exact across runs and platforms. Real deployments draw the
//! same plan with a hardware canvas; this backend exists for tests and
//! headless capture.

use kurbo::{Point, Rect};

use crate::{
    composite_cpu::{self, PremulRgba8},
    core::{Canvas, Rgba8Premul},
    error::{VerseframeError, VerseframeResult},
    plan::{estimate_line_height_px, FramePlan, TextOp},
};

/// One finished frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    /// Tightly packed premultiplied RGBA8, row major.
    pub data: Vec<u8>,
}

impl FrameRgba {
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}

/// Borrowed view of one decoded media frame, premultiplied RGBA8.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// Host-side decoder boundary. `None` means "no pixels for that item at that
/// time yet"; the backend leaves the layer out, same as the planner does for
/// pending surfaces.
pub trait SurfaceSource {
    fn frame_at(&self, item_index: usize, source_time_sec: f64) -> Option<SurfaceFrame<'_>>;
}

pub struct CpuCompositor {
    pub clear: Rgba8Premul,
    /// Draw estimated text extents as solid boxes. Glyph rasterization lives
    /// in the host; boxes make text placement testable here.
    pub draw_text_extents: bool,
}

impl Default for CpuCompositor {
    fn default() -> Self {
        Self {
            clear: Rgba8Premul::BLACK,
            draw_text_extents: false,
        }
    }
}

impl CpuCompositor {
    #[tracing::instrument(skip_all, fields(w = plan.canvas.width, h = plan.canvas.height, t = plan.time_sec))]
    pub fn render(
        &self,
        plan: &FramePlan,
        source: &dyn SurfaceSource,
    ) -> VerseframeResult<FrameRgba> {
        let canvas = plan.canvas;
        let len = (canvas.width as usize)
            .checked_mul(canvas.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| VerseframeError::evaluation("frame buffer size overflow"))?;

        let mut data = Vec::with_capacity(len);
        let clear = self.clear.to_array();
        for _ in 0..len / 4 {
            data.extend_from_slice(&clear);
        }

        for op in &plan.background {
            let Some(frame) = source.frame_at(op.item_index, op.source_time_sec) else {
                tracing::trace!(item = op.item_index, "no decoded frame; layer dropped");
                continue;
            };
            self.draw_surface(&mut data, canvas, op, frame)?;
        }

        if let Some(dim) = &plan.dim {
            composite_cpu::fill_in_place(&mut data, [0, 0, 0, 255], dim.opacity)?;
        }

        if self.draw_text_extents {
            for op in &plan.text {
                draw_text_box(&mut data, canvas, op);
            }
        }

        Ok(FrameRgba {
            width: canvas.width,
            height: canvas.height,
            data,
        })
    }

    fn draw_surface(
        &self,
        data: &mut [u8],
        canvas: Canvas,
        op: &crate::plan::BackgroundOp,
        frame: SurfaceFrame<'_>,
    ) -> VerseframeResult<()> {
        let expected = (frame.width as usize)
            .checked_mul(frame.height as usize)
            .and_then(|v| v.checked_mul(4));
        if expected != Some(frame.data.len()) {
            return Err(VerseframeError::evaluation(
                "surface frame buffer does not match width*height*4",
            ));
        }
        if frame.width == 0 || frame.height == 0 || op.opacity <= 0.0 {
            return Ok(());
        }
        if op.placement.determinant().abs() < 1e-12 {
            return Ok(());
        }
        let inverse = op.placement.inverse();

        // Only walk the canvas pixels the transformed media rect can touch.
        let media_rect = Rect::new(0.0, 0.0, f64::from(frame.width), f64::from(frame.height));
        let bounds = op.placement.transform_rect_bbox(media_rect);
        let x0 = bounds.x0.floor().max(0.0) as u32;
        let y0 = bounds.y0.floor().max(0.0) as u32;
        let x1 = (bounds.x1.ceil().min(f64::from(canvas.width))).max(0.0) as u32;
        let y1 = (bounds.y1.ceil().min(f64::from(canvas.height))).max(0.0) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let src_pt = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if src_pt.x < 0.0 || src_pt.y < 0.0 {
                    continue;
                }
                let (sx, sy) = (src_pt.x as u32, src_pt.y as u32);
                if sx >= frame.width || sy >= frame.height {
                    continue;
                }
                let sidx = ((sy as usize) * (frame.width as usize) + (sx as usize)) * 4;
                let src = [
                    frame.data[sidx],
                    frame.data[sidx + 1],
                    frame.data[sidx + 2],
                    frame.data[sidx + 3],
                ];

                let didx = ((y as usize) * (canvas.width as usize) + (x as usize)) * 4;
                let dst = [data[didx], data[didx + 1], data[didx + 2], data[didx + 3]];
                let out = composite_cpu::blend(dst, src, op.opacity, op.blend);
                data[didx..didx + 4].copy_from_slice(&out);
            }
        }
        Ok(())
    }
}

fn draw_text_box(data: &mut [u8], canvas: Canvas, op: &TextOp) {
    if op.opacity <= 0.0 {
        return;
    }
    let w = op.estimated_width_px();
    let h = estimate_line_height_px(op.font_px) * op.scale;
    if w <= 0.0 || h <= 0.0 {
        return;
    }

    let x0 = (op.origin.x - w / 2.0).floor().max(0.0) as u32;
    let y0 = (op.origin.y - h / 2.0).floor().max(0.0) as u32;
    let x1 = ((op.origin.x + w / 2.0).ceil().min(f64::from(canvas.width))).max(0.0) as u32;
    let y1 = ((op.origin.y + h / 2.0).ceil().min(f64::from(canvas.height))).max(0.0) as u32;

    let color = Rgba8Premul::from_straight_rgba(op.rgba8).to_array();
    for y in y0..y1 {
        for x in x0..x1 {
            let idx = ((y as usize) * (canvas.width as usize) + (x as usize)) * 4;
            let dst = [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]];
            let out = composite_cpu::over(dst, color, op.opacity);
            data[idx..idx + 4].copy_from_slice(&out);
        }
    }
}
