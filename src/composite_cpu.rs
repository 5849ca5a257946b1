//! Integer premultiplied-alpha pixel blending for the CPU backend.
//!
//! All buffers are tightly packed premultiplied RGBA8. Arithmetic stays in
//! u16/u32 with rounding div-by-255 so results are exact and platform
//! independent.

use crate::{
    error::{VerseframeError, VerseframeResult},
    transition::LayerBlend,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over with an extra layer opacity applied to `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Additive blend with an extra layer opacity applied to `src`. Channels
/// saturate instead of wrapping, which is what gives glitch layers their
/// blown-out look.
pub fn additive(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let sc = mul_div255(u16::from(src[i]), op);
        out[i] = add_sat_u8(dst[i], sc);
    }
    out
}

pub fn blend(dst: PremulRgba8, src: PremulRgba8, opacity: f64, mode: LayerBlend) -> PremulRgba8 {
    match mode {
        LayerBlend::Normal => over(dst, src, opacity),
        LayerBlend::Additive => additive(dst, src, opacity),
    }
}

/// Blend `src` over `dst` pixel-for-pixel.
pub fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f64,
    mode: LayerBlend,
) -> VerseframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(VerseframeError::evaluation(
            "blend_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity, mode);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite a solid premultiplied color over the whole buffer. Used for the
/// dim overlay between background and text.
pub fn fill_in_place(dst: &mut [u8], color: PremulRgba8, opacity: f64) -> VerseframeResult<()> {
    if !dst.len().is_multiple_of(4) {
        return Err(VerseframeError::evaluation(
            "fill_in_place expects an rgba8 buffer",
        ));
    }
    for d in dst.chunks_exact_mut(4) {
        let out = over([d[0], d[1], d[2], d[3]], color, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
