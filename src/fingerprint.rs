//! Stable fingerprints over frame plans. Two independently seeded FNV-1a 64
//! streams are fed the same field walk; a collision would need to defeat
//! both. Hosts use [`fingerprint_plan`] to skip redrawing unchanged frames
//! and [`fingerprint_background`] to assert the background loop repeats
//! exactly cycle after cycle.

use crate::{
    core::Fnv1a64,
    model::MediaKind,
    plan::{FramePlan, TextRole},
    transition::LayerBlend,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

const SEED_LO: u64 = 0x9ae1_6a3b_2f90_404f;

/// Fingerprint of the whole display list.
pub fn fingerprint_plan(plan: &FramePlan) -> FrameFingerprint {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(SEED_LO);

    write_backdrop(&mut a, &mut b, plan);

    write_u64_pair(&mut a, &mut b, plan.text.len() as u64);
    for op in &plan.text {
        write_str_pair(&mut a, &mut b, &op.text);
        write_u8_pair(&mut a, &mut b, text_role_tag(op.role));
        write_f64_pair(&mut a, &mut b, op.origin.x);
        write_f64_pair(&mut a, &mut b, op.origin.y);
        write_f64_pair(&mut a, &mut b, op.font_px);
        a.write_bytes(&op.rgba8);
        b.write_bytes(&op.rgba8);
        write_f64_pair(&mut a, &mut b, op.opacity);
        write_f64_pair(&mut a, &mut b, op.scale);
        write_f64_pair(&mut a, &mut b, op.blur_px);
        write_f64_pair(&mut a, &mut b, op.glow_px);
        write_u8_pair(&mut a, &mut b, u8::from(op.shadow));
        match op.visible_chars {
            Some(n) => {
                write_u8_pair(&mut a, &mut b, 1);
                write_u64_pair(&mut a, &mut b, n as u64);
            }
            None => write_u8_pair(&mut a, &mut b, 0),
        }
        match op.clip_width_frac {
            Some(f) => {
                write_u8_pair(&mut a, &mut b, 1);
                write_f64_pair(&mut a, &mut b, f);
            }
            None => write_u8_pair(&mut a, &mut b, 0),
        }
    }

    FrameFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

/// Fingerprint of the background layers and dim overlay only. Identical at
/// `t` and `t + k * cycle` whenever every background surface is decoded,
/// which is the looping property tests pin down.
pub fn fingerprint_background(plan: &FramePlan) -> FrameFingerprint {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(SEED_LO);
    write_backdrop(&mut a, &mut b, plan);
    FrameFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

fn write_backdrop(a: &mut Fnv1a64, b: &mut Fnv1a64, plan: &FramePlan) {
    write_u64_pair(a, b, u64::from(plan.canvas.width));
    write_u64_pair(a, b, u64::from(plan.canvas.height));

    write_u64_pair(a, b, plan.background.len() as u64);
    for op in &plan.background {
        write_u64_pair(a, b, op.item_index as u64);
        write_u8_pair(
            a,
            b,
            match op.kind {
                MediaKind::Image => 0,
                MediaKind::Video => 1,
            },
        );
        write_f64_pair(a, b, op.source_time_sec);
        for c in op.placement.as_coeffs() {
            write_f64_pair(a, b, c);
        }
        write_f64_pair(a, b, op.opacity);
        write_u8_pair(
            a,
            b,
            match op.blend {
                LayerBlend::Normal => 0,
                LayerBlend::Additive => 1,
            },
        );
    }

    match &plan.dim {
        Some(dim) => {
            write_u8_pair(a, b, 1);
            write_f64_pair(a, b, dim.opacity);
        }
        None => write_u8_pair(a, b, 0),
    }
}

fn text_role_tag(role: TextRole) -> u8 {
    match role {
        TextRole::LyricActive => 0,
        TextRole::LyricPrev => 1,
        TextRole::LyricNext => 2,
        TextRole::LyricIntro => 3,
        TextRole::Title => 4,
        TextRole::Subtitle => 5,
        TextRole::Artist => 6,
        TextRole::Credit => 7,
    }
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_f64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: f64) {
    write_u64_pair(a, b, v.to_bits());
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}
