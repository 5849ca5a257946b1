#![forbid(unsafe_code)]

pub mod compose;
pub mod composite_cpu;
pub mod core;
pub mod ease;
pub mod error;
pub mod fingerprint;
pub mod lyric;
pub mod media;
pub mod model;
pub mod plan;
pub mod render_cpu;
pub mod schedule;
pub mod title;
pub mod transition;

pub use compose::FrameComposer;
pub use core::{Canvas, Rgba8Premul};
pub use ease::Ease;
pub use error::{VerseframeError, VerseframeResult};
pub use fingerprint::{FrameFingerprint, fingerprint_background, fingerprint_plan};
pub use model::{
    BackgroundItem, LrcLine, LyricEffect, LyricStyle, MediaKind, Scene, SurfaceState, TitleConfig,
    TitleEffect, TitleLayout, TransitionConfig, TransitionEffect,
};
pub use plan::{BackgroundOp, DimOp, FramePlan, TextOp, TextRole};
pub use render_cpu::{CpuCompositor, FrameRgba, SurfaceFrame, SurfaceSource};
