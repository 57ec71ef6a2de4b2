//! FrameFit Render Engine
//!
//! Composites source media into device bezel frames, either as a
//! one-shot still image or as a full video re-encode with the bezel
//! burned into every frame.
//!
//! # Pipeline Architecture
//!
//! ```text
//! screenshot.png ──┐
//!                  ├── Center on screen cutout
//! screen region ───┘            │
//!                               ├── Clip to screen mask
//! screen mask ──────────────────┘            │
//!                                            ├── Bezel overlay
//! bezel.png ─────────────────────────────────┘        │
//!                                                     ▼
//!                                             Optional resize
//!                                                     │
//!                                                     ▼
//!                                                output.png
//! ```
//!
//! The video path keeps the same layering but runs through ffmpeg so
//! the source audio survives and every frame is processed at encode
//! speed rather than per-frame in process memory.

pub mod debounce;
pub mod export;
pub mod still;
pub mod video;

pub use debounce::Debouncer;
pub use export::*;
