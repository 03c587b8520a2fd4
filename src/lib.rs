//! Lastseen Timeline - staleness timeline engine for last-seen presence logs
//!
//! The engine turns an irregular change log of `(captured_at, last_seen_at)`
//! pairs into a render-ready timeline through a deterministic pipeline:
//! normalization → fixed-step resampling → jitter/hysteresis stabilization →
//! windowing → axis scaling → bucket banding, with entrance detection and
//! headline KPIs computed from the raw log alongside.
//!
//! ## Modules
//!
//! - **Pipeline stages**: [`normalizer`], [`resampler`], [`stabilizer`],
//!   [`window`], [`scaler`], [`bander`], [`entrance`], [`summary`]
//! - **Orchestration**: [`pipeline`] (pure frame computation, stateless entry
//!   point, interactive session with last-snapshot-wins)
//! - **Boundaries**: [`schema`] (input records), [`encoder`] (output payload),
//!   [`ffi`] (C ABI)

pub mod bander;
pub mod config;
pub mod encoder;
pub mod entrance;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod resampler;
pub mod scaler;
pub mod schema;
pub mod stabilizer;
pub mod summary;
pub mod types;
pub mod window;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::TimelineConfig;
pub use encoder::FrameEncoder;
pub use error::ComputeError;
pub use pipeline::{lastseen_to_timeline, Snapshot, TimelinePipeline, TimelineSession};
pub use types::{Bucket, MaskStrategy, Observation, TimeRange, TimelineFrame, WindowWidth};
pub use window::Windower;

// Schema exports
pub use schema::{RawObservation, RawObservationAdapter, SCHEMA_VERSION};

/// Version embedded in all timeline payloads
pub const TIMELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for timeline payloads
pub const PRODUCER_NAME: &str = "lastseen-timeline";
