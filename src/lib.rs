//! SnapBooth capture core.
//!
//! - `camera`: acquisition controller (tiered negotiation, health monitoring,
//!   safe-mode recovery)
//! - `rendering`: raster codec, chroma key, export sizing
//! - `template`: template geometry model and library
//! - `booth`: capture session facade and kiosk sequencer
//! - `config` / `logging` / `error`: ambient plumbing

pub mod booth;
pub mod camera;
pub mod config;
pub mod error;
pub mod logging;
pub mod rendering;
pub mod template;

pub use booth::{KioskSequencer, PhotoBooth, StillImage};
pub use camera::{
    AcquisitionController, MediaHost, MediaStream, RenderSink, SessionEvent, SessionHandle,
    SessionPreferences, SessionState,
};
pub use config::BoothConfig;
pub use error::{BoothError, BoothResult};
pub use logging::init_logging;
pub use template::{Frame, Template, TemplateLibrary};
