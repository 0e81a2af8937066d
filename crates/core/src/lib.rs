//! Core library for the gesture-driven effects engine.
//!
//! Hand landmarks from an external tracker come in one frame at a time. The
//! crate classifies each hand into a gesture, interprets gestures over time
//! (circle drawing, two-hand pulls, punches) and drives bounded pools of
//! transient particles plus the longer-lived portal and shield effects. A
//! renderer only ever sees a read-only [`FrameSnapshot`] of a finished tick.

pub mod circle;
pub mod config;
pub mod effects;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interaction;
pub mod landmarks;
pub mod render;
pub mod simulation;
pub mod timeline;

pub use circle::{detect_circle, DetectedCircle, Trail};
pub use config::{AppConfig, EffectConfig, PoolConfig, TimingConfig, ViewportConfig};
pub use effects::{Portal, PortalSet, Shield, Shields};
pub use entities::{EntityKind, EntityPool, EntityPools, Transient, TransientEntity};
pub use error::{GestureFxError, Result};
pub use geometry::Vec2;
pub use gesture::{Gesture, HandDescriptor, Hands};
pub use interaction::{ExplosionCause, InteractionStateMachine, PullState, SimEvent};
pub use landmarks::{HandLandmarks, HandPose, HandSide, LandmarkFrame};
pub use render::{DrawPrimitive, FrameSnapshot, RenderStats, Renderer};
pub use simulation::{LiveCounts, Simulation, TickReport, World};
pub use timeline::{FrameClock, ScreenEffects};
