//! ortho3d core library - projection geometry and application logic
//!
//! This library holds everything that does not depend on a host: the
//! descriptive-geometry math, the scene and topic lifecycles, and the
//! render/UI ports the terminal and web front ends implement.

pub mod app;
pub mod backend;
pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod projection;
pub mod scene;
pub mod topic;
pub mod topics;
pub mod transform;
pub mod ui;

// Re-export commonly used types
pub use app::Application;
pub use backend::{GeometryId, MaterialId, RenderBackend, RenderFrame};
pub use camera::{Camera, Viewport};
pub use config::ViewerConfig;
pub use error::{BackendError, ConfigError, SceneError, TopicError};
pub use geometry::{Color, Geometry, Label, Material, Mesh, SceneObject, Triangle, Vertex};
pub use projection::{LineProjection, PlaneFigure, PointLocation, PointProjection, Quadrant, ReferencePlane, Trace};
pub use scene::{SceneManager, SceneSink};
pub use topic::{Topic, TopicChanged, TopicContext, TopicController};
pub use transform::RotationState;
pub use ui::{Panel, SliderSpec, TopicButton, UiSurface};
