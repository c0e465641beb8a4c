//! The lessons shipped with the viewer.

mod line;
mod plane;
mod point;
mod welcome;

pub use line::LineTopic;
pub use plane::PlaneTopic;
pub use point::PointTopic;
pub use welcome::WelcomeTopic;

use crate::error::TopicError;
use crate::geometry::Color;
use crate::topic::Topic;
use crate::ui::SliderSpec;

pub const POINT_COLOR: Color = Color::hex(0xff5722);
pub const LINE_COLOR: Color = Color::hex(0xffeb3b);
pub const PLANE_COLOR: Color = Color::hex(0x9c27b0);
/// Projections onto the VP
pub const FRONT_VIEW_COLOR: Color = Color::hex(0x03a9f4);
/// Projections onto the HP
pub const TOP_VIEW_COLOR: Color = Color::hex(0x8bc34a);
pub const PROJECTOR_COLOR: Color = Color::hex(0xaaaaaa);

/// Every topic in navigation order.
pub fn default_topics() -> Vec<Box<dyn Topic>> {
    vec![
        Box::new(WelcomeTopic),
        Box::new(PointTopic::default()),
        Box::new(LineTopic::default()),
        Box::new(PlaneTopic::default()),
    ]
}

/// Find the slider bound to `param` and bring `value` into its domain.
fn resolve_slider(
    topic: &'static str,
    sliders: &[SliderSpec],
    param: &str,
    value: f32,
) -> Result<(usize, f32), TopicError> {
    sliders
        .iter()
        .position(|spec| spec.id == param)
        .map(|index| (index, sliders[index].normalize(value)))
        .ok_or_else(|| TopicError::UnknownParameter {
            topic: topic.to_string(),
            param: param.to_string(),
        })
}
