use nalgebra::Point3;

use super::{resolve_slider, FRONT_VIEW_COLOR, POINT_COLOR, PROJECTOR_COLOR, TOP_VIEW_COLOR};
use crate::error::TopicError;
use crate::geometry::{Geometry, Material, SceneObject};
use crate::projection::{fmt_point, PointLocation, PointProjection};
use crate::topic::{Topic, TopicContext};
use crate::ui::{Panel, SliderSpec};

/// A single point, its two views and its quadrant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTopic {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for PointTopic {
    fn default() -> Self {
        Self { x: 3.0, y: 4.0, z: 5.0 }
    }
}

impl PointTopic {
    pub fn sliders(&self) -> [SliderSpec; 3] {
        [
            SliderSpec::new("point-x", "X (along XY line)", -10.0, 10.0, self.x, 0.5),
            SliderSpec::new("point-y", "Y (height)", -10.0, 10.0, self.y, 0.5),
            SliderSpec::new("point-z", "Z (depth)", -10.0, 10.0, self.z, 0.5),
        ]
    }

    pub fn projection(&self) -> PointProjection {
        PointProjection::of(Point3::new(self.x, self.y, self.z))
    }

    fn update_visualization(&self, ctx: &mut TopicContext<'_>) {
        let proj = self.projection();

        ctx.scene.clear_simulation();
        ctx.scene.add_object(SceneObject::marker(proj.point, POINT_COLOR));
        ctx.scene.add_object(SceneObject::marker(proj.front, FRONT_VIEW_COLOR));
        ctx.scene.add_object(SceneObject::marker(proj.top, TOP_VIEW_COLOR));
        ctx.scene.add_object(SceneObject::new(
            Geometry::dashed(vec![
                [proj.point, proj.front],
                [proj.point, proj.top],
                [proj.front, proj.foot],
                [proj.top, proj.foot],
            ]),
            Material::new(PROJECTOR_COLOR),
        ));

        ctx.ui.set_info(&info_panel(&proj));
    }
}

fn info_panel(proj: &PointProjection) -> Panel {
    let side_of_hp = if proj.point.y >= 0.0 { "above" } else { "below" };
    let side_of_vp = if proj.point.z >= 0.0 { "in front of" } else { "behind" };
    let panel = Panel::new("Point projection")
        .readout("Point", fmt_point(&proj.point))
        .readout("Front view", fmt_point(&proj.front))
        .readout("Top view", fmt_point(&proj.top))
        .readout("Quadrant", proj.location.to_string())
        .readout("Distance from HP", format!("{:.2} ({side_of_hp})", proj.height_above_hp()))
        .readout("Distance from VP", format!("{:.2} ({side_of_vp})", proj.distance_from_vp()))
        .readout("Projector foot", fmt_point(&proj.foot));

    match proj.location {
        PointLocation::Quadrant(_) => panel,
        PointLocation::InHp => panel.notice("The point lies in the HP: its front view is on the XY line."),
        PointLocation::InVp => panel.notice("The point lies in the VP: its top view is on the XY line."),
        PointLocation::OnXyLine => panel.notice("The point is on the XY line: both views coincide with it."),
    }
}

impl Topic for PointTopic {
    fn id(&self) -> &'static str {
        "points"
    }

    fn name(&self) -> &'static str {
        "Points"
    }

    fn load(&mut self, ctx: &mut TopicContext<'_>) {
        let controls = self
            .sliders()
            .into_iter()
            .fold(
                Panel::new("Point position").paragraph("Move the point and watch its front and top views."),
                Panel::slider,
            );
        ctx.ui.set_controls(&controls);
        self.update_visualization(ctx);
    }

    fn cleanup(&mut self, ctx: &mut TopicContext<'_>) {
        ctx.scene.clear_simulation();
    }

    fn set_parameter(&mut self, ctx: &mut TopicContext<'_>, param: &str, value: f32) -> Result<(), TopicError> {
        let (index, value) = resolve_slider(self.id(), &self.sliders(), param, value)?;
        match index {
            0 => self.x = value,
            1 => self.y = value,
            _ => self.z = value,
        }
        self.update_visualization(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let proj = PointTopic::default().projection();
        assert_eq!(proj.front, Point3::new(3.0, 4.0, 0.0));
        assert_eq!(proj.top, Point3::new(3.0, 0.0, 5.0));
    }

    #[test]
    fn test_info_panel_reports_side() {
        let topic = PointTopic { x: 1.0, y: -2.0, z: -3.0 };
        let panel = info_panel(&topic.projection());
        assert_eq!(panel.readout_value("Quadrant"), Some("3rd Quadrant"));
        assert_eq!(panel.readout_value("Distance from HP"), Some("2.00 (below)"));
        assert_eq!(panel.readout_value("Distance from VP"), Some("3.00 (behind)"));
    }

    #[test]
    fn test_info_panel_notice_on_plane() {
        let topic = PointTopic { x: 1.0, y: 0.0, z: 2.0 };
        let panel = info_panel(&topic.projection());
        assert_eq!(panel.readout_value("Quadrant"), Some("In HP"));
        assert!(panel.to_text_lines().iter().any(|line| line.starts_with("! ")));
    }
}
