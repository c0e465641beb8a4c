use nalgebra::Point3;

use super::{resolve_slider, FRONT_VIEW_COLOR, LINE_COLOR, POINT_COLOR, PROJECTOR_COLOR, TOP_VIEW_COLOR};
use crate::error::TopicError;
use crate::geometry::{Geometry, Material, SceneObject};
use crate::projection::{fmt_point, LineProjection};
use crate::topic::{Topic, TopicContext};
use crate::ui::{Panel, SliderSpec};

/// A segment given by its start point, true length and its inclinations
/// to the HP (`theta`) and the VP (`phi`), in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTopic {
    pub x1: f32,
    pub y1: f32,
    pub z1: f32,
    pub length: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Default for LineTopic {
    fn default() -> Self {
        Self {
            x1: 2.0,
            y1: 2.0,
            z1: 1.0,
            length: 6.0,
            theta: 30.0,
            phi: 45.0,
        }
    }
}

impl LineTopic {
    pub fn sliders(&self) -> [SliderSpec; 6] {
        [
            SliderSpec::new("line-x1", "Start X", -10.0, 10.0, self.x1, 0.5),
            SliderSpec::new("line-y1", "Start Y (height)", -10.0, 10.0, self.y1, 0.5),
            SliderSpec::new("line-z1", "Start Z (depth)", -10.0, 10.0, self.z1, 0.5),
            SliderSpec::new("line-length", "True length", 0.0, 15.0, self.length, 0.5),
            SliderSpec::new("line-theta", "θ with HP (°)", 0.0, 90.0, self.theta, 1.0),
            SliderSpec::new("line-phi", "φ with VP (°)", 0.0, 90.0, self.phi, 1.0),
        ]
    }

    pub fn projection(&self) -> LineProjection {
        LineProjection::from_start(Point3::new(self.x1, self.y1, self.z1), self.length, self.theta, self.phi)
    }

    fn update_visualization(&self, ctx: &mut TopicContext<'_>) {
        let line = self.projection();

        ctx.scene.clear_simulation();
        ctx.scene.add_object(SceneObject::new(
            Geometry::segment(line.start, line.end),
            Material::new(LINE_COLOR),
        ));
        ctx.scene.add_object(SceneObject::new(
            Geometry::segment(line.front[0], line.front[1]),
            Material::new(FRONT_VIEW_COLOR),
        ));
        ctx.scene.add_object(SceneObject::new(
            Geometry::segment(line.top[0], line.top[1]),
            Material::new(TOP_VIEW_COLOR),
        ));
        ctx.scene.add_object(SceneObject::new(
            Geometry::dashed(vec![
                [line.start, line.front[0]],
                [line.start, line.top[0]],
                [line.end, line.front[1]],
                [line.end, line.top[1]],
            ]),
            Material::new(PROJECTOR_COLOR),
        ));
        ctx.scene.add_object(SceneObject::marker(line.start, POINT_COLOR));
        ctx.scene.add_object(SceneObject::marker(line.end, LINE_COLOR));

        ctx.ui.set_info(&self.info_panel(&line));
    }

    fn info_panel(&self, line: &LineProjection) -> Panel {
        Panel::new("Line projection")
            .readout("Start", fmt_point(&line.start))
            .readout("End", fmt_point(&line.end))
            .readout("Length (input)", format!("{:.2}", self.length))
            .readout("Actual length", format!("{:.2}", line.true_length()))
            .readout("Front view length", format!("{:.2}", line.front_view_length()))
            .readout("Top view length", format!("{:.2}", line.top_view_length()))
            .readout("α (front view to XY)", format!("{:.1}°", line.front_view_inclination()))
            .readout("β (top view to XY)", format!("{:.1}°", line.top_view_inclination()))
            .paragraph("A view is shorter than the true length unless the line is parallel to that plane.")
    }
}

impl Topic for LineTopic {
    fn id(&self) -> &'static str {
        "lines"
    }

    fn name(&self) -> &'static str {
        "Lines"
    }

    fn load(&mut self, ctx: &mut TopicContext<'_>) {
        let controls = self.sliders().into_iter().fold(
            Panel::new("Line placement").paragraph("Set the start point, the true length and both inclinations."),
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
        let field = match index {
            0 => &mut self.x1,
            1 => &mut self.y1,
            2 => &mut self.z1,
            3 => &mut self.length,
            4 => &mut self.theta,
            _ => &mut self.phi,
        };
        *field = value;
        self.update_visualization(ctx);
        Ok(())
    }
}
