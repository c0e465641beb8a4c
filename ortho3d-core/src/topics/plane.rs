use super::{resolve_slider, FRONT_VIEW_COLOR, PLANE_COLOR, POINT_COLOR, TOP_VIEW_COLOR};
use crate::error::TopicError;
use crate::geometry::{Color, Geometry, Material, Mesh, SceneObject};
use crate::projection::{PlaneFigure, ReferencePlane, Trace};
use crate::topic::{Topic, TopicContext};
use crate::transform::RotationState;
use crate::ui::{Panel, SliderSpec};

/// A square lamina rotated about X, then Y, then Z (degrees), with its
/// traces on the reference planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneTopic {
    pub size: f32,
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
}

impl Default for PlaneTopic {
    fn default() -> Self {
        Self {
            size: 5.0,
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 0.0,
        }
    }
}

impl PlaneTopic {
    pub fn sliders(&self) -> [SliderSpec; 4] {
        [
            SliderSpec::new("plane-size", "Size", 0.0, 12.0, self.size, 0.5),
            SliderSpec::new("plane-rot-x", "Rotation X (°)", -90.0, 90.0, self.rot_x, 1.0),
            SliderSpec::new("plane-rot-y", "Rotation Y (°)", -90.0, 90.0, self.rot_y, 1.0),
            SliderSpec::new("plane-rot-z", "Rotation Z (°)", -90.0, 90.0, self.rot_z, 1.0),
        ]
    }

    pub fn figure(&self) -> PlaneFigure {
        PlaneFigure::square(
            self.size,
            &RotationState::from_degrees(self.rot_x, self.rot_y, self.rot_z),
        )
    }

    fn update_visualization(&self, ctx: &mut TopicContext<'_>) {
        let figure = self.figure();

        ctx.scene.clear_simulation();
        ctx.scene.add_object(SceneObject::new(
            Geometry::Mesh(Mesh::quad(figure.corners)),
            Material::new(PLANE_COLOR).with_opacity(0.35),
        ));
        ctx.scene.add_object(SceneObject::new(
            Geometry::LineLoop(figure.corners.to_vec()),
            Material::new(PLANE_COLOR),
        ));
        for corner in figure.corners {
            ctx.scene.add_object(SceneObject::marker(corner, POINT_COLOR));
        }

        let ht = figure.trace(ReferencePlane::Horizontal);
        let vt = figure.trace(ReferencePlane::Vertical);
        for (trace, color) in [(ht, TOP_VIEW_COLOR), (vt, FRONT_VIEW_COLOR)] {
            if let Some(object) = trace_object(trace, color) {
                ctx.scene.add_object(object);
            }
        }

        ctx.ui.set_info(&info_panel(&figure, ht, vt));
    }
}

/// Only a proper segment is drawn; a touching corner is already marked.
fn trace_object(trace: Trace, color: Color) -> Option<SceneObject> {
    match trace {
        Trace::Segment(a, b) => Some(SceneObject::new(Geometry::segment(a, b), Material::new(color))),
        _ => None,
    }
}

fn info_panel(figure: &PlaneFigure, ht: Trace, vt: Trace) -> Panel {
    let panel = Panel::new("Plane traces")
        .readout("HT (trace on HP)", ht.to_string())
        .readout("VT (trace on VP)", vt.to_string())
        .readout(
            "Inclination to HP",
            format!("{:.1}°", figure.inclination(ReferencePlane::Horizontal)),
        )
        .readout(
            "Inclination to VP",
            format!("{:.1}°", figure.inclination(ReferencePlane::Vertical)),
        )
        .paragraph("The lines where the plane crosses the HP and VP are its horizontal and vertical traces.");

    match (ht, vt) {
        (Trace::Coplanar, Trace::Coplanar) => panel.notice("The plane has no area."),
        (Trace::Coplanar, _) => panel.notice("The plane lies in the HP: its top view shows its true shape."),
        (_, Trace::Coplanar) => panel.notice("The plane lies in the VP: its front view shows its true shape."),
        _ => panel,
    }
}

impl Topic for PlaneTopic {
    fn id(&self) -> &'static str {
        "planes"
    }

    fn name(&self) -> &'static str {
        "Planes"
    }

    fn load(&mut self, ctx: &mut TopicContext<'_>) {
        let controls = self.sliders().into_iter().fold(
            Panel::new("Plane orientation").paragraph("Resize the square and rotate it about each axis."),
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
            0 => self.size = value,
            1 => self.rot_x = value,
            2 => self.rot_y = value,
            _ => self.rot_z = value,
        }
        self.update_visualization(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_info() {
        let figure = PlaneTopic::default().figure();
        let ht = figure.trace(ReferencePlane::Horizontal);
        let vt = figure.trace(ReferencePlane::Vertical);
        let panel = info_panel(&figure, ht, vt);
        assert_eq!(panel.readout_value("VT (trace on VP)"), Some("lies in the plane"));
        assert_eq!(panel.readout_value("HT (trace on HP)"), Some("(2.50, 0.00, 0.00) to (-2.50, 0.00, 0.00)"));
        assert_eq!(panel.readout_value("Inclination to HP"), Some("90.0°"));
        assert_eq!(panel.readout_value("Inclination to VP"), Some("0.0°"));
    }

    #[test]
    fn test_only_segments_are_drawn() {
        let color = Color::hex(0x000000);
        assert!(trace_object(Trace::Misses, color).is_none());
        assert!(trace_object(Trace::Coplanar, color).is_none());
        assert!(trace_object(Trace::Touches(nalgebra::Point3::origin()), color).is_none());
        assert!(trace_object(
            Trace::Segment(nalgebra::Point3::origin(), nalgebra::Point3::new(1.0, 0.0, 0.0)),
            color
        )
        .is_some());
    }
}
