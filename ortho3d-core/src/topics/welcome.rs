use crate::topic::{Topic, TopicContext};
use crate::ui::Panel;

/// Landing page: static instructions, nothing in the scene.
#[derive(Debug, Default, Clone, Copy)]
pub struct WelcomeTopic;

impl Topic for WelcomeTopic {
    fn id(&self) -> &'static str {
        "welcome"
    }

    fn name(&self) -> &'static str {
        "Welcome"
    }

    fn load(&mut self, ctx: &mut TopicContext<'_>) {
        let controls = Panel::new("Getting started")
            .paragraph("Pick a topic to explore how objects in space are projected onto the two reference planes.")
            .bullets([
                "Drag to orbit the camera",
                "Scroll to zoom, right-drag to pan",
                "Use the sliders of each topic to move the object",
            ]);
        let info = Panel::new("Descriptive geometry")
            .paragraph("Two planes meet at the XY line and divide space into four quadrants.")
            .bullets([
                "HP (green): horizontal plane; the top view is drawn on it",
                "VP (blue): vertical plane; the front view is drawn on it",
                "Projectors (dashed) run perpendicular to each plane",
            ]);
        ctx.ui.set_controls(&controls);
        ctx.ui.set_info(&info);
    }
}
