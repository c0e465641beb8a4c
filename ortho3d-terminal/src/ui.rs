/// Side panel implementing the UI surface port
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use ortho3d_core::ui::Block;
use ortho3d_core::{Panel, SliderSpec, TopicButton, UiSurface};
use std::io::Write;

/// One line of panel text and the colour to print it in
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub text: String,
    pub color: Color,
}

impl StyledLine {
    fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Keeps the latest content of every UI region and renders it as text
#[derive(Debug, Default)]
pub struct TerminalUi {
    buttons: Vec<TopicButton>,
    active: Option<String>,
    controls: Option<Panel>,
    info: Option<Panel>,
    selected: usize,
    loading: bool,
    fatal_error: Option<String>,
    status: Option<String>,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buttons(&self) -> &[TopicButton] {
        &self.buttons
    }

    pub fn controls(&self) -> Option<&Panel> {
        self.controls.as_ref()
    }

    pub fn info(&self) -> Option<&Panel> {
        self.info.as_ref()
    }

    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// One-line message shown under the panels until replaced.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Topic id `offset` places away from the highlighted one, wrapping.
    pub fn neighbour_topic(&self, offset: isize) -> Option<&'static str> {
        if self.buttons.is_empty() {
            return None;
        }
        let len = self.buttons.len() as isize;
        let current = self
            .active
            .as_deref()
            .and_then(|id| self.buttons.iter().position(|b| b.id == id))
            .unwrap_or(0) as isize;
        Some(self.buttons[(current + offset).rem_euclid(len) as usize].id)
    }

    pub fn selected_slider(&self) -> Option<&SliderSpec> {
        self.controls.as_ref()?.sliders().nth(self.selected)
    }

    pub fn select_slider(&mut self, offset: isize) {
        let count = self.controls.as_ref().map_or(0, |panel| panel.sliders().count());
        if count == 0 {
            return;
        }
        self.selected = (self.selected as isize + offset).rem_euclid(count as isize) as usize;
    }

    /// Move the selected slider by `steps` of its step size.
    ///
    /// Returns the parameter id and its new value, already snapped and
    /// clamped, or `None` when there is nothing to move.
    pub fn step_selected(&mut self, steps: f32) -> Option<(&'static str, f32)> {
        let spec = *self.selected_slider()?;
        let value = spec.normalize(spec.value + spec.step * steps);
        self.sync_slider(spec.id, value);
        Some((spec.id, value))
    }

    /// Reflect a value set from elsewhere (e.g. a script) in the controls.
    pub fn sync_slider(&mut self, id: &str, value: f32) {
        if let Some(panel) = self.controls.as_mut() {
            panel.set_slider_value(id, value);
        }
    }

    /// Normalize a raw value the way the slider for `id` would.
    pub fn normalize(&self, id: &str, value: f32) -> Option<f32> {
        Some(self.controls.as_ref()?.find_slider(id)?.normalize(value))
    }

    /// Everything the panel column shows, top to bottom, wrapped to `width`.
    pub fn lines(&self, width: usize) -> Vec<StyledLine> {
        let mut lines = Vec::new();

        if let Some(message) = &self.fatal_error {
            lines.push(StyledLine::new("Error", Color::Red));
            lines.extend(wrap(message, width).into_iter().map(|l| StyledLine::new(l, Color::Red)));
            lines.push(StyledLine::new("Press q to quit and retry.", Color::Grey));
            return lines;
        }
        if self.loading {
            lines.push(StyledLine::new("Loading…", Color::Grey));
            return lines;
        }

        let tabs: Vec<String> = self
            .buttons
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if self.active.as_deref() == Some(b.id) {
                    format!("[{} {}]", i + 1, b.name)
                } else {
                    format!(" {} {} ", i + 1, b.name)
                }
            })
            .collect();
        for line in wrap(&tabs.join(" "), width) {
            lines.push(StyledLine::new(line, Color::Yellow));
        }
        lines.push(StyledLine::new("", Color::Reset));

        if let Some(panel) = &self.controls {
            let selected = self.selected_slider().map(|s| s.id);
            self.panel_lines(panel, selected, width, &mut lines);
            lines.push(StyledLine::new("", Color::Reset));
        }
        if let Some(panel) = &self.info {
            self.panel_lines(panel, None, width, &mut lines);
        }
        if let Some(status) = &self.status {
            lines.push(StyledLine::new("", Color::Reset));
            lines.extend(wrap(status, width).into_iter().map(|l| StyledLine::new(l, Color::Magenta)));
        }
        lines
    }

    fn panel_lines(&self, panel: &Panel, selected: Option<&str>, width: usize, out: &mut Vec<StyledLine>) {
        out.push(StyledLine::new(panel.title.to_uppercase(), Color::Cyan));
        for block in &panel.blocks {
            for line in block.text_lines() {
                let (line, color) = match block {
                    Block::Slider(spec) if Some(spec.id) == selected => (format!("> {line}"), Color::Green),
                    Block::Slider(_) => (format!("  {line}"), Color::White),
                    Block::Notice(_) => (line, Color::Yellow),
                    Block::Readout { .. } => (line, Color::White),
                    Block::Paragraph(_) | Block::Bullets(_) => (line, Color::Grey),
                };
                out.extend(wrap(&line, width).into_iter().map(|l| StyledLine::new(l, color)));
            }
        }
    }

    /// Queue the panel column at (`left`, `top`), clearing each row.
    pub fn draw<W: Write>(&self, writer: &mut W, left: u16, top: u16, width: u16, height: u16) -> std::io::Result<()> {
        let lines = self.lines(width as usize);
        for row in 0..height {
            writer.queue(MoveTo(left, top + row))?;
            writer.queue(Clear(ClearType::UntilNewLine))?;
            if let Some(line) = lines.get(row as usize) {
                writer.queue(SetForegroundColor(line.color))?;
                writer.queue(Print(&line.text))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl UiSurface for TerminalUi {
    fn render_topic_buttons(&mut self, topics: &[TopicButton]) {
        self.buttons = topics.to_vec();
    }

    fn set_active_button(&mut self, id: &str) {
        self.active = Some(id.to_string());
    }

    fn set_controls(&mut self, panel: &Panel) {
        self.controls = Some(panel.clone());
        self.selected = 0;
    }

    fn clear_controls(&mut self) {
        self.controls = None;
        self.selected = 0;
    }

    fn set_info(&mut self, panel: &Panel) {
        self.info = Some(panel.clone());
    }

    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn show_fatal_error(&mut self, message: &str) {
        self.loading = true;
        self.fatal_error = Some(message.to_string());
    }
}

/// Greedy word wrap; words longer than `width` are split. Leading
/// indentation is repeated on every wrapped line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let body = text.trim_start_matches(' ');
    let indent = &text[..text.len() - body.len()];
    let indent = if indent.len() < width { indent } else { "" };
    let width = (width - indent.len().min(width)).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in body.split(' ').filter(|word| !word.is_empty()) {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines.into_iter().map(|line| format!("{indent}{line}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui_with_controls() -> TerminalUi {
        let mut ui = TerminalUi::new();
        ui.render_topic_buttons(&[
            TopicButton {
                id: "welcome",
                name: "Welcome",
            },
            TopicButton {
                id: "points",
                name: "Points",
            },
        ]);
        ui.set_active_button("points");
        ui.set_controls(
            &Panel::new("Point position")
                .slider(SliderSpec::new("point-x", "X", -10.0, 10.0, 3.0, 0.5))
                .slider(SliderSpec::new("point-y", "Y", -10.0, 10.0, 9.5, 0.5)),
        );
        ui
    }

    #[test]
    fn test_step_selected_clamps() {
        let mut ui = ui_with_controls();
        assert_eq!(ui.step_selected(1.0), Some(("point-x", 3.5)));
        ui.select_slider(1);
        assert_eq!(ui.step_selected(4.0), Some(("point-y", 10.0)));
        assert_eq!(ui.selected_slider().map(|s| s.value), Some(10.0));
    }

    #[test]
    fn test_slider_selection_wraps() {
        let mut ui = ui_with_controls();
        ui.select_slider(-1);
        assert_eq!(ui.selected_slider().map(|s| s.id), Some("point-y"));
        ui.select_slider(1);
        assert_eq!(ui.selected_slider().map(|s| s.id), Some("point-x"));
    }

    #[test]
    fn test_neighbour_topic_wraps() {
        let ui = ui_with_controls();
        assert_eq!(ui.neighbour_topic(1), Some("welcome"));
        assert_eq!(ui.neighbour_topic(-1), Some("welcome"));
        assert_eq!(ui.neighbour_topic(0), Some("points"));
    }

    #[test]
    fn test_lines_mark_active_topic_and_selection() {
        let ui = ui_with_controls();
        let lines = ui.lines(60);
        assert!(lines[0].text.contains("[2 Points]"));
        assert!(lines.iter().any(|l| l.text == "> X: 3.0 [-10.0 … 10.0]"));
        assert!(lines.iter().any(|l| l.text == "  Y: 9.5 [-10.0 … 10.0]"));
    }

    #[test]
    fn test_fatal_error_replaces_panels() {
        let mut ui = ui_with_controls();
        ui.show_fatal_error("3D rendering is not available");
        let lines = ui.lines(40);
        assert_eq!(lines[0].text, "Error");
        assert!(ui.is_loading());
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_keeps_indent() {
        assert_eq!(wrap("  Y: 9.5", 60), vec!["  Y: 9.5"]);
        assert_eq!(wrap("  • Drag to orbit the camera", 60), vec!["  • Drag to orbit the camera"]);
        assert_eq!(wrap("  • one two three", 9), vec!["  • one", "  two", "  three"]);
    }
}
