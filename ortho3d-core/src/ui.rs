//! UI surface port and the typed panel content topics publish.
//!
//! Topics describe their control and info regions as [`Panel`]s; each host
//! turns a panel into its own markup (HTML in the browser, text lines in
//! the terminal).

/// Entry in the topic navigation list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicButton {
    pub id: &'static str,
    pub name: &'static str,
}

/// Range control bound to one topic parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub step: f32,
}

impl SliderSpec {
    pub fn new(id: &'static str, label: &'static str, min: f32, max: f32, value: f32, step: f32) -> Self {
        Self {
            id,
            label,
            min,
            max,
            value,
            step,
        }
    }

    /// What a range input does with a raw value: snap to the step grid
    /// anchored at `min`, then clamp into `[min, max]`.
    pub fn normalize(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.value;
        }
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        snapped.clamp(self.min, self.max)
    }

    /// Number of decimals the step needs, for value display.
    pub fn decimals(&self) -> usize {
        let mut step = self.step.abs();
        let mut decimals = 0;
        while decimals < 4 && step > 0.0 && (step - step.round()).abs() > 1e-4 {
            step *= 10.0;
            decimals += 1;
        }
        decimals
    }

    pub fn format_value(&self, value: f32) -> String {
        format!("{:.*}", self.decimals(), value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Bullets(Vec<String>),
    Slider(SliderSpec),
    Readout { label: String, value: String },
    /// Highlighted remark
    Notice(String),
}

impl Block {
    /// Plain-text form: one line, or one per bullet.
    pub fn text_lines(&self) -> Vec<String> {
        match self {
            Block::Paragraph(text) => vec![text.clone()],
            Block::Bullets(items) => items.iter().map(|item| format!("  • {item}")).collect(),
            Block::Slider(spec) => vec![format!(
                "{}: {} [{} … {}]",
                spec.label,
                spec.format_value(spec.value),
                spec.format_value(spec.min),
                spec.format_value(spec.max)
            )],
            Block::Readout { label, value } => vec![format!("{label}: {value}")],
            Block::Notice(text) => vec![format!("! {text}")],
        }
    }
}

/// Titled, ordered content for the controls or info region
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Paragraph(text.into()));
        self
    }

    pub fn bullets<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks.push(Block::Bullets(items.into_iter().map(Into::into).collect()));
        self
    }

    pub fn slider(mut self, spec: SliderSpec) -> Self {
        self.blocks.push(Block::Slider(spec));
        self
    }

    pub fn readout(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.blocks.push(Block::Readout {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn notice(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Notice(text.into()));
        self
    }

    pub fn sliders(&self) -> impl Iterator<Item = &SliderSpec> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Slider(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn find_slider(&self, id: &str) -> Option<&SliderSpec> {
        self.sliders().find(|spec| spec.id == id)
    }

    /// Move a slider's displayed value; `false` if no slider has that id.
    pub fn set_slider_value(&mut self, id: &str, value: f32) -> bool {
        for block in &mut self.blocks {
            if let Block::Slider(spec) = block {
                if spec.id == id {
                    spec.value = value;
                    return true;
                }
            }
        }
        false
    }

    pub fn readout_value(&self, label: &str) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::Readout { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    /// Plain-text rendering, title first, no wrapping.
    pub fn to_text_lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone()];
        lines.extend(self.blocks.iter().flat_map(Block::text_lines));
        lines
    }
}

/// The DOM-facing side of the application
pub trait UiSurface {
    /// Replace the navigation list with one button per topic.
    fn render_topic_buttons(&mut self, topics: &[TopicButton]);

    /// Highlight exactly the button for `id`; narrow layouts also close
    /// the navigation drawer.
    fn set_active_button(&mut self, id: &str);

    fn set_controls(&mut self, panel: &Panel);

    fn clear_controls(&mut self);

    fn set_info(&mut self, panel: &Panel);

    fn show_loading(&mut self);

    fn hide_loading(&mut self);

    /// Replace the loading indicator with an error and a retry action,
    /// leaving it visible.
    fn show_fatal_error(&mut self, message: &str);
}

impl<T: UiSurface + ?Sized> UiSurface for &mut T {
    fn render_topic_buttons(&mut self, topics: &[TopicButton]) {
        (**self).render_topic_buttons(topics);
    }

    fn set_active_button(&mut self, id: &str) {
        (**self).set_active_button(id);
    }

    fn set_controls(&mut self, panel: &Panel) {
        (**self).set_controls(panel);
    }

    fn clear_controls(&mut self) {
        (**self).clear_controls();
    }

    fn set_info(&mut self, panel: &Panel) {
        (**self).set_info(panel);
    }

    fn show_loading(&mut self) {
        (**self).show_loading();
    }

    fn hide_loading(&mut self) {
        (**self).hide_loading();
    }

    fn show_fatal_error(&mut self, message: &str) {
        (**self).show_fatal_error(message);
    }
}
