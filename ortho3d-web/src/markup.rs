//! HTML for panels, sliders and the topic list.
//!
//! Pure string building so it can be tested off the browser.

use ortho3d_core::ui::Block;
use ortho3d_core::{Panel, SliderSpec, TopicButton};
use std::fmt::Write;

/// Escape text for element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Id of the element showing a slider's current value.
pub fn value_display_id(slider_id: &str) -> String {
    format!("{slider_id}-value")
}

/// Labelled range input with a live value display.
pub fn slider_markup(spec: &SliderSpec) -> String {
    let id = escape_html(spec.id);
    format!(
        concat!(
            "<div class=\"control-group\">",
            "<label for=\"{id}\">{label}: <span id=\"{value_id}\" class=\"value-display\">{shown}</span></label>",
            "<input type=\"range\" id=\"{id}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\">",
            "</div>"
        ),
        id = id,
        label = escape_html(spec.label),
        value_id = escape_html(&value_display_id(spec.id)),
        shown = spec.format_value(spec.value),
        min = spec.min,
        max = spec.max,
        step = spec.step,
        value = spec.value,
    )
}

pub fn panel_html(panel: &Panel) -> String {
    let mut html = String::new();
    let _ = write!(html, "<h3>{}</h3>", escape_html(&panel.title));

    let mut readouts_open = false;
    for block in &panel.blocks {
        let is_readout = matches!(block, Block::Readout { .. });
        if is_readout && !readouts_open {
            html.push_str("<dl class=\"readouts\">");
            readouts_open = true;
        } else if !is_readout && readouts_open {
            html.push_str("</dl>");
            readouts_open = false;
        }

        match block {
            Block::Paragraph(text) => {
                let _ = write!(html, "<p>{}</p>", escape_html(text));
            }
            Block::Bullets(items) => {
                html.push_str("<ul>");
                for item in items {
                    let _ = write!(html, "<li>{}</li>", escape_html(item));
                }
                html.push_str("</ul>");
            }
            Block::Slider(spec) => html.push_str(&slider_markup(spec)),
            Block::Readout { label, value } => {
                let _ = write!(html, "<dt>{}</dt><dd>{}</dd>", escape_html(label), escape_html(value));
            }
            Block::Notice(text) => {
                let _ = write!(html, "<p class=\"notice\">{}</p>", escape_html(text));
            }
        }
    }
    if readouts_open {
        html.push_str("</dl>");
    }
    html
}

pub fn topic_buttons_html(topics: &[TopicButton]) -> String {
    topics
        .iter()
        .map(|topic| {
            format!(
                "<button class=\"topic-btn\" data-topic=\"{}\">{}</button>",
                escape_html(topic.id),
                escape_html(topic.name)
            )
        })
        .collect()
}

/// Replaces the loading indicator when start-up fails.
pub fn fatal_error_html(message: &str) -> String {
    format!(
        concat!(
            "<div class=\"error-message\">",
            "<h3>Error</h3>",
            "<p>{}</p>",
            "<button onclick=\"location.reload()\">Retry</button>",
            "</div>"
        ),
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
        assert_eq!(escape_html("α to XY"), "α to XY");
    }

    #[test]
    fn test_slider_markup() {
        let spec = SliderSpec::new("point-x", "X coordinate", -10.0, 10.0, 3.0, 0.5);
        let html = slider_markup(&spec);
        assert!(html.contains("<input type=\"range\" id=\"point-x\" min=\"-10\" max=\"10\" step=\"0.5\" value=\"3\">"));
        assert!(html.contains("<span id=\"point-x-value\" class=\"value-display\">3.0</span>"));
        assert!(html.contains("<label for=\"point-x\">X coordinate: "));
    }

    #[test]
    fn test_panel_groups_readouts() {
        let panel = Panel::new("Point <info>")
            .paragraph("Coordinates")
            .readout("Point", "(3.00, 4.00, 5.00)")
            .readout("Quadrant", "First")
            .notice("On HP");
        assert_eq!(
            panel_html(&panel),
            concat!(
                "<h3>Point &lt;info&gt;</h3>",
                "<p>Coordinates</p>",
                "<dl class=\"readouts\"><dt>Point</dt><dd>(3.00, 4.00, 5.00)</dd>",
                "<dt>Quadrant</dt><dd>First</dd></dl>",
                "<p class=\"notice\">On HP</p>"
            )
        );
    }

    #[test]
    fn test_trailing_readouts_are_closed() {
        let html = panel_html(&Panel::new("T").readout("a", "1"));
        assert!(html.ends_with("</dl>"));
    }

    #[test]
    fn test_topic_buttons() {
        let html = topic_buttons_html(&[
            TopicButton {
                id: "welcome",
                name: "Welcome",
            },
            TopicButton {
                id: "points",
                name: "Points",
            },
        ]);
        assert_eq!(
            html,
            "<button class=\"topic-btn\" data-topic=\"welcome\">Welcome</button>\
             <button class=\"topic-btn\" data-topic=\"points\">Points</button>"
        );
    }

    #[test]
    fn test_fatal_error_is_escaped() {
        let html = fatal_error_html("WebGL2 <missing>");
        assert!(html.contains("<p>WebGL2 &lt;missing&gt;</p>"));
        assert!(html.contains("location.reload()"));
    }
}
