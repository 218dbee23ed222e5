//! Chart inputs. Views derive these immutable snapshots from their state;
//! drawing them is up to the renderer.

/// Day names indexed from Sunday.
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fill: &'static str,
    pub stroke: Option<&'static str>,
}

pub const SUCCESS_STYLE: Style = Style {
    fill: "darkseagreen",
    stroke: Some("forestgreen"),
};
pub const FAILED_STYLE: Style = Style {
    fill: "darksalmon",
    stroke: Some("crimson"),
};
pub const BAR_STYLE: Style = Style {
    fill: "lightsteelblue",
    stroke: None,
};
pub const BUSY_STYLE: Style = Style {
    fill: "tan",
    stroke: None,
};
pub const IDLE_STYLE: Style = Style {
    fill: "darkseagreen",
    stroke: None,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub style: Style,
    /// Per-point overrides of `style`; empty when uniform.
    pub point_styles: Vec<Style>,
}

impl Dataset {
    pub fn new(label: Option<&str>, data: Vec<f64>, style: Style) -> Self {
        Self {
            label: label.map(ToOwned::to_owned),
            data,
            style,
            point_styles: Vec::new(),
        }
    }

    pub fn style_at(&self, index: usize) -> Style {
        self.point_styles.get(index).copied().unwrap_or(self.style)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Labels for the last seven days, oldest first, ending with `today`
/// (0 = Sunday).
pub fn last_week_labels(today: usize) -> Vec<String> {
    (0..7)
        .rev()
        .map(|days_ago| WEEKDAYS[(today + 7 - days_ago % 7) % 7].to_string())
        .collect()
}
