//! Output formatting for mined clusters
//!
//! Text output is one cluster per line, `<id> (size <count>): <template>`,
//! largest clusters first. JSON output carries the same data plus the
//! per-position tokens.

use drain_core::{LogCluster, Token};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::str::FromStr;

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Pretty JSON array
    Json,
    /// One JSON object per line
    Compact,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "t" => Ok(Format::Text),
            "json" | "j" => Ok(Format::Json),
            "compact" | "c" => Ok(Format::Compact),
            other => Err(format!(
                "unknown output format '{other}' (expected text, json or compact)"
            )),
        }
    }
}

/// Color styles for terminal output
struct ColorStyles {
    id: Style,
    size: Style,
    wildcard: Style,
}

impl ColorStyles {
    fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                id: Style::new().dimmed(),
                size: Style::new().bold(),
                wildcard: Style::new().yellow(),
            }
        } else {
            Self {
                id: Style::new(),
                size: Style::new(),
                wildcard: Style::new(),
            }
        }
    }
}

/// JSON view of a cluster
#[derive(Debug, Serialize)]
pub struct ClusterOutput<'a> {
    id: u64,
    size: u64,
    template: String,
    name: String,
    tokens: Vec<Option<&'a str>>,
}

impl<'a> From<&'a LogCluster> for ClusterOutput<'a> {
    fn from(cluster: &'a LogCluster) -> Self {
        Self {
            id: cluster.id().get(),
            size: cluster.match_count(),
            template: cluster.template_string(),
            name: cluster.canonical_name(),
            tokens: cluster.template().iter().map(Token::as_literal).collect(),
        }
    }
}

/// Clusters ordered by match count, largest first, ties by id
pub fn by_size(clusters: &[LogCluster]) -> Vec<&LogCluster> {
    let mut sorted: Vec<&LogCluster> = clusters.iter().collect();
    sorted.sort_by(|a, b| {
        b.match_count()
            .cmp(&a.match_count())
            .then_with(|| a.id().cmp(&b.id()))
    });
    sorted
}

/// Output formatter
pub struct Formatter {
    format: Format,
    use_color: bool,
    top: Option<usize>,
}

impl Formatter {
    /// Create a new formatter
    pub fn new(format: Format) -> Self {
        Self {
            format,
            use_color: false,
            top: None,
        }
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Only print the `top` largest clusters
    pub fn with_top(mut self, top: Option<usize>) -> Self {
        self.top = top;
        self
    }

    /// Print clusters to stdout
    ///
    /// A closed pipe (`drain mine ... | head`) is not an error.
    pub fn print(&self, clusters: &[LogCluster]) -> io::Result<()> {
        let rendered = self.render(clusters)?;
        let mut out = io::stdout().lock();
        match out.write_all(rendered.as_bytes()).and_then(|()| out.flush()) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            result => result,
        }
    }

    /// Render clusters as they would be printed
    pub fn render(&self, clusters: &[LogCluster]) -> io::Result<String> {
        let mut selected = by_size(clusters);
        if let Some(top) = self.top {
            selected.truncate(top);
        }

        let mut rendered = match self.format {
            Format::Text => {
                let styles = ColorStyles::new(self.use_color);
                selected
                    .iter()
                    .map(|cluster| render_text(cluster, &styles))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Format::Json => {
                let output: Vec<ClusterOutput<'_>> =
                    selected.iter().map(|c| ClusterOutput::from(*c)).collect();
                serde_json::to_string_pretty(&output)?
            }
            Format::Compact => {
                let mut lines = Vec::with_capacity(selected.len());
                for cluster in &selected {
                    lines.push(serde_json::to_string(&ClusterOutput::from(*cluster))?);
                }
                lines.join("\n")
            }
        };

        if !rendered.is_empty() {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

fn render_text(cluster: &LogCluster, styles: &ColorStyles) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "{} {}: ",
        cluster.id().style(styles.id),
        format!("(size {})", cluster.match_count()).style(styles.size)
    );

    for (i, token) in cluster.template().iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        match token {
            Token::Literal(text) => line.push_str(text),
            Token::Wildcard => {
                let _ = write!(line, "{}", token.style(styles.wildcard));
            }
        }
    }

    line
}
