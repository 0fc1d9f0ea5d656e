//! Score trend chart rendered to an SVG file

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::QuizResult;
use crate::progress::ScoreRecord;
use crate::questions::QUIZ_LENGTH;

/// Turns the score history into an image the result page can show
pub trait TrendRenderer {
    /// Returns the written file, or `None` when there is nothing to plot
    fn render(&self, records: &[ScoreRecord]) -> QuizResult<Option<PathBuf>>;
}

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 300.0;
const MARGIN: f64 = 40.0;

pub struct SvgTrendRenderer {
    path: PathBuf,
}

impl SvgTrendRenderer {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrendRenderer for SvgTrendRenderer {
    fn render(&self, records: &[ScoreRecord]) -> QuizResult<Option<PathBuf>> {
        if records.is_empty() {
            return Ok(None);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, render_svg(records))?;
        tracing::debug!(path = %self.path.display(), points = records.len(), "score chart written");
        Ok(Some(self.path.clone()))
    }
}

/// Plot position of the `index`-th of `count` records scoring `score`
fn point(index: usize, count: usize, score: u8) -> (f64, f64) {
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let x = if count > 1 {
        MARGIN + plot_w * index as f64 / (count - 1) as f64
    } else {
        MARGIN + plot_w / 2.0
    };
    let y = HEIGHT - MARGIN - plot_h * score as f64 / QUIZ_LENGTH as f64;
    (x, y)
}

pub fn render_svg(records: &[ScoreRecord]) -> String {
    let count = records.len();
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="20" text-anchor="middle" font-size="14">スコア推移</text>"#,
        WIDTH / 2.0
    );

    // axes
    let bottom = HEIGHT - MARGIN;
    let right = WIDTH - MARGIN;
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN}" y1="{MARGIN}" x2="{MARGIN}" y2="{bottom}" stroke="black"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="black"/>"#
    );
    for tick in (0..=QUIZ_LENGTH).step_by(2) {
        let (_, y) = point(0, 1, tick as u8);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="10">{tick}</text>"#,
            MARGIN - 6.0,
            y + 3.0
        );
    }

    let points: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let (x, y) = point(i, count, r.score);
            format!("{x:.1},{y:.1}")
        })
        .collect();
    let _ = writeln!(
        svg,
        r#"<polyline fill="none" stroke="steelblue" stroke-width="2" points="{}"/>"#,
        points.join(" ")
    );
    for (i, r) in records.iter().enumerate() {
        let (x, y) = point(i, count, r.score);
        let _ = writeln!(svg, r#"<circle cx="{x:.1}" cy="{y:.1}" r="3" fill="steelblue"/>"#);
    }

    let label_y = HEIGHT - MARGIN + 16.0;
    if let Some(first) = records.first() {
        let _ = writeln!(
            svg,
            r#"<text x="{MARGIN}" y="{label_y}" font-size="10">{}</text>"#,
            first.date.format("%Y-%m-%d")
        );
    }
    if let Some(last) = records.last().filter(|_| count > 1) {
        let _ = writeln!(
            svg,
            r#"<text x="{right}" y="{label_y}" text-anchor="end" font-size="10">{}</text>"#,
            last.date.format("%Y-%m-%d")
        );
    }

    svg.push_str("</svg>\n");
    svg
}
