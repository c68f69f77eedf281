//! Terminal rendition of the UI surface.

use std::io::Write;

use client_core::{FeatureRow, Notifier, ScoreView, UiSurface};

const BAR_CELLS: usize = 30;

/// `percent` of `BAR_CELLS`, rounded. Values past 100% overflow the track.
pub fn text_bar(percent: f64) -> String {
    let filled = (percent.max(0.0) / 100.0 * BAR_CELLS as f64).round() as usize;
    format!(
        "{}{}",
        "#".repeat(filled),
        ".".repeat(BAR_CELLS.saturating_sub(filled))
    )
}

/// Buffers the rendered result and writes it once the region becomes visible.
pub struct ConsoleSurface<W: Write> {
    out: W,
    quiet: bool,
    score: Option<ScoreView>,
    features: Vec<FeatureRow>,
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self {
            out,
            quiet,
            score: None,
            features: Vec::new(),
        }
    }

    fn write_result(&mut self) -> std::io::Result<()> {
        let Some(score) = &self.score else {
            return Ok(());
        };
        writeln!(
            self.out,
            "Stress score: {} ({})",
            score.score_text,
            score.tier_label()
        )?;
        writeln!(self.out, "[{}] {}", text_bar(score.fill_percent), score.fill_width())?;
        writeln!(self.out, "Feature contributions:")?;
        let label_width = self
            .features
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);
        for row in &self.features {
            writeln!(
                self.out,
                "  {:<label_width$}  {:>7}  {}",
                row.label,
                row.percent_text,
                text_bar(row.width_percent)
            )?;
        }
        self.out.flush()
    }
}

impl<W: Write> UiSurface for ConsoleSurface<W> {
    fn set_selected_file_label(&mut self, name: &str) {
        tracing::debug!(file = name, "cli: file selected");
    }

    fn set_submit_enabled(&mut self, _enabled: bool) {}

    fn set_loading_visible(&mut self, visible: bool) {
        if visible && !self.quiet {
            eprintln!("Analyzing...");
        }
    }

    fn set_result_visible(&mut self, visible: bool) {
        if visible && !self.quiet {
            if let Err(err) = self.write_result() {
                tracing::error!("cli: failed to write result: {err}");
            }
        }
    }

    fn set_drop_target_active(&mut self, _active: bool) {}

    fn show_score(&mut self, view: &ScoreView) {
        self.score = Some(view.clone());
    }

    fn clear_features(&mut self) {
        self.features.clear();
    }

    fn append_feature(&mut self, row: &FeatureRow) {
        self.features.push(row.clone());
    }
}

/// Holds the last alert; `main` turns it into the exit error so it is
/// printed exactly once.
#[derive(Debug, Default)]
pub struct AlertRecorder {
    pub last: Option<String>,
}

impl AlertRecorder {
    pub fn reason_or(&self, fallback: impl FnOnce() -> String) -> String {
        self.last.clone().unwrap_or_else(fallback)
    }
}

impl Notifier for AlertRecorder {
    fn notify(&mut self, message: &str) {
        tracing::debug!(alert = message, "cli: alert raised");
        self.last = Some(message.to_string());
    }
}
