use std::time::Duration;

use shared::domain::{FeatureContribution, ScoreResult, StressTier};
use tracing::debug;

use crate::surface::UiSurface;

/// Gap between the result becoming visible and the bar animation pass.
pub const BAR_ANIMATION_DELAY: Duration = Duration::from_millis(100);

/// Score gauge contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreView {
    pub score_text: String,
    pub fill_percent: f64,
    pub tier: StressTier,
}

impl ScoreView {
    pub fn from_score(score: f64) -> Self {
        Self {
            score_text: fixed(score, 2),
            fill_percent: score * 100.0,
            tier: StressTier::classify(score),
        }
    }

    pub fn fill_width(&self) -> String {
        css_percent(self.fill_percent)
    }

    pub fn tier_label(&self) -> &'static str {
        self.tier.label()
    }
}

/// One line of the feature breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub key: String,
    pub label: String,
    pub percent_text: String,
    /// Not clamped: contributions above 1 overflow the bar.
    pub width_percent: f64,
}

impl FeatureRow {
    pub fn from_contribution(contribution: &FeatureContribution) -> Self {
        let percent = contribution.value * 100.0;
        Self {
            key: contribution.name.clone(),
            label: humanize_feature_name(&contribution.name),
            percent_text: format!("{}%", fixed(percent, 1)),
            width_percent: percent,
        }
    }

    pub fn bar_width(&self) -> String {
        css_percent(self.width_percent)
    }
}

/// Fixed-point text with ties rounded away from zero (`0.125` -> `0.13`).
/// `format!` alone rounds ties to even.
fn fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round() / scale;
    format!("{rounded:.digits$}")
}

fn css_percent(value: f64) -> String {
    format!("{value}%")
}

/// `pitch_variance` -> `Pitch Variance`, `zero-crossing` -> `Zero Crossing`.
pub fn humanize_feature_name(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' || ch == '-' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    label
}

/// Owns the last successfully rendered result.
#[derive(Debug, Default)]
pub struct ResultRenderer {
    last: Option<ScoreResult>,
}

impl ResultRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ScoreResult> {
        self.last.as_ref()
    }

    /// Rebuilds the whole result region; it is shown only once every row is in place.
    pub fn render<S: UiSurface + ?Sized>(&mut self, result: ScoreResult, surface: &mut S) {
        surface.set_result_visible(false);
        surface.show_score(&ScoreView::from_score(result.score));

        surface.clear_features();
        for contribution in &result.features {
            surface.append_feature(&FeatureRow::from_contribution(contribution));
        }

        surface.set_result_visible(true);
        surface.schedule_bar_animation(BAR_ANIMATION_DELAY);
        debug!(
            score = result.score,
            features = result.features.len(),
            "render: result displayed"
        );
        self.last = Some(result);
    }
}
