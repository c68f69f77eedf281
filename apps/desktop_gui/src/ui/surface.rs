//! Retained state the egui frame draws from, written only through the workflow traits.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};
use client_core::{FeatureRow, Notifier, ScoreView, UiSurface};

#[derive(Debug, Default)]
pub struct EguiSurface {
    pub selected_label: Option<String>,
    pub submit_enabled: bool,
    pub loading: bool,
    pub result_visible: bool,
    pub drop_target_active: bool,
    pub score: Option<ScoreView>,
    pub rendered_at: Option<DateTime<Local>>,
    pub features: Vec<FeatureRow>,
    /// Bumped on every rebuild so bar animations restart from zero.
    pub render_generation: u64,
    animate_at: Option<Instant>,
}

impl EguiSurface {
    /// Bar fraction to animate toward at `now`: zero until the animation pass fires.
    pub fn bar_target(&self, row: &FeatureRow, now: Instant) -> f32 {
        match self.animate_at {
            Some(at) if now < at => 0.0,
            _ => (row.width_percent / 100.0) as f32,
        }
    }

    pub fn animation_pending(&self, now: Instant) -> Option<Duration> {
        self.animate_at
            .and_then(|at| at.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }
}

impl UiSurface for EguiSurface {
    fn set_selected_file_label(&mut self, name: &str) {
        self.selected_label = Some(name.to_string());
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn set_loading_visible(&mut self, visible: bool) {
        self.loading = visible;
    }

    fn set_result_visible(&mut self, visible: bool) {
        self.result_visible = visible;
    }

    fn set_drop_target_active(&mut self, active: bool) {
        self.drop_target_active = active;
    }

    fn show_score(&mut self, view: &ScoreView) {
        self.score = Some(view.clone());
        self.rendered_at = Some(Local::now());
    }

    fn clear_features(&mut self) {
        self.features.clear();
        self.render_generation = self.render_generation.wrapping_add(1);
        self.animate_at = None;
    }

    fn append_feature(&mut self, row: &FeatureRow) {
        self.features.push(row.clone());
    }

    fn schedule_bar_animation(&mut self, delay: Duration) {
        self.animate_at = Some(Instant::now() + delay);
    }
}

/// Queue of alerts; the frame shows the front one modally until dismissed.
#[derive(Debug, Default)]
pub struct EguiNotifier {
    pending: VecDeque<String>,
}

impl EguiNotifier {
    pub fn current(&self) -> Option<&str> {
        self.pending.front().map(String::as_str)
    }

    pub fn dismiss(&mut self) {
        self.pending.pop_front();
    }
}

impl Notifier for EguiNotifier {
    fn notify(&mut self, message: &str) {
        tracing::info!(alert = message, "ui: alert raised");
        self.pending.push_back(message.to_string());
    }
}
