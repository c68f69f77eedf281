//! Seams between the workflow and whatever hosts it (window, terminal, test double).

use std::time::Duration;

use crate::render::{FeatureRow, ScoreView};

/// Named UI affordances the workflow drives.
pub trait UiSurface {
    fn set_selected_file_label(&mut self, name: &str);
    fn set_submit_enabled(&mut self, enabled: bool);
    fn set_loading_visible(&mut self, visible: bool);
    fn set_result_visible(&mut self, visible: bool);
    fn set_drop_target_active(&mut self, active: bool);
    fn show_score(&mut self, view: &ScoreView);
    fn clear_features(&mut self);
    fn append_feature(&mut self, row: &FeatureRow);

    /// Re-apply the already rendered bar widths after `delay` so they animate.
    fn schedule_bar_animation(&mut self, _delay: Duration) {}
}

/// Blocking user-facing message.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}
