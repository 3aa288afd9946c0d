//! Skeleton placeholders shown while something is loading.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonKind {
    Card,
    Line,
}

impl SkeletonKind {
    fn template(self) -> &'static str {
        match self {
            Self::Card => "{spinner:.dim} {msg}\n  ▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇\n  ▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇\n  ▇▇▇▇▇▇▇▇▇▇▇▇",
            Self::Line => "{spinner:.dim} {msg} ▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇",
        }
    }
}

/// Placeholders keyed by container name; one per container at a time.
pub struct Placeholders {
    multi: MultiProgress,
    active: Mutex<HashMap<String, ProgressBar>>,
}

impl Placeholders {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces whatever `container` currently shows with a skeleton.
    pub fn show_skeleton(&self, container: &str, kind: SkeletonKind) {
        let style = ProgressStyle::with_template(kind.template())
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["░", "▒", "▓", "▒", "░"]);
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(style);
        bar.set_message(format!("Loading {container}"));
        bar.enable_steady_tick(Duration::from_millis(120));

        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(container.to_string(), bar);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    /// Clears `container`. Returns false if nothing was shown.
    pub fn hide_skeleton(&self, container: &str) -> bool {
        let removed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(container);
        match removed {
            Some(bar) => {
                bar.finish_and_clear();
                true
            }
            None => false,
        }
    }

    pub fn is_showing(&self, container: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(container)
    }
}

impl Drop for Placeholders {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, bar) in active.drain() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden() -> Placeholders {
        Placeholders::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    #[test]
    fn show_replaces_and_hide_clears() {
        let p = hidden();
        p.show_skeleton("status", SkeletonKind::Line);
        p.show_skeleton("status", SkeletonKind::Card);
        assert!(p.is_showing("status"));
        assert!(p.hide_skeleton("status"));
        assert!(!p.hide_skeleton("status"));
        assert!(!p.is_showing("status"));
    }
}
