//! Multi-stage progress model rendered by the front end.
//!
//! Visibility and progress marks are tracked separately: a hidden step can
//! still be passed (and marked completed) so that showing it later renders
//! the right state.

use super::step::StepId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Hidden,
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    visible: bool,
    mark: Mark,
}

#[derive(Debug, Clone)]
pub struct ProgressView {
    slots: [Slot; 6],
    /// Furthest step index ever activated; activation never goes below it.
    furthest: Option<usize>,
    percent: f64,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressView {
    /// Only the steps every scenario runs are visible until a scenario is known.
    pub fn new() -> Self {
        let mut view = Self {
            slots: [Slot {
                visible: false,
                mark: Mark::Pending,
            }; 6],
            furthest: None,
            percent: 0.0,
        };
        view.apply_default_visibility();
        view
    }

    fn apply_default_visibility(&mut self) {
        for step in StepId::ALL {
            self.slots[step.index()].visible = matches!(step, StepId::Conversion | StepId::Main);
        }
    }

    pub fn configure(&mut self, visible_steps: &[StepId]) {
        for step in StepId::ALL {
            self.slots[step.index()].visible = visible_steps.contains(&step);
        }
    }

    /// Fail-open visibility used when the scenario cannot be loaded.
    pub fn show_all(&mut self) {
        self.configure(&StepId::ALL);
    }

    /// Marks `step` active and every earlier step completed.
    ///
    /// Returns false (and changes nothing) when a later step was already
    /// reached; stages never regress.
    pub fn activate(&mut self, step: StepId) -> bool {
        let target = step.index();
        if self.furthest.is_some_and(|f| target < f) {
            return false;
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.mark = match i.cmp(&target) {
                std::cmp::Ordering::Less => Mark::Completed,
                std::cmp::Ordering::Equal => Mark::Active,
                std::cmp::Ordering::Greater => Mark::Pending,
            };
        }
        self.furthest = Some(target);
        true
    }

    /// Applies a server stage name; unrecognised names are ignored.
    pub fn apply_stage(&mut self, stage: &str) -> bool {
        match StepId::from_stage(stage) {
            Some(step) => self.activate(step),
            None => false,
        }
    }

    pub fn complete_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.visible) {
            slot.mark = Mark::Completed;
        }
        self.furthest = Some(StepId::ALL.len() - 1);
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.mark = Mark::Pending;
        }
        self.apply_default_visibility();
        self.furthest = None;
        self.percent = 0.0;
    }

    /// Stores the bar value clamped to `[0, 100]` and returns it.
    pub fn set_progress_bar(&mut self, percent: f64) -> f64 {
        self.percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.percent
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn state(&self, step: StepId) -> DisplayState {
        let slot = self.slots[step.index()];
        if !slot.visible {
            return DisplayState::Hidden;
        }
        match slot.mark {
            Mark::Pending => DisplayState::Pending,
            Mark::Active => DisplayState::Active,
            Mark::Completed => DisplayState::Completed,
        }
    }

    pub fn steps(&self) -> impl Iterator<Item = (StepId, DisplayState)> + '_ {
        StepId::ALL.iter().map(move |step| (*step, self.state(*step)))
    }

    pub fn visible_steps(&self) -> Vec<StepId> {
        self.steps()
            .filter(|(_, state)| *state != DisplayState::Hidden)
            .map(|(step, _)| step)
            .collect()
    }

    pub fn active_step(&self) -> Option<StepId> {
        self.steps()
            .find(|(_, state)| *state == DisplayState::Active)
            .map(|(step, _)| step)
    }
}
