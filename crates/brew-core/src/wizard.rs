//! Multi-step wizard controller
//!
//! Both the order and the reservation flow are linear wizards. Moving back is
//! always allowed; moving forward requires every step being left behind to
//! pass its validator. A failed gate leaves the active step unchanged and
//! hands back the customer-facing [`ValidationError`].

use crate::error::{guard_breach, ValidationError};
use serde::Serialize;
use std::fmt::Debug;

/// A step of a linear wizard, numbered from 1
pub trait WizardStep: Copy + Eq + Debug + 'static {
    /// Steps in order
    const ALL: &'static [Self];

    /// 1-based position
    fn number(self) -> u8;

    /// Caption for the step indicator
    fn title(self) -> &'static str;

    fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == number)
    }

    fn first() -> Self {
        Self::ALL[0]
    }

    fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }
}

/// Per-step gate supplied by the flow state
pub trait StepValidator<S: WizardStep> {
    /// Check whether `step` is complete enough to leave going forward
    fn validate_step(&self, step: S) -> Result<(), ValidationError>;
}

/// Indicator entry for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepMarker {
    pub number: u8,
    pub title: &'static str,
    /// Step is at or before the active one
    pub reached: bool,
    /// Step is the active one
    pub active: bool,
}

/// Result of a successful navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    Forward { from: S, to: S },
    Back { from: S, to: S },
    Stay(S),
}

/// Tracks the active step of one wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardController<S: WizardStep> {
    current: S,
}

impl<S: WizardStep> Default for WizardController<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WizardStep> WizardController<S> {
    #[must_use]
    pub fn new() -> Self {
        Self { current: S::first() }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> S {
        self.current
    }

    /// Whether the customer may leave `from` going forward
    pub fn can_advance<V: StepValidator<S>>(&self, from: S, validator: &V) -> bool {
        validator.validate_step(from).is_ok()
    }

    /// Move to `target`.
    ///
    /// Backward and same-step moves are unconditional. Forward moves validate
    /// each step from the active one up to, but excluding, `target`.
    pub fn go_to<V: StepValidator<S>>(
        &mut self,
        target: S,
        validator: &V,
    ) -> Result<Transition<S>, ValidationError> {
        let from = self.current;
        if target.number() == from.number() {
            return Ok(Transition::Stay(from));
        }
        if target.number() < from.number() {
            self.current = target;
            tracing::debug!(?from, to = ?target, "wizard moved back");
            return Ok(Transition::Back { from, to: target });
        }

        for step in S::ALL
            .iter()
            .copied()
            .filter(|s| s.number() >= from.number() && s.number() < target.number())
        {
            if let Err(err) = validator.validate_step(step) {
                tracing::debug!(?step, %err, "wizard gate closed");
                return Err(err);
            }
        }

        self.current = target;
        tracing::debug!(?from, to = ?target, "wizard advanced");
        Ok(Transition::Forward { from, to: target })
    }

    /// Move to a step by number; unknown numbers are ignored
    pub fn go_to_number<V: StepValidator<S>>(
        &mut self,
        number: u8,
        validator: &V,
    ) -> Option<Result<Transition<S>, ValidationError>> {
        match S::from_number(number) {
            Some(step) => Some(self.go_to(step, validator)),
            None => {
                guard_breach("wizard step number out of range");
                None
            }
        }
    }

    /// Advance one step; staying on the last step is a no-op
    pub fn next<V: StepValidator<S>>(
        &mut self,
        validator: &V,
    ) -> Result<Transition<S>, ValidationError> {
        match S::from_number(self.current.number() + 1) {
            Some(step) => self.go_to(step, validator),
            None => Ok(Transition::Stay(self.current)),
        }
    }

    /// Go back one step; staying on the first step is a no-op
    pub fn back(&mut self) -> Transition<S> {
        let from = self.current;
        match from.number().checked_sub(1).and_then(S::from_number) {
            Some(to) => {
                self.current = to;
                Transition::Back { from, to }
            }
            None => Transition::Stay(from),
        }
    }

    /// Return to the first step
    pub fn reset(&mut self) {
        self.current = S::first();
    }

    /// Cumulative step indicator
    #[must_use]
    pub fn indicator(&self) -> Vec<StepMarker> {
        let active = self.current.number();
        S::ALL
            .iter()
            .map(|s| StepMarker {
                number: s.number(),
                title: s.title(),
                reached: s.number() <= active,
                active: s.number() == active,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        One,
        Two,
        Three,
    }

    impl WizardStep for Step {
        const ALL: &'static [Self] = &[Step::One, Step::Two, Step::Three];

        fn number(self) -> u8 {
            match self {
                Step::One => 1,
                Step::Two => 2,
                Step::Three => 3,
            }
        }

        fn title(self) -> &'static str {
            "step"
        }
    }

    struct Gate {
        open: [bool; 3],
    }

    impl StepValidator<Step> for Gate {
        fn validate_step(&self, step: Step) -> Result<(), ValidationError> {
            if self.open[usize::from(step.number() - 1)] {
                Ok(())
            } else {
                Err(ValidationError::TimeRequired)
            }
        }
    }

    #[test]
    fn forward_blocked_by_closed_gate() {
        let mut wizard = WizardController::<Step>::new();
        let gate = Gate {
            open: [false, true, true],
        };
        assert!(!wizard.can_advance(Step::One, &gate));
        assert_eq!(wizard.next(&gate), Err(ValidationError::TimeRequired));
        assert_eq!(wizard.current(), Step::One);
    }

    #[test]
    fn skipping_ahead_checks_intermediate_steps() {
        let mut wizard = WizardController::<Step>::new();
        let gate = Gate {
            open: [true, false, true],
        };
        assert!(wizard.go_to(Step::Three, &gate).is_err());
        assert_eq!(wizard.current(), Step::One);
        assert_eq!(
            wizard.go_to(Step::Two, &gate),
            Ok(Transition::Forward {
                from: Step::One,
                to: Step::Two
            })
        );
    }

    #[test]
    fn back_is_unconditional() {
        let mut wizard = WizardController::<Step>::new();
        let open = Gate { open: [true; 3] };
        wizard.go_to(Step::Three, &open).unwrap();
        let closed = Gate { open: [false; 3] };
        assert!(wizard.go_to(Step::One, &closed).is_ok());
        assert_eq!(wizard.back(), Transition::Stay(Step::One));
    }

    #[test]
    fn indicator_is_cumulative() {
        let mut wizard = WizardController::<Step>::new();
        wizard.next(&Gate { open: [true; 3] }).unwrap();
        let reached: Vec<bool> = wizard.indicator().iter().map(|m| m.reached).collect();
        assert_eq!(reached, vec![true, true, false]);
        let active: Vec<bool> = wizard.indicator().iter().map(|m| m.active).collect();
        assert_eq!(active, vec![false, true, false]);
    }

    #[test]
    fn next_on_last_step_stays() {
        let mut wizard = WizardController::<Step>::new();
        let open = Gate { open: [true; 3] };
        wizard.go_to(Step::Three, &open).unwrap();
        assert_eq!(wizard.next(&open), Ok(Transition::Stay(Step::Three)));
    }

    #[test]
    fn unknown_step_number_is_ignored() {
        let mut wizard = WizardController::<Step>::new();
        let open = Gate { open: [true; 3] };
        assert!(wizard.go_to_number(9, &open).is_none());
        assert_eq!(wizard.current(), Step::One);
    }
}
