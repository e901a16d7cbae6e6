//! Session state machine with pure transitions.
//!
//! [`Session::apply`] never mutates in place: it returns the next session value
//! together with an outcome describing what happened. Rejected events return an
//! unchanged copy.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::StageCatalog;
use crate::config::ScoringConfig;
use crate::constants::{DEFAULT_DISTANCE_GUESS_M, DEFAULT_HEIGHT_GUESS_M};
use crate::scoring::{StageResult, score_choice, score_distance};
use crate::stage::{AnswerKind, Category, Choice, Stage, StageAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Menu,
    BrowsingCategory,
    Answering,
    Revealing,
    Scored,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::BrowsingCategory => "browsing_category",
            Self::Answering => "answering",
            Self::Revealing => "revealing",
            Self::Scored => "scored",
        }
    }

    const fn has_stage(self) -> bool {
        matches!(self, Self::Answering | Self::Revealing | Self::Scored)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-progress answer for the active stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAnswer {
    pub distance_m: f64,
    pub height_m: f64,
    pub choice: Option<Choice>,
}

impl Default for PendingAnswer {
    fn default() -> Self {
        Self {
            distance_m: DEFAULT_DISTANCE_GUESS_M,
            height_m: DEFAULT_HEIGHT_GUESS_M,
            choice: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    OpenCategories,
    SelectCategory(Category),
    SetDistanceGuess(f64),
    SetHeightGuess(f64),
    SelectChoice(Choice),
    Submit,
    RevealComplete,
    Next,
    Skip,
    Previous,
    Reset,
}

impl SessionEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenCategories => "open_categories",
            Self::SelectCategory(_) => "select_category",
            Self::SetDistanceGuess(_) => "set_distance_guess",
            Self::SetHeightGuess(_) => "set_height_guess",
            Self::SelectChoice(_) => "select_choice",
            Self::Submit => "submit",
            Self::RevealComplete => "reveal_complete",
            Self::Next => "next",
            Self::Skip => "skip",
            Self::Previous => "previous",
            Self::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("{event} is not valid while {phase}")]
    WrongPhase { event: &'static str, phase: Phase },
    #[error("no stage is active")]
    NoActiveStage,
    #[error("category {0} has no stages")]
    EmptyCategory(Category),
    #[error("guess must be finite and non-negative")]
    InvalidGuess,
    #[error("the active stage does not take a {0:?} answer")]
    AnswerKindMismatch(AnswerKind),
    #[error("no choice has been selected")]
    NoChoiceSelected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied,
    Unchanged,
    Rejected(RejectReason),
    Submitted(StageResult),
}

impl TransitionOutcome {
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub outcome: TransitionOutcome,
}

/// Read-only collaborators a transition may consult.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub catalog: &'a StageCatalog,
    pub scoring: &'a ScoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Session {
    phase: Phase,
    category: Option<Category>,
    position: usize,
    pending: PendingAnswer,
    result: Option<StageResult>,
    total_score: u64,
    /// Subjects whose true height has been revealed during this session.
    known_subjects: BTreeSet<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn pending(&self) -> &PendingAnswer {
        &self.pending
    }

    #[must_use]
    pub const fn result(&self) -> Option<&StageResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub const fn total_score(&self) -> u64 {
        self.total_score
    }

    #[must_use]
    pub const fn known_subjects(&self) -> &BTreeSet<String> {
        &self.known_subjects
    }

    /// Stage under the pointer, if a stage phase is active.
    #[must_use]
    pub fn current_stage<'a>(&self, catalog: &'a StageCatalog) -> Option<&'a Stage> {
        if !self.phase.has_stage() {
            return None;
        }
        self.category
            .and_then(|category| catalog.stage_at(category, self.position))
    }

    /// Whether the stage's subject height was already revealed this session.
    #[must_use]
    pub fn height_known(&self, stage: &Stage) -> bool {
        stage.correct_height().is_some()
            && stage
                .subject()
                .is_some_and(|subject| self.known_subjects.contains(&subject.name))
    }

    /// Compute the transition for `event` without touching `self`.
    #[must_use]
    pub fn apply(&self, ctx: &SessionContext<'_>, event: SessionEvent) -> Transition {
        let transition = match event {
            SessionEvent::OpenCategories => self.open_categories(),
            SessionEvent::SelectCategory(category) => self.select_category(ctx, category),
            SessionEvent::SetDistanceGuess(value) => {
                self.set_guess(ctx, value, event.name(), |pending, v| pending.distance_m = v)
            }
            SessionEvent::SetHeightGuess(value) => {
                self.set_guess(ctx, value, event.name(), |pending, v| pending.height_m = v)
            }
            SessionEvent::SelectChoice(choice) => self.select_choice(ctx, choice),
            SessionEvent::Submit => self.submit(ctx),
            SessionEvent::RevealComplete => self.reveal_complete(),
            SessionEvent::Next | SessionEvent::Skip => self.advance(ctx, event.name()),
            SessionEvent::Previous => self.retreat(ctx),
            SessionEvent::Reset => self.reset(),
        };
        debug!(
            "session {} in {}: {} -> {}",
            event.name(),
            self.phase,
            outcome_label(&transition.outcome),
            transition.session.phase
        );
        transition
    }

    fn unchanged(&self) -> Transition {
        Transition {
            session: self.clone(),
            outcome: TransitionOutcome::Unchanged,
        }
    }

    fn rejected(&self, reason: RejectReason) -> Transition {
        Transition {
            session: self.clone(),
            outcome: TransitionOutcome::Rejected(reason),
        }
    }

    fn wrong_phase(&self, event: &'static str) -> Transition {
        self.rejected(RejectReason::WrongPhase {
            event,
            phase: self.phase,
        })
    }

    fn applied(session: Self) -> Transition {
        Transition {
            session,
            outcome: TransitionOutcome::Applied,
        }
    }

    /// Copy positioned at `position` in `Answering` with a fresh pending answer.
    fn entering_stage(&self, category: Category, position: usize) -> Self {
        Self {
            phase: Phase::Answering,
            category: Some(category),
            position,
            pending: PendingAnswer::default(),
            result: None,
            total_score: self.total_score,
            known_subjects: self.known_subjects.clone(),
        }
    }

    fn open_categories(&self) -> Transition {
        match self.phase {
            Phase::BrowsingCategory => self.unchanged(),
            Phase::Revealing => self.wrong_phase("open_categories"),
            _ => Self::applied(Self {
                phase: Phase::BrowsingCategory,
                category: None,
                position: 0,
                pending: PendingAnswer::default(),
                result: None,
                total_score: self.total_score,
                known_subjects: self.known_subjects.clone(),
            }),
        }
    }

    fn select_category(&self, ctx: &SessionContext<'_>, category: Category) -> Transition {
        if self.phase == Phase::Revealing {
            return self.wrong_phase("select_category");
        }
        if ctx.catalog.count_in(category) == 0 {
            return self.rejected(RejectReason::EmptyCategory(category));
        }
        let mut next = self.entering_stage(category, 0);
        // Each category run keeps its own running total.
        next.total_score = 0;
        Self::applied(next)
    }

    fn answering_stage<'a>(
        &self,
        ctx: &SessionContext<'a>,
        event: &'static str,
    ) -> Result<&'a Stage, RejectReason> {
        if self.phase != Phase::Answering {
            return Err(RejectReason::WrongPhase {
                event,
                phase: self.phase,
            });
        }
        self.current_stage(ctx.catalog)
            .ok_or(RejectReason::NoActiveStage)
    }

    fn set_guess(
        &self,
        ctx: &SessionContext<'_>,
        value: f64,
        event: &'static str,
        write: impl FnOnce(&mut PendingAnswer, f64),
    ) -> Transition {
        let stage = match self.answering_stage(ctx, event) {
            Ok(stage) => stage,
            Err(reason) => return self.rejected(reason),
        };
        if stage.kind() != AnswerKind::Distance {
            return self.rejected(RejectReason::AnswerKindMismatch(AnswerKind::Distance));
        }
        if !value.is_finite() || value < 0.0 {
            return self.rejected(RejectReason::InvalidGuess);
        }
        let mut next = self.clone();
        write(&mut next.pending, value);
        if next.pending == self.pending {
            return self.unchanged();
        }
        Self::applied(next)
    }

    fn select_choice(&self, ctx: &SessionContext<'_>, choice: Choice) -> Transition {
        let stage = match self.answering_stage(ctx, "select_choice") {
            Ok(stage) => stage,
            Err(reason) => return self.rejected(reason),
        };
        if stage.kind() != AnswerKind::Choice {
            return self.rejected(RejectReason::AnswerKindMismatch(AnswerKind::Choice));
        }
        if self.pending.choice == Some(choice) {
            return self.unchanged();
        }
        let mut next = self.clone();
        next.pending.choice = Some(choice);
        Self::applied(next)
    }

    fn submit(&self, ctx: &SessionContext<'_>) -> Transition {
        let stage = match self.answering_stage(ctx, "submit") {
            Ok(stage) => stage,
            Err(reason) => return self.rejected(reason),
        };
        let result = match &stage.answer {
            StageAnswer::Distance(truth) => score_distance(
                ctx.scoring,
                &stage.id,
                truth,
                self.pending.distance_m,
                self.pending.height_m,
                self.height_known(stage),
            ),
            StageAnswer::Choice(truth) => match self.pending.choice {
                Some(choice) => score_choice(&stage.id, truth, choice),
                None => return self.rejected(RejectReason::NoChoiceSelected),
            },
        };

        let mut next = self.clone();
        next.phase = Phase::Revealing;
        next.total_score = next.total_score.saturating_add(u64::from(result.score));
        if stage.teaches_height()
            && let Some(subject) = stage.subject()
        {
            next.known_subjects.insert(subject.name.clone());
        }
        next.result = Some(result.clone());
        Transition {
            session: next,
            outcome: TransitionOutcome::Submitted(result),
        }
    }

    fn reveal_complete(&self) -> Transition {
        match self.phase {
            Phase::Revealing => {
                let mut next = self.clone();
                next.phase = Phase::Scored;
                Self::applied(next)
            }
            Phase::Scored => self.unchanged(),
            _ => self.wrong_phase("reveal_complete"),
        }
    }

    /// Navigation waits for the reveal to finish.
    fn active_category(&self, event: &'static str) -> Result<Category, RejectReason> {
        if !matches!(self.phase, Phase::Answering | Phase::Scored) {
            return Err(RejectReason::WrongPhase {
                event,
                phase: self.phase,
            });
        }
        self.category.ok_or(RejectReason::NoActiveStage)
    }

    fn advance(&self, ctx: &SessionContext<'_>, event: &'static str) -> Transition {
        let category = match self.active_category(event) {
            Ok(category) => category,
            Err(reason) => return self.rejected(reason),
        };
        let count = ctx.catalog.count_in(category);
        if count == 0 {
            return self.rejected(RejectReason::EmptyCategory(category));
        }
        let position = (self.position + 1) % count;
        Self::applied(self.entering_stage(category, position))
    }

    fn retreat(&self, ctx: &SessionContext<'_>) -> Transition {
        let category = match self.active_category("previous") {
            Ok(category) => category,
            Err(reason) => return self.rejected(reason),
        };
        if self.position == 0 {
            return self.unchanged();
        }
        let count = ctx.catalog.count_in(category);
        let position = (self.position - 1).min(count.saturating_sub(1));
        Self::applied(self.entering_stage(category, position))
    }

    fn reset(&self) -> Transition {
        let fresh = Self::default();
        if *self == fresh {
            return self.unchanged();
        }
        Self::applied(fresh)
    }
}

fn outcome_label(outcome: &TransitionOutcome) -> &'static str {
    match outcome {
        TransitionOutcome::Applied => "applied",
        TransitionOutcome::Unchanged => "unchanged",
        TransitionOutcome::Rejected(_) => "rejected",
        TransitionOutcome::Submitted(_) => "submitted",
    }
}
