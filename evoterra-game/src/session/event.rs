//! Structured notifications emitted by the session engine.
//!
//! Each variant is a one-shot signal the presentation layer can map to a
//! sound, toast, or overlay. The engine never re-emits latched events.

use serde::{Deserialize, Serialize};

use crate::catalog::ChoiceType;
use crate::mutation::MutationId;
use crate::species::SpeciesId;
use crate::state::SessionOutcome;

/// Severity tier for a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
}

/// One-shot notification raised by a tick or a choice resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    /// An evolution stage finished (0-based index of the completed stage).
    EvolutionStageCompleted { stage: usize },
    /// The final evolution stage finished; biome selection is now open.
    EvolutionComplete,
    /// A choice or crisis was put in front of the player.
    ChoiceOffered { id: String, is_crisis: bool },
    /// The player resolved the outstanding choice.
    ChoiceResolved { id: String, choice_type: ChoiceType },
    /// A mutation fired and its effect was applied.
    MutationTriggered { id: MutationId },
    /// A species crossed its extinction threshold.
    SpeciesExtinct { id: SpeciesId },
    /// The extinction count reached the mass-extinction threshold.
    MassExtinction,
    /// Ecosystem health dropped below the tipping-point warning line.
    TippingPointWarning,
    /// The death-spiral latch engaged; degradation doubles from here on.
    DeathSpiralActivated,
    /// The countdown entered its final stretch; pacing accelerates.
    FinalStretch,
    /// A resolved choice left the ecosystem in a stressed band.
    EcosystemStressed,
    /// The session ended, by countdown or by collapse.
    SessionEnded { outcome: SessionOutcome },
}

impl SessionEvent {
    /// Presentation severity for the event.
    #[must_use]
    pub const fn severity(&self) -> EventSeverity {
        match self {
            Self::EvolutionStageCompleted { .. }
            | Self::EvolutionComplete
            | Self::ChoiceOffered { .. }
            | Self::ChoiceResolved { .. }
            | Self::MutationTriggered { .. } => EventSeverity::Info,
            Self::SpeciesExtinct { .. }
            | Self::TippingPointWarning
            | Self::FinalStretch
            | Self::EcosystemStressed => EventSeverity::Warning,
            Self::MassExtinction | Self::DeathSpiralActivated => EventSeverity::Critical,
            Self::SessionEnded { outcome } => match outcome {
                SessionOutcome::Collapse => EventSeverity::Critical,
                SessionOutcome::Timeout => EventSeverity::Info,
            },
        }
    }
}
