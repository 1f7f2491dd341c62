//! Scripted decision policies for headless session runs.

use clap::ValueEnum;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use evoterra_game::{ChoiceType, PendingChoice};

/// How the scripted player answers choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Always take the aggressive option.
    Aggressive,
    /// Always take the balanced option.
    Balanced,
    /// Always take the sustainable option.
    Sustainable,
    /// Pick uniformly among the presented options.
    Mixed,
    /// Sustainable picks answered as fast as possible, chasing momentum.
    Rush,
}

impl Strategy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Balanced => "balanced",
            Self::Sustainable => "sustainable",
            Self::Mixed => "mixed",
            Self::Rush => "rush",
        }
    }

    const fn preferred_type(self) -> Option<ChoiceType> {
        match self {
            Self::Aggressive => Some(ChoiceType::Aggressive),
            Self::Balanced => Some(ChoiceType::Balanced),
            Self::Sustainable | Self::Rush => Some(ChoiceType::Sustainable),
            Self::Mixed => None,
        }
    }
}

/// Seeded decision maker: picks an option index and a human-like answer
/// latency for each presented choice.
pub struct DecisionPolicy {
    strategy: Strategy,
    rng: ChaCha20Rng,
}

impl DecisionPolicy {
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            strategy,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Index of the option this policy takes for the presented choice.
    pub fn pick_option(&mut self, pending: &PendingChoice) -> usize {
        match self.strategy.preferred_type() {
            Some(want) => pending
                .options
                .iter()
                .position(|o| o.choice_type == want)
                .unwrap_or(0),
            None => self.rng.gen_range(0..pending.options.len()),
        }
    }

    /// Simulated decision latency in seconds.
    pub fn answer_delay(&mut self) -> f64 {
        match self.strategy {
            // Under the 3-second tier on every answer.
            Strategy::Rush => self.rng.gen_range(0.3..2.0),
            // Spread across the speed tiers, occasionally slow.
            Strategy::Mixed => self.rng.gen_range(0.5..9.0),
            _ => self.rng.gen_range(1.0..4.5),
        }
    }
}
