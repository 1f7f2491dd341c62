//! Session engine: configuration, deterministic RNG streams, and the tick
//! state machine that owns a [`crate::state::SessionState`].

mod engine;
mod event;

pub use engine::SessionEngine;
pub use event::{EventSeverity, SessionEvent};

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

use crate::constants::{
    CHOICE_PRESENTED_CAP, CRISES_PER_SESSION, SESSION_DURATION_SECS,
};

/// Tunable knobs for one session. Defaults mirror the shipped balance.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCfg {
    /// Length of the civilization countdown in seconds.
    pub duration_secs: f64,
    /// Crises drawn (without replacement) at session start.
    pub crisis_count: usize,
    /// Ceiling on choices presented within one recycle cycle.
    pub choice_cap: usize,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            duration_secs: SESSION_DURATION_SECS,
            crisis_count: CRISES_PER_SESSION,
            choice_cap: CHOICE_PRESENTED_CAP,
        }
    }
}

impl SessionCfg {
    /// Clamp the configuration into workable ranges.
    pub fn sanitize(&mut self) {
        if !self.duration_secs.is_finite() {
            self.duration_secs = SESSION_DURATION_SECS;
        }
        self.duration_secs = self.duration_secs.max(10.0);
    }
}

/// Result returned by a tick or a choice resolution.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Whether this call ended the session.
    pub ended: bool,
    /// One-shot notifications raised during the call, in order.
    pub events: Vec<SessionEvent>,
}

/// Deterministic bundle of RNG streams segregated by simulation domain.
#[derive(Debug, Clone)]
pub struct RngBundle {
    catalog: RefCell<CountingRng<SmallRng>>,
    crisis: RefCell<CountingRng<SmallRng>>,
    mutation: RefCell<CountingRng<SmallRng>>,
    pacing: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let catalog = CountingRng::new(derive_stream_seed(seed, b"catalog"));
        let crisis = CountingRng::new(derive_stream_seed(seed, b"crisis"));
        let mutation = CountingRng::new(derive_stream_seed(seed, b"mutation"));
        let pacing = CountingRng::new(derive_stream_seed(seed, b"pacing"));
        Self {
            catalog: RefCell::new(catalog),
            crisis: RefCell::new(crisis),
            mutation: RefCell::new(mutation),
            pacing: RefCell::new(pacing),
        }
    }

    /// Access the choice-catalog RNG stream (picks and option shuffles).
    #[must_use]
    pub fn catalog(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.catalog.borrow_mut()
    }

    /// Access the crisis RNG stream (session draw and trigger rolls).
    #[must_use]
    pub fn crisis(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.crisis.borrow_mut()
    }

    /// Access the mutation RNG stream.
    #[must_use]
    pub fn mutation(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.mutation.borrow_mut()
    }

    /// Access the pacing RNG stream (re-arm interval jitter).
    #[must_use]
    pub fn pacing(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.pacing.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn streams_are_domain_separated() {
        let bundle = RngBundle::from_user_seed(42);
        let a = bundle.catalog().next_u64();
        let b = bundle.crisis().next_u64();
        assert_ne!(a, b);
    }

    #[test]
    fn same_seed_reproduces_streams() {
        let first = RngBundle::from_user_seed(7);
        let second = RngBundle::from_user_seed(7);
        assert_eq!(first.pacing().next_u64(), second.pacing().next_u64());
        assert_eq!(first.mutation().next_u64(), second.mutation().next_u64());
    }

    #[test]
    fn draws_are_counted() {
        let bundle = RngBundle::from_user_seed(1);
        let _ = bundle.catalog().next_u32();
        let _ = bundle.catalog().next_u64();
        assert_eq!(bundle.catalog().draws(), 2);
    }

    #[test]
    fn sanitize_repairs_bad_durations() {
        let mut cfg = SessionCfg {
            duration_secs: f64::NAN,
            ..SessionCfg::default()
        };
        cfg.sanitize();
        assert!((cfg.duration_secs - SESSION_DURATION_SECS).abs() < 1e-9);

        let mut short = SessionCfg {
            duration_secs: 1.0,
            ..SessionCfg::default()
        };
        short.sanitize();
        assert!((short.duration_secs - 10.0).abs() < 1e-9);
    }
}
