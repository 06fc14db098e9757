//! Reinforcement-learning stepper over an observation session.
//!
//! One step is a single button press: press for one frame, release, let a
//! few frames settle, then score the change against the previous step.

use tracing::{debug, info};

use crate::classify::ClassificationPolicy;
use crate::config::WatchConfig;
use crate::emulator::{Button, Emulator};
use crate::error::Result;
use crate::ledger::DiscoveryRecord;
use crate::memory::AddressRange;
use crate::memory::layout::timing;
use crate::session::{ObservationSession, SessionConfig};
use crate::sink::{RewardAccumulator, RewardConfig};
use crate::snapshot::Snapshot;

/// Result of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub reward: f64,
    /// Records committed during this step
    pub discoveries: Vec<DiscoveryRecord>,
    /// Session frame after the step
    pub frame: u64,
}

pub struct RewardEnv<E: Emulator> {
    session: ObservationSession<E>,
    reward: RewardAccumulator,
    ranges: Vec<AddressRange>,
    settle_frames: u32,
    steps: u64,
}

impl<E: Emulator> RewardEnv<E> {
    pub fn new(
        emulator: E,
        policy: ClassificationPolicy,
        ranges: Vec<AddressRange>,
        session: SessionConfig,
        reward: RewardConfig,
    ) -> Self {
        Self {
            session: ObservationSession::with_config(emulator, policy, session),
            reward: RewardAccumulator::new(reward),
            ranges,
            settle_frames: timing::ENV_SETTLE_FRAMES,
            steps: 0,
        }
    }

    pub fn from_config(emulator: E, config: &WatchConfig) -> Result<Self> {
        Ok(Self::new(
            emulator,
            config.policy()?,
            config.ranges()?,
            config.session.clone(),
            config.reward.clone(),
        ))
    }

    /// Frames advanced after the release in each step
    pub fn with_settle_frames(mut self, frames: u32) -> Self {
        self.settle_frames = frames;
        self
    }

    /// Start an episode, optionally from a saved machine state.
    ///
    /// Clears the ledger and every novelty set, then re-baselines.
    pub fn reset(&mut self, state: Option<&[u8]>) -> Result<&Snapshot> {
        if let Some(state) = state {
            self.session.emulator_mut().restore_full_state(state)?;
        }

        self.session.reset_ledger();
        self.reward.reset();
        self.steps = 0;

        let table = self.session.policy().table().clone();
        let baseline = self.session.establish_baseline(&self.ranges);
        self.reward.prime(baseline, &table);
        info!("Episode reset over {} addresses", baseline.len());
        Ok(baseline)
    }

    pub fn step(&mut self, button: Button) -> Result<StepOutcome> {
        if self.session.baseline().is_none() {
            self.reset(None)?;
        }

        self.session.run_action(
            |driver| {
                driver.press(button)?;
                driver.advance_frame()?;
                driver.release(button)
            },
            self.settle_frames,
        )?;
        let deltas = self.session.collect_deltas()?;
        let events = self.session.evaluate(&deltas);
        self.session.dispatch(&events, &mut [&mut self.reward]);
        self.session.promote_capture();

        self.steps += 1;
        let outcome = StepOutcome {
            reward: self.reward.drain(),
            discoveries: events.iter().filter_map(|e| e.discovery).collect(),
            frame: self.session.frame(),
        };
        debug!(
            "Step {} ({}): reward {:+}, {} discoveries",
            self.steps,
            button,
            outcome.reward,
            outcome.discoveries.len()
        );
        Ok(outcome)
    }

    /// Total reward of the current episode
    pub fn episode_reward(&self) -> f64 {
        self.reward.total()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn session(&self) -> &ObservationSession<E> {
        &self.session
    }

    pub fn emulator_mut(&mut self) -> &mut E {
        self.session.emulator_mut()
    }
}
