//! Observation session: baseline, action, diff, classify, gate, dispatch.
//!
//! The session owns the emulator, the classification policy and the
//! discovery ledger. Its lifecycle is
//! `Idle -> BaselineHeld -> ActionInFlight -> SnapshotReady -> BaselineHeld`.
//!
//! ## Example
//!
//! ```ignore
//! let mut session = ObservationSession::new(emulator, policy);
//! session.establish_baseline(&ranges);
//! session.run_action(|driver| driver.tap(Button::A, 10), 120)?;
//! let deltas = session.collect_deltas()?;
//! let events = session.evaluate(&deltas);
//! session.dispatch(&events, &mut [&mut console as &mut dyn EventSink]);
//! ```

mod config;

use strum::{Display, IntoStaticStr};
use tracing::{debug, info, warn};

use crate::classify::ClassificationPolicy;
use crate::emulator::{Emulator, FrameDriver};
use crate::error::{Error, Result};
use crate::ledger::{DiscoveryLedger, DiscoveryRecord};
use crate::memory::{Address, AddressRange};
use crate::sink::{DiscoveryEvent, EventSink};
use crate::snapshot::{Delta, Snapshot, SnapshotKind, diff};

pub use config::{SessionConfig, SessionConfigBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    Idle,
    BaselineHeld,
    ActionInFlight,
    SnapshotReady,
}

pub struct ObservationSession<E: Emulator> {
    emulator: E,
    policy: ClassificationPolicy,
    ledger: DiscoveryLedger,
    config: SessionConfig,
    state: SessionState,
    ranges: Vec<AddressRange>,
    baseline: Option<Snapshot>,
    /// Latest post-action snapshot, eligible for promotion
    capture: Option<Snapshot>,
    /// Frames advanced through this session
    frame: u64,
    sequence: u64,
}

impl<E: Emulator> ObservationSession<E> {
    pub fn new(emulator: E, policy: ClassificationPolicy) -> Self {
        Self::with_config(emulator, policy, SessionConfig::default())
    }

    pub fn with_config(emulator: E, policy: ClassificationPolicy, config: SessionConfig) -> Self {
        Self {
            emulator,
            policy,
            ledger: DiscoveryLedger::with_mode(config.ledger_mode),
            config,
            state: SessionState::Idle,
            ranges: Vec::new(),
            baseline: None,
            capture: None,
            frame: 0,
            sequence: 0,
        }
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        if self.state != expected {
            return Err(Error::InvalidSessionState {
                expected: expected.into(),
                actual: self.state.into(),
            });
        }
        Ok(())
    }

    /// Capture the reference snapshot, replacing any previous one
    pub fn establish_baseline(&mut self, ranges: &[AddressRange]) -> &Snapshot {
        let snapshot =
            Snapshot::capture(&self.emulator, ranges, self.frame).with_kind(SnapshotKind::Baseline);
        info!(
            "Baseline established over {} addresses in {} ranges (frame {})",
            snapshot.len(),
            ranges.len(),
            self.frame
        );

        self.ranges = ranges.to_vec();
        self.capture = None;
        self.state = SessionState::BaselineHeld;
        self.baseline.insert(snapshot)
    }

    /// Re-capture the baseline over the ranges of the last baseline
    pub fn rebaseline(&mut self) -> Result<&Snapshot> {
        if self.ranges.is_empty() {
            return Err(Error::InvalidSessionState {
                expected: SessionState::BaselineHeld.into(),
                actual: self.state.into(),
            });
        }
        let ranges = std::mem::take(&mut self.ranges);
        Ok(self.establish_baseline(&ranges))
    }

    /// Run an action, then advance `settle_frames` so delayed effects land.
    ///
    /// On a driver fault the cycle is aborted: baseline and ledger are left
    /// untouched and the session returns to `BaselineHeld`.
    pub fn run_action<F>(&mut self, action: F, settle_frames: u32) -> Result<()>
    where
        F: FnOnce(&mut FrameDriver<'_, E>) -> Result<()>,
    {
        self.expect_state(SessionState::BaselineHeld)?;
        self.state = SessionState::ActionInFlight;

        let mut driver = FrameDriver::new(&mut self.emulator);
        let result = action(&mut driver).and_then(|()| driver.settle(settle_frames));
        self.frame += driver.frames_advanced();

        match result {
            Ok(()) => {
                self.state = SessionState::SnapshotReady;
                Ok(())
            }
            Err(e) => {
                warn!("Action aborted at frame {}: {}", self.frame, e);
                self.state = SessionState::BaselineHeld;
                Err(e)
            }
        }
    }

    /// Capture the post-action snapshot and diff it against the baseline
    pub fn collect_deltas(&mut self) -> Result<Vec<Delta>> {
        self.expect_state(SessionState::SnapshotReady)?;
        let Some(baseline) = self.baseline.as_ref() else {
            return Err(Error::InvalidSessionState {
                expected: SessionState::BaselineHeld.into(),
                actual: SessionState::Idle.into(),
            });
        };

        let after = Snapshot::capture(&self.emulator, baseline.ranges(), self.frame)
            .with_kind(SnapshotKind::PostAction);
        let deltas = diff(baseline, &after);
        debug!("{} deltas at frame {}", deltas.len(), self.frame);

        self.capture = Some(after);
        self.state = SessionState::BaselineHeld;
        Ok(deltas)
    }

    /// Classify deltas and commit new discoveries to the ledger.
    ///
    /// Returns one event per delta; only committed deltas carry a
    /// discovery record.
    pub fn evaluate(&mut self, deltas: &[Delta]) -> Vec<DiscoveryEvent> {
        let mut events = Vec::with_capacity(deltas.len());

        for delta in deltas {
            let classification = self.policy.classify(delta);
            let label = self
                .baseline
                .as_ref()
                .and_then(|b| b.range_for(delta.address()))
                .and_then(|r| r.label())
                .map(Into::into);

            let mut discovery = None;
            if let Some(category) = classification.category()
                && self.policy.is_discovery(delta, &classification)
            {
                let record = DiscoveryRecord {
                    address: delta.address(),
                    previous_value: delta.before(),
                    first_seen_value: delta.after(),
                    discovered_at: self.frame,
                    category,
                };
                match self.ledger.commit(record) {
                    Ok(()) => {
                        debug!("Discovered {} ({})", delta, category);
                        discovery = Some(record);
                    }
                    Err(e) => debug!("{}", e),
                }
            }

            self.sequence += 1;
            events.push(DiscoveryEvent {
                sequence: self.sequence,
                frame: self.frame,
                delta: *delta,
                classification,
                label,
                discovery,
            });
        }

        events
    }

    /// Hand every event to every sink, then close the cycle on each sink
    pub fn dispatch(&mut self, events: &[DiscoveryEvent], sinks: &mut [&mut dyn EventSink]) {
        for event in events {
            for sink in sinks.iter_mut() {
                sink.handle(event, &mut self.emulator);
            }
        }

        if let Some(after) = self.capture.as_ref().or(self.baseline.as_ref()) {
            for sink in sinks.iter_mut() {
                sink.end_cycle(after);
            }
        }
    }

    /// Action, settle, collect, evaluate and dispatch in one call
    pub fn run_cycle<F>(
        &mut self,
        action: F,
        settle_frames: u32,
        sinks: &mut [&mut dyn EventSink],
    ) -> Result<Vec<DiscoveryEvent>>
    where
        F: FnOnce(&mut FrameDriver<'_, E>) -> Result<()>,
    {
        self.run_action(action, settle_frames)?;
        let deltas = self.collect_deltas()?;
        let events = self.evaluate(&deltas);
        self.dispatch(&events, sinks);
        Ok(events)
    }

    /// [`run_cycle`](Self::run_cycle) with the configured settle frames
    pub fn act<F>(
        &mut self,
        action: F,
        sinks: &mut [&mut dyn EventSink],
    ) -> Result<Vec<DiscoveryEvent>>
    where
        F: FnOnce(&mut FrameDriver<'_, E>) -> Result<()>,
    {
        self.run_cycle(action, self.config.settle_frames, sinks)
    }

    /// [`observe`](Self::observe) over the configured poll interval
    pub fn poll(&mut self, sinks: &mut [&mut dyn EventSink]) -> Result<Vec<DiscoveryEvent>> {
        self.observe(self.config.poll_frames, sinks)
    }

    /// Poll-style cycle: let `frames` frames pass, evaluate against the
    /// baseline, then roll the baseline forward.
    pub fn observe(
        &mut self,
        frames: u32,
        sinks: &mut [&mut dyn EventSink],
    ) -> Result<Vec<DiscoveryEvent>> {
        let events = self.run_cycle(|_| Ok(()), frames, sinks)?;
        self.promote_capture();
        Ok(events)
    }

    /// Make the last post-action snapshot the new baseline.
    ///
    /// Returns `false` when there is nothing to promote.
    pub fn promote_capture(&mut self) -> bool {
        match self.capture.take() {
            Some(capture) => {
                self.baseline = Some(capture.with_kind(SnapshotKind::Baseline));
                true
            }
            None => false,
        }
    }

    /// Drop the reference snapshot; the ledger is kept
    pub fn reset_baseline(&mut self) {
        self.baseline = None;
        self.capture = None;
        self.state = SessionState::Idle;
    }

    /// Clear the ledger; the baseline is kept
    pub fn reset_ledger(&mut self) {
        self.ledger.reset();
    }

    /// Live capture over the baseline ranges, taken between cycles
    pub fn current_values(&self) -> Snapshot {
        Snapshot::capture(&self.emulator, &self.ranges, self.frame)
            .with_kind(SnapshotKind::PreAction)
    }

    /// Live non-zero values over the baseline ranges
    pub fn non_zero(&self) -> Vec<(Address, u8)> {
        self.current_values().non_zero()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }

    pub fn last_capture(&self) -> Option<&Snapshot> {
        self.capture.as_ref()
    }

    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    pub fn ledger(&self) -> &DiscoveryLedger {
        &self.ledger
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn emulator(&self) -> &E {
        &self.emulator
    }

    /// Direct emulator access; frames advanced here are not counted
    pub fn emulator_mut(&mut self) -> &mut E {
        &mut self.emulator
    }
}
