//! Poller state and its transition function.
//!
//! [`advance`] is pure: it maps a state and an observed event to the next state and the
//! single command the poller should carry out on its next tick. Terminal states absorb
//! every event.
use crate::error::Error;
use crate::texture::job::{JobId, PollOutcome};
use crate::texture::TextureMaps;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PollerState {
    #[default]
    Idle,
    /// Waiting on the base-color job.
    BasePending { job: JobId, chain_pbr: bool },
    /// Base image ready, PBR derivation not yet submitted.
    PbrQueued { base: TextureMaps },
    /// Waiting on the PBR job.
    PbrPending { job: JobId, base: TextureMaps },
    Done(TextureMaps),
    Failed(String),
    Cancelled,
}

impl PollerState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerState::Done(_) | PollerState::Failed(_) | PollerState::Cancelled
        )
    }

    /// A job is submitted or about to be.
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && !matches!(self, PollerState::Idle)
    }

    /// Job currently being polled.
    pub fn current_job(&self) -> Option<&JobId> {
        match self {
            PollerState::BasePending { job, .. } | PollerState::PbrPending { job, .. } => Some(job),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PollerState::Idle => "idle",
            PollerState::BasePending { .. } => "base pending",
            PollerState::PbrQueued { .. } => "PBR queued",
            PollerState::PbrPending { .. } => "PBR pending",
            PollerState::Done(_) => "done",
            PollerState::Failed(_) => "failed",
            PollerState::Cancelled => "cancelled",
        }
    }
}

/// Something the poller observed.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    BaseSubmitted { job: JobId, chain_pbr: bool },
    PbrSubmitted(JobId),
    /// The service rejected a submission or it could not be sent.
    SubmitRejected(String),
    Polled(PollOutcome),
    /// Transport failure or malformed response while polling.
    PollFailed(String),
    Cancel,
}

/// What the poller should do next.
#[derive(Debug)]
pub enum Command {
    /// Nothing to do.
    Idle,
    Poll(JobId),
    /// Submit the PBR derivation job for this base image.
    SubmitPbr { image_url: String },
    /// Hand the finished maps to the sink.
    Deliver(TextureMaps),
    /// Surface a terminal error.
    Report(Error),
}

const NO_OUTPUT: &str = "no output image URL";

fn fail(error: Error) -> (PollerState, Command) {
    (PollerState::Failed(error.to_string()), Command::Report(error))
}

/// Transition function of the chained poller.
pub fn advance(state: PollerState, event: PollEvent) -> (PollerState, Command) {
    use PollEvent as E;
    use PollerState as S;

    if state.is_terminal() {
        return (state, Command::Idle);
    }

    match (state, event) {
        (_, E::Cancel) => (S::Cancelled, Command::Idle),

        (S::Idle, E::BaseSubmitted { job, chain_pbr }) => (
            S::BasePending {
                job: job.clone(),
                chain_pbr,
            },
            Command::Poll(job),
        ),
        (S::Idle | S::PbrQueued { .. }, E::SubmitRejected(reason)) => {
            fail(Error::Submission(reason))
        }

        (S::BasePending { job, chain_pbr }, E::Polled(outcome)) => match outcome {
            PollOutcome::Pending => (
                S::BasePending {
                    job: job.clone(),
                    chain_pbr,
                },
                Command::Poll(job),
            ),
            PollOutcome::Succeeded(maps) => match maps.base_color_url() {
                None => fail(Error::Poll(NO_OUTPUT.into())),
                Some(url) if chain_pbr => {
                    let image_url = url.to_owned();
                    (S::PbrQueued { base: maps }, Command::SubmitPbr { image_url })
                }
                Some(_) => (S::Done(maps.clone()), Command::Deliver(maps)),
            },
            PollOutcome::Failed(reason) => fail(Error::RemoteFailure(reason)),
        },

        (S::PbrQueued { base }, E::PbrSubmitted(job)) => {
            (S::PbrPending { job: job.clone(), base }, Command::Poll(job))
        }

        (S::PbrPending { job, base }, E::Polled(outcome)) => match outcome {
            PollOutcome::Pending => (S::PbrPending { job: job.clone(), base }, Command::Poll(job)),
            PollOutcome::Succeeded(maps) if maps.is_empty() => fail(Error::Poll(NO_OUTPUT.into())),
            PollOutcome::Succeeded(maps) => {
                let all = base.merged(maps);
                (S::Done(all.clone()), Command::Deliver(all))
            }
            PollOutcome::Failed(reason) => fail(Error::RemoteFailure(reason)),
        },

        (S::BasePending { .. } | S::PbrPending { .. }, E::PollFailed(reason)) => {
            fail(Error::Poll(reason))
        }

        // Out-of-order events leave the state alone.
        (state, _) => (state, Command::Idle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::MapName;

    fn id(s: &str) -> JobId {
        JobId::new(s)
    }

    fn pbr_maps() -> TextureMaps {
        TextureMaps::new()
            .with(MapName::Normal, "n.png")
            .with(MapName::Roughness, "r.png")
    }

    #[test]
    fn base_only_run_delivers_base_maps() {
        let (s, cmd) = advance(
            PollerState::Idle,
            PollEvent::BaseSubmitted {
                job: id("b1"),
                chain_pbr: false,
            },
        );
        assert!(matches!(cmd, Command::Poll(ref j) if j.as_str() == "b1"));

        let (s, cmd) = advance(s, PollEvent::Polled(PollOutcome::Pending));
        assert!(matches!(s, PollerState::BasePending { .. }));
        assert!(matches!(cmd, Command::Poll(_)));

        let maps = TextureMaps::base_color("base.png");
        let (s, cmd) = advance(s, PollEvent::Polled(PollOutcome::Succeeded(maps.clone())));
        assert_eq!(s, PollerState::Done(maps.clone()));
        assert!(matches!(cmd, Command::Deliver(ref m) if *m == maps));
    }

    #[test]
    fn full_pbr_run_chains_second_job() {
        let s = PollerState::BasePending {
            job: id("b1"),
            chain_pbr: true,
        };
        let (s, cmd) = advance(
            s,
            PollEvent::Polled(PollOutcome::Succeeded(TextureMaps::base_color("base.png"))),
        );
        assert!(matches!(s, PollerState::PbrQueued { .. }));
        assert!(matches!(cmd, Command::SubmitPbr { ref image_url } if image_url == "base.png"));

        let (s, cmd) = advance(s, PollEvent::PbrSubmitted(id("p1")));
        assert_eq!(s.current_job(), Some(&id("p1")));
        assert!(matches!(cmd, Command::Poll(ref j) if j.as_str() == "p1"));

        let (s, cmd) = advance(s, PollEvent::Polled(PollOutcome::Succeeded(pbr_maps())));
        let PollerState::Done(all) = &s else {
            panic!("expected Done, got {s:?}");
        };
        assert_eq!(all.len(), 3);
        assert_eq!(all.base_color_url(), Some("base.png"));
        assert!(matches!(cmd, Command::Deliver(_)));
    }

    #[test]
    fn remote_failure_is_terminal() {
        let s = PollerState::PbrPending {
            job: id("p1"),
            base: TextureMaps::base_color("base.png"),
        };
        let (s, cmd) = advance(s, PollEvent::Polled(PollOutcome::Failed("oom".into())));
        assert!(matches!(s, PollerState::Failed(ref msg) if msg.contains("oom")));
        assert!(matches!(cmd, Command::Report(Error::RemoteFailure(_))));
    }

    #[test]
    fn transport_error_is_terminal() {
        let s = PollerState::BasePending {
            job: id("b1"),
            chain_pbr: true,
        };
        let (s, cmd) = advance(s, PollEvent::PollFailed("timeout".into()));
        assert!(s.is_terminal());
        assert!(matches!(cmd, Command::Report(Error::Poll(_))));
    }

    #[test]
    fn success_without_output_fails() {
        let s = PollerState::BasePending {
            job: id("b1"),
            chain_pbr: false,
        };
        let (s, cmd) = advance(s, PollEvent::Polled(PollOutcome::Succeeded(TextureMaps::new())));
        assert!(matches!(s, PollerState::Failed(ref msg) if msg.contains("no output image URL")));
        assert!(matches!(cmd, Command::Report(Error::Poll(_))));
    }

    #[test]
    fn terminal_states_ignore_events() {
        for terminal in [
            PollerState::Done(TextureMaps::base_color("a.png")),
            PollerState::Failed("x".into()),
            PollerState::Cancelled,
        ] {
            for event in [
                PollEvent::Polled(PollOutcome::Succeeded(pbr_maps())),
                PollEvent::Polled(PollOutcome::Failed("late".into())),
                PollEvent::PollFailed("late".into()),
                PollEvent::Cancel,
            ] {
                let (s, cmd) = advance(terminal.clone(), event);
                assert_eq!(s, terminal);
                assert!(matches!(cmd, Command::Idle));
            }
        }
    }

    #[test]
    fn cancel_discards_pending_job() {
        let s = PollerState::PbrQueued {
            base: TextureMaps::base_color("a.png"),
        };
        let (s, cmd) = advance(s, PollEvent::Cancel);
        assert_eq!(s, PollerState::Cancelled);
        assert!(s.current_job().is_none());
        assert!(matches!(cmd, Command::Idle));
    }

    #[test]
    fn rejected_pbr_submission_fails() {
        let s = PollerState::PbrQueued {
            base: TextureMaps::base_color("a.png"),
        };
        let (s, cmd) = advance(s, PollEvent::SubmitRejected("quota".into()));
        assert!(matches!(s, PollerState::Failed(_)));
        assert!(matches!(cmd, Command::Report(Error::Submission(_))));
    }
}
