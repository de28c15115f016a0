//! Timer-driven poller for chained texture generation jobs.
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::texture::client::{ModelVersions, PredictionClient};
use crate::texture::job::{GenerationJob, JobId, JobKind, JobStatus};
use crate::texture::state::{advance, Command, PollEvent, PollerState};
use crate::texture::wire::PredictionRequest;
use crate::texture::{GenerationMode, GenerationParams, TextureMaps};

/// Progress of a generation request.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    Submitted { job: JobId, kind: JobKind },
    StatusChecked { job: JobId, status: JobStatus },
    /// Final maps, ready for materialization.
    Completed { maps: TextureMaps },
    Failed { message: String },
    Cancelled,
}

/// Receiver of [`GenerationEvent`]s, typically the host's material builder.
pub trait GenerationSink {
    fn send(&mut self, event: GenerationEvent);
}

impl GenerationSink for () {
    #[inline]
    fn send(&mut self, _event: GenerationEvent) {}
}

impl GenerationSink for Vec<GenerationEvent> {
    fn send(&mut self, event: GenerationEvent) {
        self.push(event);
    }
}

impl<F: FnMut(GenerationEvent)> GenerationSink for F {
    fn send(&mut self, event: GenerationEvent) {
        self(event);
    }
}

/// Result of one [`TexturePoller::tick`].
#[derive(Debug)]
pub enum Tick {
    /// No request in flight.
    Inactive,
    /// Still running; call `tick` again after the poll interval.
    Waiting,
    Finished(TextureMaps),
    Failed(Error),
}

impl Tick {
    pub fn is_waiting(&self) -> bool {
        matches!(self, Tick::Waiting)
    }
}

/// Drives one generation request at a time.
pub struct TexturePoller<C> {
    client: C,
    models: ModelVersions,
    state: PollerState,
    next: Command,
    job: Option<GenerationJob>,
    seamless: bool,
}

impl<C: PredictionClient> TexturePoller<C> {
    pub fn new(client: C, models: ModelVersions) -> Self {
        Self {
            client,
            models,
            state: PollerState::Idle,
            next: Command::Idle,
            job: None,
            seamless: true,
        }
    }

    pub fn state(&self) -> &PollerState {
        &self.state
    }

    /// Job currently tracked, with its last observed status.
    pub fn job(&self) -> Option<&GenerationJob> {
        self.job.as_ref()
    }

    /// A request is submitted and not yet settled.
    pub fn is_generating(&self) -> bool {
        self.state.is_active()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Validates `params` and submits the base-color job.
    ///
    /// Fails without contacting the service when no credential is configured, the prompt
    /// is empty, a parameter is out of range or full-PBR mode lacks a PBR model version.
    pub fn start(
        &mut self,
        params: &GenerationParams,
        sink: &mut dyn GenerationSink,
    ) -> Result<JobId> {
        if self.is_generating() {
            return Err(Error::Submission("a generation is already running".into()));
        }
        if !self.client.has_credential() {
            return Err(Error::Submission(
                "API token not set; check the add-on preferences".into(),
            ));
        }
        params.validate()?;
        let chain_pbr = params.mode == GenerationMode::FullPbr;
        if chain_pbr && self.models.pbr.is_none() {
            return Err(Error::InvalidConfig(
                "full-PBR mode needs a PBR model version".into(),
            ));
        }

        self.state = PollerState::Idle;
        self.next = Command::Idle;
        self.job = None;
        self.seamless = params.seamless;

        let request = PredictionRequest::generate(self.models.base.clone(), params);
        let event = match self.client.submit(&request) {
            Ok(job) => {
                info!("Submitted base texture job {job}.");
                self.track(job.clone(), JobKind::BaseColor, sink);
                PollEvent::BaseSubmitted {
                    job,
                    chain_pbr,
                }
            }
            Err(e) => PollEvent::SubmitRejected(submission_reason(e)),
        };

        match self.apply(event, sink) {
            Tick::Failed(e) => Err(e),
            _ => self
                .state
                .current_job()
                .cloned()
                .ok_or_else(|| Error::Other("poller lost its job".into())),
        }
    }

    /// Performs at most one network round trip and advances the state.
    pub fn tick(&mut self, sink: &mut dyn GenerationSink) -> Tick {
        let event = match std::mem::replace(&mut self.next, Command::Idle) {
            Command::Poll(job) => {
                let kind = self.job.as_ref().map_or(JobKind::BaseColor, |j| j.kind);
                match self.client.poll(&job, kind) {
                    Ok(outcome) => {
                        if let Some(tracked) = self.job.as_mut() {
                            tracked.observe(outcome.clone());
                        }
                        sink.send(GenerationEvent::StatusChecked {
                            job,
                            status: outcome.status(),
                        });
                        PollEvent::Polled(outcome)
                    }
                    Err(e) => {
                        warn!("Status check for {job} failed: {e}");
                        PollEvent::PollFailed(poll_reason(e))
                    }
                }
            }
            Command::SubmitPbr { image_url } => {
                let Some(version) = self.models.pbr.clone() else {
                    return self.apply(
                        PollEvent::SubmitRejected("no PBR model version configured".into()),
                        sink,
                    );
                };
                let request = PredictionRequest::derive_pbr(version, image_url, self.seamless);
                match self.client.submit(&request) {
                    Ok(job) => {
                        info!("Submitted PBR map job {job}.");
                        self.track(job.clone(), JobKind::PbrDerive, sink);
                        PollEvent::PbrSubmitted(job)
                    }
                    Err(e) => PollEvent::SubmitRejected(submission_reason(e)),
                }
            }
            Command::Idle | Command::Deliver(_) | Command::Report(_) => {
                return if self.is_generating() {
                    Tick::Waiting
                } else {
                    Tick::Inactive
                };
            }
        };
        self.apply(event, sink)
    }

    /// Abandons the current request without contacting the service.
    pub fn cancel(&mut self, sink: &mut dyn GenerationSink) {
        if !self.is_generating() {
            return;
        }
        let state = std::mem::take(&mut self.state);
        let (state, _) = advance(state, PollEvent::Cancel);
        self.state = state;
        self.next = Command::Idle;
        self.job = None;
        info!("Texture generation cancelled.");
        sink.send(GenerationEvent::Cancelled);
    }

    fn track(&mut self, job: JobId, kind: JobKind, sink: &mut dyn GenerationSink) {
        self.job = Some(GenerationJob::new(job.clone(), kind));
        sink.send(GenerationEvent::Submitted { job, kind });
    }

    fn apply(&mut self, event: PollEvent, sink: &mut dyn GenerationSink) -> Tick {
        let state = std::mem::take(&mut self.state);
        let (state, command) = advance(state, event);
        self.state = state;

        match command {
            Command::Deliver(maps) => {
                info!("Texture generation finished with {} map(s).", maps.len());
                sink.send(GenerationEvent::Completed { maps: maps.clone() });
                self.next = Command::Idle;
                Tick::Finished(maps)
            }
            Command::Report(error) => {
                warn!("Texture generation stopped: {error}");
                sink.send(GenerationEvent::Failed {
                    message: error.to_string(),
                });
                self.next = Command::Idle;
                Tick::Failed(error)
            }
            Command::Idle => {
                self.next = Command::Idle;
                if self.is_generating() {
                    Tick::Waiting
                } else {
                    Tick::Inactive
                }
            }
            command @ (Command::Poll(_) | Command::SubmitPbr { .. }) => {
                self.next = command;
                Tick::Waiting
            }
        }
    }
}

fn submission_reason(error: Error) -> String {
    match error {
        Error::Submission(reason) => reason,
        other => other.to_string(),
    }
}

fn poll_reason(error: Error) -> String {
    match error {
        Error::Poll(reason) => reason,
        other => other.to_string(),
    }
}
