//! Remote generation jobs and their status.
use std::fmt;

use crate::texture::TextureMaps;

/// Opaque job identifier issued by the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a job in the generation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Text-to-image base texture.
    BaseColor,
    /// Normal, roughness, height and AO maps derived from a base image.
    PbrDerive,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::BaseColor => "base color",
            JobKind::PbrDerive => "PBR maps",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Result of one status check.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Pending,
    Succeeded(TextureMaps),
    /// The service reported failure; carries its error text if any.
    Failed(String),
}

impl PollOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            PollOutcome::Pending => JobStatus::Pending,
            PollOutcome::Succeeded(_) => JobStatus::Succeeded,
            PollOutcome::Failed(_) => JobStatus::Failed,
        }
    }
}

/// A submitted job and what is known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub output: Option<TextureMaps>,
    pub error: Option<String>,
}

impl GenerationJob {
    pub fn new(id: JobId, kind: JobKind) -> Self {
        Self {
            id,
            kind,
            status: JobStatus::Pending,
            output: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a poll result. Returns `false` and leaves the job untouched once it is terminal.
    pub fn observe(&mut self, outcome: PollOutcome) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = outcome.status();
        match outcome {
            PollOutcome::Pending => {}
            PollOutcome::Succeeded(maps) => self.output = Some(maps),
            PollOutcome::Failed(reason) => self.error = Some(reason),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_settles_exactly_once() {
        let mut job = GenerationJob::new(JobId::new("abc"), JobKind::BaseColor);
        assert!(job.observe(PollOutcome::Pending));
        assert_eq!(job.status, JobStatus::Pending);

        assert!(job.observe(PollOutcome::Failed("nsfw".into())));
        assert_eq!(job.status, JobStatus::Failed);

        assert!(!job.observe(PollOutcome::Succeeded(TextureMaps::base_color("x.png"))));
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.output.is_none());
        assert_eq!(job.error.as_deref(), Some("nsfw"));
    }

    #[test]
    fn success_keeps_output() {
        let mut job = GenerationJob::new(JobId::new("abc"), JobKind::PbrDerive);
        job.observe(PollOutcome::Succeeded(TextureMaps::base_color("x.png")));
        assert!(job.is_terminal());
        assert_eq!(
            job.output.as_ref().and_then(|m| m.base_color_url()),
            Some("x.png")
        );
    }
}
