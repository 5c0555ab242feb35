//! Client-side scan lifecycle.
//!
//! `Idle → Acquiring → Analyzing → (Done | Failed) → Idle`. While a request
//! is in flight a second one is refused; nothing cancels the first.

use crate::analysis::model::AnalysisResult;
use crate::error::{PlastiscanError, PlastiscanResult};

/// Where a scan currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    /// Capturing or reading an image.
    Acquiring,
    /// Waiting on the analysis endpoint.
    Analyzing { image: String },
    Done(AnalysisResult),
    Failed(String),
}

impl ScanState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Analyzing { .. } => "analyzing",
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
        }
    }
}

/// One user's scan, driven by the client.
#[derive(Debug, Clone)]
pub struct ScanSession {
    state: ScanState,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self { state: ScanState::Idle }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// The loading flag.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ScanState::Analyzing { .. })
    }

    /// Start capturing or uploading an image.
    pub fn acquire(&mut self) -> PlastiscanResult<()> {
        match self.state {
            ScanState::Idle => {
                self.state = ScanState::Acquiring;
                Ok(())
            }
            _ => Err(self.invalid("acquiring")),
        }
    }

    /// Image acquired; the request is about to be sent.
    pub fn begin_analysis(&mut self, image: impl Into<String>) -> PlastiscanResult<()> {
        match self.state {
            ScanState::Idle | ScanState::Acquiring => {
                self.state = ScanState::Analyzing { image: image.into() };
                Ok(())
            }
            _ => Err(self.invalid("analyzing")),
        }
    }

    /// Record the endpoint's answer. A result carrying an error moves to
    /// `Failed` so the client shows the error panel.
    pub fn complete(&mut self, result: AnalysisResult) -> PlastiscanResult<()> {
        if !self.is_loading() {
            return Err(self.invalid("done"));
        }
        self.state = match result.error.clone() {
            Some(error) => ScanState::Failed(error),
            None => ScanState::Done(result),
        };
        Ok(())
    }

    /// Record a transport failure.
    pub fn fail(&mut self, message: impl Into<String>) -> PlastiscanResult<()> {
        match self.state {
            ScanState::Acquiring | ScanState::Analyzing { .. } => {
                self.state = ScanState::Failed(message.into());
                Ok(())
            }
            _ => Err(self.invalid("failed")),
        }
    }

    /// Discard the current result and start over.
    pub fn reset(&mut self) -> PlastiscanResult<()> {
        if self.is_loading() {
            return Err(self.invalid("idle"));
        }
        self.state = ScanState::Idle;
        Ok(())
    }

    fn invalid(&self, to: &str) -> PlastiscanError {
        PlastiscanError::Session {
            from: self.state.name().to_string(),
            to: to.to_string(),
        }
    }
}
