use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::codec::RawStep;

/// A failed attempt to obtain one step record. All variants are retryable
/// from the sequencer's point of view.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("service answered HTTP {0}")]
    Http(u16),
    #[error("malformed step record: {0}")]
    Malformed(String),
}

/// Hands one raw step record to the pipeline. `Ok(None)` means the source
/// has no more steps; that terminates the run without error.
pub trait StepSource {
    fn fetch(&mut self, step: u32) -> Result<Option<RawStep>, SourceError>;
}

/// Poll mode: one POST per step against the live simulation endpoint.
/// The service expects `{"step": N}` (1-based) and answers 404 past the
/// last recorded step.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::blocking::Client::new(), url: url.into() }
    }
}

impl StepSource for HttpSource {
    fn fetch(&mut self, step: u32) -> Result<Option<RawStep>, SourceError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "step": step }))
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Http(resp.status().as_u16()));
        }
        let raw = resp
            .json::<RawStep>()
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(Some(raw))
    }
}

#[derive(Deserialize, Debug)]
struct BatchCapture {
    #[serde(default)]
    simulation_data: Vec<RawStep>,
}

/// Batch mode: index into a pre-fetched ordered collection of steps, as
/// dumped by the service into its capture file.
pub struct BatchSource {
    steps: Vec<RawStep>,
}

impl BatchSource {
    pub fn new(steps: Vec<RawStep>) -> Self {
        Self { steps }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("open capture file {}", path.display()))?;
        let capture: BatchCapture = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse capture file {}", path.display()))?;
        Ok(Self::new(capture.simulation_data))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl StepSource for BatchSource {
    fn fetch(&mut self, step: u32) -> Result<Option<RawStep>, SourceError> {
        // Steps are 1-based on the wire, matching the live endpoint.
        let idx = step.checked_sub(1).map(|i| i as usize);
        Ok(idx.and_then(|i| self.steps.get(i)).cloned())
    }
}
