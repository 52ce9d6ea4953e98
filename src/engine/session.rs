//! Session state machine for an engine under test.
//!
//! ```text
//! Unconfigured --initialize_enrollment--> EnrollmentSession
//!     --finalize--> EnrollmentFinalized
//!     --initialize_identification--> IdentificationSession
//! ```
//!
//! Each state is a distinct type that owns the engine. Transitions consume
//! the previous state, so template creation with the wrong role, search
//! before finalization, or a second finalization do not compile. A failed
//! transition is fatal and surfaces as [`Error::Engine`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{IdentEngine, Label, SearchOutcome, Status, Template, TemplateRole};
use crate::error::{Error, Result};
use crate::image::ProbeImage;

/// Lifecycle position of an engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Engine constructed, nothing loaded.
    Unconfigured,
    /// Accepting enrollment templates.
    EnrollmentSession,
    /// Gallery frozen and read-only.
    EnrollmentFinalized,
    /// Accepting search templates and searches.
    IdentificationSession,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unconfigured => "unconfigured",
            Self::EnrollmentSession => "enrollment session",
            Self::EnrollmentFinalized => "enrollment finalization",
            Self::IdentificationSession => "identification session",
        };
        f.write_str(text)
    }
}

/// Engine before any session was opened.
pub struct Unconfigured<E> {
    engine: E,
}

impl<E: IdentEngine> Unconfigured<E> {
    /// Current state.
    pub const STATE: SessionState = SessionState::Unconfigured;

    /// Take ownership of a freshly constructed engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Engine identifier.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Open the enrollment session.
    pub fn initialize_enrollment(mut self, resource_dir: &Path) -> Result<EnrollmentSession<E>> {
        self.engine
            .initialize_enrollment_session(resource_dir)
            .map_err(|status| Error::Engine {
                stage: SessionState::EnrollmentSession,
                status,
            })?;
        Ok(EnrollmentSession {
            engine: self.engine,
        })
    }
}

/// Engine accepting enrollment templates.
pub struct EnrollmentSession<E> {
    engine: E,
}

impl<E: IdentEngine> EnrollmentSession<E> {
    /// Current state.
    pub const STATE: SessionState = SessionState::EnrollmentSession;

    /// Engine identifier.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Create an enrollment template. A failure only affects this image.
    pub fn create_template(&mut self, image: &ProbeImage) -> std::result::Result<Template, Status> {
        self.engine.create_template(image, TemplateRole::Enrollment)
    }

    /// Freeze the gallery, handing every template over to the engine.
    pub fn finalize(mut self, gallery: Vec<(Label, Template)>) -> Result<EnrollmentFinalized<E>> {
        self.engine
            .finalize_enrollment(gallery)
            .map_err(|status| Error::Engine {
                stage: SessionState::EnrollmentFinalized,
                status,
            })?;
        Ok(EnrollmentFinalized {
            engine: self.engine,
        })
    }
}

/// Engine holding a frozen gallery.
pub struct EnrollmentFinalized<E> {
    engine: E,
}

impl<E: IdentEngine> EnrollmentFinalized<E> {
    /// Current state.
    pub const STATE: SessionState = SessionState::EnrollmentFinalized;

    /// Engine identifier.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Open the identification session.
    pub fn initialize_identification(
        mut self,
        resource_dir: &Path,
    ) -> Result<IdentificationSession<E>> {
        self.engine
            .initialize_identification_session(resource_dir)
            .map_err(|status| Error::Engine {
                stage: SessionState::IdentificationSession,
                status,
            })?;
        Ok(IdentificationSession {
            engine: self.engine,
        })
    }
}

/// Engine accepting search templates and searches.
pub struct IdentificationSession<E> {
    engine: E,
}

impl<E: IdentEngine> IdentificationSession<E> {
    /// Current state.
    pub const STATE: SessionState = SessionState::IdentificationSession;

    /// Engine identifier.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Create a search template. A failure only affects this image.
    pub fn create_template(&mut self, image: &ProbeImage) -> std::result::Result<Template, Status> {
        self.engine.create_template(image, TemplateRole::Search)
    }

    /// Search the gallery.
    ///
    /// Candidate order is kept exactly as the engine returned it. Lists longer
    /// than `candidate_count` are cut to that length.
    pub fn identify(
        &mut self,
        template: &Template,
        candidate_count: usize,
    ) -> std::result::Result<SearchOutcome, Status> {
        let mut outcome = self.engine.identify_template(template, candidate_count)?;
        if outcome.candidates.len() > candidate_count {
            tracing::warn!(
                returned = outcome.candidates.len(),
                requested = candidate_count,
                "engine returned more candidates than requested; truncating"
            );
            outcome.candidates.truncate(candidate_count);
        }
        Ok(outcome)
    }

    /// Release the engine at the end of the run.
    pub fn into_engine(self) -> E {
        self.engine
    }
}
