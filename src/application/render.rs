//! Seam to the external MJML compiler.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{Diagnostic, RenderOptions};

/// Successful compilation. `errors` may be non-empty while HTML was still
/// produced (soft/skip validation); emission order is preserved.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub html: String,
    pub errors: Vec<Diagnostic>,
}

/// Failure thrown by the compiler. Which failures are thrown versus returned
/// in `RenderOutput::errors` is the renderer's decision, not ours.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderFailure {
    #[error("{message}")]
    Parse {
        line: u32,
        column: u32,
        message: String,
    },
    #[error("{formatted_message}")]
    Validation {
        line: u32,
        tag_name: String,
        message: String,
        formatted_message: String,
    },
    #[error("{0}")]
    Internal(String),
}

impl RenderFailure {
    /// Location-bearing failures carry a diagnostic for the error envelope;
    /// internal failures do not.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Self::Parse {
                line,
                column,
                message,
            } => Some(Diagnostic::Parse {
                line: *line,
                column: *column,
                message: message.clone(),
            }),
            Self::Validation {
                line,
                tag_name,
                message,
                formatted_message,
            } => Some(Diagnostic::Validation {
                line: *line,
                tag_name: tag_name.clone(),
                message: message.clone(),
                formatted_message: formatted_message.clone(),
            }),
            Self::Internal(_) => None,
        }
    }
}

/// External markup-to-HTML compiler. Implementations live at the infra
/// boundary; handlers only ever see this contract.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        source: &str,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderFailure>;

    /// Version string surfaced in render and health responses.
    fn version(&self) -> &'static str;
}
