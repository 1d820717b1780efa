//! mrml-backed implementation of the renderer seam.

pub mod diagnostics;

use async_trait::async_trait;

use crate::application::render::{RenderFailure, RenderOutput, Renderer};
use crate::domain::types::RenderOptions;

/// Compiler version reported in render and health responses.
const ENGINE_VERSION: &str = "mrml-4";

/// In-process MJML compiler. Fatal syntax problems surface as parse
/// failures; `keep_comments` maps onto the engine's comment switch, while
/// `beautify`, `minify`, and the validation level are outside this engine's
/// capability set and pass through unused.
#[derive(Debug, Default, Clone)]
pub struct MrmlRenderer;

impl MrmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Renderer for MrmlRenderer {
    async fn render(
        &self,
        source: &str,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderFailure> {
        let parsed = mrml::parse(source)
            .map_err(|err| diagnostics::translate_parse_failure(source, &err.to_string()))?;

        let mut render_options = mrml::prelude::render::RenderOptions::default();
        render_options.disable_comments = !options.keep_comments;

        let html = parsed
            .render(&render_options)
            .map_err(|err| RenderFailure::Internal(err.to_string()))?;

        Ok(RenderOutput {
            html,
            errors: Vec::new(),
        })
    }

    fn version(&self) -> &'static str {
        ENGINE_VERSION
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::types::ValidationLevel;

    use super::*;

    fn options() -> RenderOptions {
        RenderOptions {
            keep_comments: true,
            beautify: false,
            minify: false,
            validation_level: ValidationLevel::Soft,
        }
    }

    #[tokio::test]
    async fn renders_a_valid_document() {
        let renderer = MrmlRenderer::new();
        let output = renderer
            .render(
                "<mjml><mj-body><mj-text>Hello</mj-text></mj-body></mjml>",
                &options(),
            )
            .await
            .expect("valid document renders");
        assert!(output.html.to_lowercase().contains("<!doctype html>"));
        assert!(output.errors.is_empty());
    }

    #[tokio::test]
    async fn rejects_malformed_markup_as_a_parse_failure() {
        let renderer = MrmlRenderer::new();
        let failure = renderer
            .render("<mjml><mj-body><mj-text>", &options())
            .await
            .expect_err("truncated document fails");
        assert!(matches!(failure, RenderFailure::Parse { .. }));
    }

    #[test]
    fn reports_an_engine_version() {
        assert!(!MrmlRenderer::new().version().is_empty());
    }
}
