//! Shared helpers for unit tests.

use std::{cell::RefCell, sync::Arc};

use tokio::sync::Notify;

use tessera_core::{theme::ThemePreference, vector::VectorOutput};

use crate::renderer::{LayoutScope, Renderer, RendererError, RendererOptions};

pub(crate) const FAKE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80" viewBox="0 0 120 80"><rect x="10" y="10" width="100" height="60" fill="#336699"/></svg>"##;

/// A one-shot latch a test opens to release a parked layout pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct Gate(Arc<Notify>);

impl Gate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn open(&self) {
        self.0.notify_one();
    }

    async fn wait(&self) {
        self.0.notified().await;
    }
}

/// Renderer double with scripted failures.
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    syntax_error: Option<String>,
    layout_error: Option<String>,
    markup: Option<String>,
    held: Option<Gate>,
    configured_theme: Option<ThemePreference>,
    layout_themes: RefCell<Vec<ThemePreference>>,
    layouts: RefCell<usize>,
}

impl FakeRenderer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rejects every text during validation.
    pub(crate) fn reject_syntax(mut self, message: &str) -> Self {
        self.syntax_error = Some(message.to_string());
        self
    }

    /// Fails every layout pass.
    pub(crate) fn fail_layout(mut self, message: &str) -> Self {
        self.layout_error = Some(message.to_string());
        self
    }

    /// Returns `markup` from layout instead of [`FAKE_SVG`].
    pub(crate) fn with_markup(mut self, markup: &str) -> Self {
        self.markup = Some(markup.to_string());
        self
    }

    /// Parks the first layout pass until `gate` opens. Later passes run
    /// straight through.
    pub(crate) fn hold_layout_on(mut self, gate: Gate) -> Self {
        self.held = Some(gate);
        self
    }

    pub(crate) fn configured_theme(&self) -> Option<ThemePreference> {
        self.configured_theme
    }

    pub(crate) fn layout_themes(&self) -> Vec<ThemePreference> {
        self.layout_themes.borrow().clone()
    }
}

impl Renderer for FakeRenderer {
    fn configure(&mut self, options: &RendererOptions) -> Result<(), RendererError> {
        self.configured_theme = Some(options.theme);
        Ok(())
    }

    async fn validate(&self, _source: &str) -> Result<(), RendererError> {
        if self.configured_theme.is_none() {
            return Err(RendererError::NotInitialized);
        }
        match &self.syntax_error {
            Some(message) => Err(RendererError::SyntaxInvalid(message.clone())),
            None => Ok(()),
        }
    }

    async fn layout(&self, scope: LayoutScope<'_>) -> Result<VectorOutput, RendererError> {
        self.layout_themes.borrow_mut().push(scope.theme);
        let pass = {
            let mut layouts = self.layouts.borrow_mut();
            *layouts += 1;
            *layouts
        };

        if let (1, Some(gate)) = (pass, &self.held) {
            gate.wait().await;
        }

        if let Some(message) = &self.layout_error {
            return Err(RendererError::RenderFailed(message.clone()));
        }
        Ok(VectorOutput::new(
            self.markup.as_deref().unwrap_or(FAKE_SVG),
        ))
    }
}
