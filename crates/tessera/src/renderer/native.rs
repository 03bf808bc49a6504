//! In-process rendering through `mermaid-rs-renderer`.

use log::{debug, trace};
use mermaid_rs_renderer::{LayoutConfig, RenderOptions, Theme, parse_mermaid};

use tessera_core::{theme::ThemePreference, vector::VectorOutput};

use super::{LayoutScope, Renderer, RendererError, RendererOptions};

/// Pure-Rust Mermaid renderer.
///
/// Validation only parses the text. Layout runs on the blocking pool, so
/// timers on a current-thread runtime keep firing while a large diagram
/// renders.
#[derive(Debug, Default)]
pub struct NativeRenderer {
    options: Option<RendererOptions>,
}

impl NativeRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn render(source: &str, theme: ThemePreference) -> Result<String, String> {
    let options = RenderOptions {
        theme: mermaid_theme(theme),
        layout: LayoutConfig::default(),
    };
    mermaid_rs_renderer::render_with_options(source, options).map_err(|err| err.to_string())
}

impl Renderer for NativeRenderer {
    fn configure(&mut self, options: &RendererOptions) -> Result<(), RendererError> {
        debug!(theme:% = options.theme; "Configuring native renderer");
        self.options = Some(options.clone());
        Ok(())
    }

    async fn validate(&self, source: &str) -> Result<(), RendererError> {
        if self.options.is_none() {
            return Err(RendererError::NotInitialized);
        }
        tokio::task::yield_now().await;

        parse_mermaid(source)
            .map(|_| ())
            .map_err(|err| RendererError::SyntaxInvalid(err.to_string()))
    }

    async fn layout(&self, scope: LayoutScope<'_>) -> Result<VectorOutput, RendererError> {
        if self.options.is_none() {
            return Err(RendererError::NotInitialized);
        }
        let source = scope.source.to_string();
        let theme = scope.theme;
        let markup = tokio::task::spawn_blocking(move || render(&source, theme))
            .await
            .map_err(|err| RendererError::RenderFailed(err.to_string()))?
            .map_err(RendererError::RenderFailed)?;
        trace!(id:% = scope.id, bytes = markup.len(); "Native layout produced SVG");
        Ok(VectorOutput::new(markup))
    }
}

/// Builds the renderer palette for a theme preference.
///
/// Light uses the crate's modern palette unchanged; dark swaps in a dark
/// surface and light text on top of it.
fn mermaid_theme(theme: ThemePreference) -> Theme {
    match theme {
        ThemePreference::Light => Theme::modern(),
        ThemePreference::Dark => {
            let background = theme.background().to_hex();
            Theme {
                background,
                primary_color: "#313244".to_string(),
                primary_text_color: "#cdd6f4".to_string(),
                primary_border_color: "#89b4fa".to_string(),
                line_color: "#a6adc8".to_string(),
                secondary_color: "#45475a".to_string(),
                tertiary_color: "#585b70".to_string(),
                edge_label_background: "#313244".to_string(),
                cluster_background: "#181825".to_string(),
                cluster_border: "#6c7086".to_string(),
                text_color: "#cdd6f4".to_string(),
                ..Theme::modern()
            }
        }
    }
}
