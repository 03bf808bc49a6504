//! Render orchestration.
//!
//! [`RenderOrchestrator`] owns a configured [`Renderer`] and drives one
//! render call through validation, mounting and layout. Only two conditions
//! escape as errors: an unconfigured renderer and a missing container. Every
//! renderer failure becomes a [`RenderResult`] plus diagnostic content in the
//! target container.

use log::{debug, error, info, warn};
use thiserror::Error;

use tessera_classify::{count, resolve};
use tessera_core::{
    kind::{DiagramKind, RequestedKind},
    theme::ThemePreference,
};

use crate::{
    renderer::{LayoutScope, Renderer, RendererError, RendererOptions},
    stage::{ContainerId, DiagramId, MountedDiagram, Stage},
};

/// Conditions that prevent a render from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Renderer is not initialized")]
    NotInitialized,

    #[error("Container with id '{0}' not found")]
    ContainerNotFound(ContainerId),
}

/// The renderer pass that rejected a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Validation,
    Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The diagram is mounted under this identifier.
    Rendered(DiagramId),
    Failed {
        stage: FailureStage,
        message: String,
    },
    /// A newer render on the same container started before this one
    /// finished; its output was dropped.
    Superseded,
}

/// The outcome of one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub kind: DiagramKind,
    pub element_count: usize,
    pub outcome: RenderOutcome,
}

impl RenderResult {
    fn rendered(kind: DiagramKind, element_count: usize, id: DiagramId) -> Self {
        Self {
            kind,
            element_count,
            outcome: RenderOutcome::Rendered(id),
        }
    }

    fn failure(kind: DiagramKind, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            kind,
            element_count: 0,
            outcome: RenderOutcome::Failed {
                stage,
                message: message.into(),
            },
        }
    }

    fn superseded(kind: DiagramKind) -> Self {
        Self {
            kind,
            element_count: 0,
            outcome: RenderOutcome::Superseded,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, RenderOutcome::Rendered(_))
    }

    pub fn diagram_id(&self) -> Option<&DiagramId> {
        match &self.outcome {
            RenderOutcome::Rendered(id) => Some(id),
            RenderOutcome::Failed { .. } | RenderOutcome::Superseded => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            RenderOutcome::Failed { message, .. } => Some(message),
            RenderOutcome::Rendered(_) | RenderOutcome::Superseded => None,
        }
    }
}

/// Drives renders against a [`Stage`] with an injected [`Renderer`].
#[derive(Debug)]
pub struct RenderOrchestrator<R> {
    renderer: R,
    options: Option<RendererOptions>,
}

impl<R: Renderer> RenderOrchestrator<R> {
    /// Wraps an unconfigured renderer. Call [`configure`](Self::configure)
    /// before the first render.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            options: None,
        }
    }

    /// Applies the one-time renderer configuration.
    pub fn configure(&mut self, options: RendererOptions) -> Result<(), RendererError> {
        self.renderer.configure(&options)?;
        info!(theme:% = options.theme, security_level:? = options.security_level; "Renderer configured");
        self.options = Some(options);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.options.is_some()
    }

    /// Returns the theme applied to layout passes.
    pub fn theme(&self) -> ThemePreference {
        self.options
            .as_ref()
            .map(|options| options.theme)
            .unwrap_or_default()
    }

    /// Re-applies the renderer configuration with a new theme.
    ///
    /// Does nothing before the renderer is configured.
    pub fn set_theme(&mut self, theme: ThemePreference) -> Result<(), RendererError> {
        let Some(options) = self.options.take() else {
            return Ok(());
        };
        let options = options.with_theme(theme);
        let result = self.renderer.configure(&options);
        self.options = Some(options);
        result
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renders `text` into `container`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotInitialized`] before configuration and
    /// [`RenderError::ContainerNotFound`] when `container` is not on the
    /// stage. Renderer failures are reported through the returned
    /// [`RenderResult`].
    pub async fn render(
        &self,
        text: &str,
        stage: &Stage,
        container: &ContainerId,
        requested: RequestedKind,
    ) -> Result<RenderResult, RenderError> {
        let options = self.options.as_ref().ok_or(RenderError::NotInitialized)?;
        let token = stage
            .begin_request(container)
            .ok_or_else(|| RenderError::ContainerNotFound(container.clone()))?;

        let kind = resolve(requested, text);
        debug!(container:% = container, kind:% = kind, token; "Rendering diagram");

        if let Err(err) = self.renderer.validate(text).await {
            let message = err.to_string();
            warn!(container:% = container, err:% = message; "Diagram failed validation");
            if !stage.show_diagnostic(container, token, message.as_str()) {
                return Ok(RenderResult::superseded(kind));
            }
            return Ok(RenderResult::failure(kind, FailureStage::Validation, message));
        }

        let id = DiagramId::next();
        let mounted = MountedDiagram {
            id: id.clone(),
            source: text.to_string(),
            kind,
            vector: None,
        };
        if !stage.mount(container, token, mounted) {
            return Ok(RenderResult::superseded(kind));
        }

        let scope = LayoutScope {
            id: &id,
            source: text,
            theme: options.theme,
        };
        let vector = match self.renderer.layout(scope).await {
            Ok(vector) => vector,
            Err(err) => {
                let message = err.to_string();
                error!(diagram:% = id, err:% = message; "Diagram layout failed");
                if !stage.show_diagnostic(container, token, message.as_str()) {
                    return Ok(RenderResult::superseded(kind));
                }
                return Ok(RenderResult::failure(kind, FailureStage::Layout, message));
            }
        };

        if !stage.is_current(container, token) {
            return Ok(RenderResult::superseded(kind));
        }

        if vector.has_svg_root() {
            stage.attach_vector(container, &id, vector);
        } else {
            warn!(diagram:% = id; "Renderer produced no vector output");
        }

        let element_count = count(text);
        info!(diagram:% = id, kind:% = kind, element_count; "Diagram rendered");
        Ok(RenderResult::rendered(kind, element_count, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        stage::Content,
        test_utils::{FakeRenderer, Gate},
    };

    const FLOWCHART: &str = "graph TD\nA[Start]-->B[End]";

    fn configured(renderer: FakeRenderer) -> RenderOrchestrator<FakeRenderer> {
        let mut orchestrator = RenderOrchestrator::new(renderer);
        orchestrator
            .configure(RendererOptions::default())
            .expect("fake renderer configures");
        orchestrator
    }

    fn main_container() -> ContainerId {
        ContainerId::from("diagram-container")
    }

    #[tokio::test]
    async fn test_render_before_configure_is_not_initialized() {
        let orchestrator = RenderOrchestrator::new(FakeRenderer::new());
        let stage = Stage::with_container(main_container());

        let result = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await;
        assert_eq!(result, Err(RenderError::NotInitialized));
    }

    #[tokio::test]
    async fn test_missing_container_is_reported() {
        let orchestrator = configured(FakeRenderer::new());
        let stage = Stage::new();

        let result = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await;
        assert_eq!(result, Err(RenderError::ContainerNotFound(main_container())));
        assert_eq!(
            RenderError::ContainerNotFound(main_container()).to_string(),
            "Container with id 'diagram-container' not found"
        );
    }

    #[tokio::test]
    async fn test_successful_render_mounts_and_counts() {
        let orchestrator = configured(FakeRenderer::new());
        let stage = Stage::with_container(main_container());

        let result = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await
            .expect("render should start");

        assert!(result.success());
        assert_eq!(result.kind, DiagramKind::Flowchart);
        assert_eq!(result.element_count, 3);

        let mounted = stage.first_diagram().expect("diagram should be mounted");
        assert_eq!(Some(&mounted.id), result.diagram_id());
        assert_eq!(mounted.source, FLOWCHART);
        assert!(mounted.vector.is_some());
    }

    #[tokio::test]
    async fn test_explicit_kind_skips_detection() {
        let orchestrator = configured(FakeRenderer::new());
        let stage = Stage::with_container(main_container());

        let result = orchestrator
            .render(
                FLOWCHART,
                &stage,
                &main_container(),
                RequestedKind::Explicit(DiagramKind::State),
            )
            .await
            .unwrap();
        assert_eq!(result.kind, DiagramKind::State);
        assert_eq!(stage.first_diagram().unwrap().kind, DiagramKind::State);
    }

    #[tokio::test]
    async fn test_validation_failure_shows_diagnostic() {
        let orchestrator = configured(FakeRenderer::new().reject_syntax("Parse error on line 2"));
        let stage = Stage::with_container(main_container());

        let result = orchestrator
            .render("graph TD\nA-->", &stage, &main_container(), RequestedKind::Auto)
            .await
            .expect("validation failure is not an error");

        assert!(!result.success());
        assert_eq!(result.kind, DiagramKind::Flowchart);
        assert_eq!(result.error_message(), Some("Parse error on line 2"));
        assert_eq!(
            stage.content(&main_container()),
            Some(Content::Diagnostic("Parse error on line 2".to_string()))
        );
    }

    #[tokio::test]
    async fn test_layout_failure_shows_diagnostic() {
        let orchestrator = configured(FakeRenderer::new().fail_layout("renderer crashed"));
        let stage = Stage::with_container(main_container());

        let result = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await
            .unwrap();

        assert_eq!(
            result.outcome,
            RenderOutcome::Failed {
                stage: FailureStage::Layout,
                message: "renderer crashed".to_string(),
            }
        );
        assert!(!stage.has_diagram());
    }

    #[tokio::test]
    async fn test_markup_without_svg_root_is_not_stored() {
        let orchestrator = configured(FakeRenderer::new().with_markup("<div>no drawing</div>"));
        let stage = Stage::with_container(main_container());

        let result = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(stage.first_diagram().unwrap().vector, None);
    }

    #[tokio::test]
    async fn test_layout_uses_current_theme() {
        let mut orchestrator = configured(FakeRenderer::new());
        orchestrator
            .set_theme(ThemePreference::Dark)
            .expect("re-theme should succeed");
        let stage = Stage::with_container(main_container());

        orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await
            .unwrap();

        assert_eq!(orchestrator.theme(), ThemePreference::Dark);
        assert_eq!(orchestrator.renderer().layout_themes(), [ThemePreference::Dark]);
        assert_eq!(
            orchestrator.renderer().configured_theme(),
            Some(ThemePreference::Dark)
        );
    }

    #[tokio::test]
    async fn test_each_render_mounts_a_fresh_element() {
        let orchestrator = configured(FakeRenderer::new());
        let stage = Stage::with_container(main_container());

        let first = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await
            .unwrap();
        let second = orchestrator
            .render(FLOWCHART, &stage, &main_container(), RequestedKind::Auto)
            .await
            .unwrap();

        assert_ne!(first.diagram_id(), second.diagram_id());
        assert_eq!(stage.rendered_diagrams().len(), 1);
        assert_eq!(
            Some(&stage.first_diagram().unwrap().id),
            second.diagram_id()
        );
    }

    #[tokio::test]
    async fn test_other_containers_are_untouched() {
        let orchestrator = configured(FakeRenderer::new());
        let stage = Stage::new();
        stage.register("left");
        stage.register("right");

        orchestrator
            .render(FLOWCHART, &stage, &ContainerId::from("left"), RequestedKind::Auto)
            .await
            .unwrap();
        orchestrator
            .render("pie title X\n\"A\":10", &stage, &ContainerId::from("right"), RequestedKind::Auto)
            .await
            .unwrap();

        let sources: Vec<String> = stage
            .rendered_diagrams()
            .into_iter()
            .map(|diagram| diagram.source)
            .collect();
        assert_eq!(sources, [FLOWCHART, "pie title X\n\"A\":10"]);
    }

    #[tokio::test]
    async fn test_newer_render_supersedes_older_one() {
        let gate = Gate::new();
        let orchestrator = configured(FakeRenderer::new().hold_layout_on(gate.clone()));
        let stage = Stage::with_container(main_container());
        let container = main_container();

        let slow = orchestrator.render(FLOWCHART, &stage, &container, RequestedKind::Auto);
        let fast = async {
            // Let the slow render mount and park in layout first.
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            let result = orchestrator
                .render("graph LR\nX-->Y", &stage, &container, RequestedKind::Auto)
                .await;
            gate.open();
            result
        };

        let (slow, fast) = tokio::join!(slow, fast);
        let slow = slow.unwrap();
        let fast = fast.unwrap();

        assert_eq!(slow.outcome, RenderOutcome::Superseded);
        assert!(fast.success());
        let mounted = stage.first_diagram().unwrap();
        assert_eq!(mounted.source, "graph LR\nX-->Y");
        assert_eq!(Some(&mounted.id), fast.diagram_id());
    }
}
