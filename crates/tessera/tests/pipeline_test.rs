//! Integration tests for the render and export pipeline
//!
//! These tests drive the public API end to end: classification, rendering
//! into a stage, export, and the editor controller.

use std::path::PathBuf;

use tessera::{
    DiagramKind, ExportFormat, RequestedKind, ThemePreference, VectorOutput,
    clipboard::MemoryClipboard,
    controller::{Action, Controller, StatusLevel},
    export::{ExportError, Exporter, PathSink},
    orchestrator::{RenderError, RenderOrchestrator},
    renderer::{LayoutScope, NativeRenderer, Renderer, RendererError, RendererOptions},
    stage::{ContainerId, Stage},
    storage::{FileStorage, LAST_TEXT_KEY, MemoryStorage, Storage, THEME_KEY},
};

const CONTAINER: &str = "diagram-container";

/// Renderer that draws every diagram as a fixed rectangle.
#[derive(Default)]
struct BoxRenderer {
    configured: bool,
}

impl Renderer for BoxRenderer {
    fn configure(&mut self, _options: &RendererOptions) -> Result<(), RendererError> {
        self.configured = true;
        Ok(())
    }

    async fn validate(&self, source: &str) -> Result<(), RendererError> {
        if !self.configured {
            return Err(RendererError::NotInitialized);
        }
        if source.contains("%% invalid") {
            return Err(RendererError::SyntaxInvalid("Parse error".to_string()));
        }
        Ok(())
    }

    async fn layout(&self, scope: LayoutScope<'_>) -> Result<VectorOutput, RendererError> {
        Ok(VectorOutput::new(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="40" height="20"><rect width="40" height="20"/></svg>"#,
            scope.id
        )))
    }
}

fn configured() -> RenderOrchestrator<BoxRenderer> {
    let mut orchestrator = RenderOrchestrator::new(BoxRenderer::default());
    orchestrator
        .configure(RendererOptions::default())
        .expect("Failed to configure renderer");
    orchestrator
}

#[test]
fn test_classification_examples() {
    let flowchart = tessera::classify("graph TD\nA[Start]-->B[End]");
    assert_eq!(flowchart.kind, DiagramKind::Flowchart);
    assert_eq!(flowchart.element_count, 3);

    let sequence = tessera::classify("sequenceDiagram\nparticipant A\nparticipant B\nA->>B: hi");
    assert_eq!(sequence.kind, DiagramKind::Sequence);
    assert_eq!(sequence.element_count, 3);

    let pie = tessera::classify("pie title X\n\"A\":10\n\"B\":20");
    assert_eq!(pie.kind, DiagramKind::Pie);
    assert_eq!(pie.element_count, 3);
}

#[tokio::test]
async fn test_render_then_export_svg() {
    let orchestrator = configured();
    let stage = Stage::with_container(CONTAINER);
    let result = orchestrator
        .render(
            "graph TD\nA[Start]-->B[End]",
            &stage,
            &ContainerId::from(CONTAINER),
            RequestedKind::Auto,
        )
        .await
        .expect("Render should start");
    assert!(result.success(), "Render failed: {:?}", result.error_message());

    let id = result.diagram_id().expect("Rendered diagram has an id").clone();
    let artifact = Exporter::new()
        .export(&stage, ExportFormat::Svg, ThemePreference::Light)
        .await
        .expect("Export should succeed");

    let svg = String::from_utf8(artifact.payload().to_vec()).unwrap();
    assert!(svg.contains(&format!(r#"id="{id}""#)));
    assert!(artifact.file_name().starts_with("diagram-"));
    assert!(artifact.file_name().ends_with(".svg"));
}

#[tokio::test]
async fn test_invalid_text_leaves_nothing_to_export() {
    let orchestrator = configured();
    let stage = Stage::with_container(CONTAINER);
    let result = orchestrator
        .render(
            "graph TD\n%% invalid",
            &stage,
            &ContainerId::from(CONTAINER),
            RequestedKind::Auto,
        )
        .await
        .unwrap();
    assert_eq!(result.error_message(), Some("Parse error"));

    let err = Exporter::new()
        .export(&stage, ExportFormat::Png, ThemePreference::Light)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::NoDiagram));
}

#[tokio::test]
async fn test_render_errors() {
    let unconfigured = RenderOrchestrator::new(BoxRenderer::default());
    let stage = Stage::with_container(CONTAINER);
    let err = unconfigured
        .render("graph TD", &stage, &ContainerId::from(CONTAINER), RequestedKind::Auto)
        .await
        .unwrap_err();
    assert_eq!(err, RenderError::NotInitialized);

    let err = configured()
        .render("graph TD", &stage, &ContainerId::from("missing"), RequestedKind::Auto)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Container with id 'missing' not found");
}

#[tokio::test]
async fn test_native_renderer_produces_svg() {
    let mut orchestrator = RenderOrchestrator::new(NativeRenderer::new());
    orchestrator
        .configure(RendererOptions::default())
        .expect("Failed to configure renderer");
    let stage = Stage::with_container(CONTAINER);

    let result = orchestrator
        .render(
            "graph TD\nA[Start]-->B[End]",
            &stage,
            &ContainerId::from(CONTAINER),
            RequestedKind::Auto,
        )
        .await
        .unwrap();
    assert!(result.success(), "Render failed: {:?}", result.error_message());

    let artifact = Exporter::new()
        .export(&stage, ExportFormat::Svg, ThemePreference::Light)
        .await
        .expect("Export should succeed");
    let svg = String::from_utf8(artifact.payload().to_vec()).unwrap();
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
}

#[tokio::test]
async fn test_controller_session_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out").join("diagram.png");

    {
        let storage = FileStorage::open(dir.path().join("state")).unwrap();
        let mut controller = Controller::new(
            BoxRenderer::default(),
            RendererOptions::default(),
            storage,
            MemoryClipboard::new(),
            PathSink::new(&out),
        )
        .unwrap();

        controller
            .dispatch(Action::Edit("graph TD\nA-->B".to_string()))
            .await;
        controller.dispatch(Action::SetTheme(ThemePreference::Dark)).await;
        controller.dispatch(Action::Generate).await;
        controller.dispatch(Action::Export(ExportFormat::Png)).await;

        assert_eq!(controller.state().status.level, StatusLevel::Success);
        assert_eq!(controller.state().last_export, Some(PathBuf::from(&out)));
    }

    let png = std::fs::read(&out).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let storage = FileStorage::open(dir.path().join("state")).unwrap();
    assert_eq!(
        storage.get(LAST_TEXT_KEY).unwrap().as_deref(),
        Some("graph TD\nA-->B")
    );
    assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_controller_starts_from_memory_defaults() {
    let controller = Controller::new(
        BoxRenderer::default(),
        RendererOptions::default().with_theme(ThemePreference::Dark),
        MemoryStorage::new(),
        MemoryClipboard::new(),
        PathSink::new("unused"),
    )
    .unwrap();
    assert_eq!(controller.state().text, "");
    assert_eq!(controller.state().theme, ThemePreference::Dark);
    assert_eq!(controller.state().detected_label(), "Not detected");
}
