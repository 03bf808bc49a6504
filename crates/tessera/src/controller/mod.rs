//! The editor controller.
//!
//! The controller keeps the [`ViewState`] and runs the editor's event loop:
//!
//! ```text
//! Action (user input or effect result)
//!     ↓ update (pure reducer)
//! ViewState + Effects
//!     ↓ run effects (persist, render, export, copy, timers)
//! Result actions, fed back into update
//! ```
//!
//! Timed work (debounced detection and notification dismissal) runs on
//! spawned tasks that send their result action back over a channel. Call
//! [`Controller::process_next`] or [`Controller::process_pending`] to feed
//! those actions into the reducer.

mod debounce;
mod keymap;
mod state;
mod update;

pub use debounce::Debouncer;
pub use keymap::{Key, KeyPress, Keymap, Modifiers, Shortcut};
pub use state::{Notification, NotificationLevel, Status, StatusLevel, ViewState};
pub use update::{Action, Effect, update};

use std::{collections::VecDeque, path::PathBuf, time::Duration};

use chrono::Local;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use tessera_classify::classify;
use tessera_core::{export::ExportFormat, theme::ThemePreference};

use crate::{
    TesseraError,
    clipboard::Clipboard,
    export::{DownloadSink, ExportError, Exporter},
    orchestrator::RenderOrchestrator,
    renderer::{Renderer, RendererOptions},
    samples::SampleKind,
    stage::{ContainerId, Stage},
    storage::{LAST_TEXT_KEY, Storage, THEME_KEY},
};

/// Name of the container diagrams are rendered into.
pub const DIAGRAM_CONTAINER: &str = "diagram-container";

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
const DEFAULT_NOTIFICATION_LIFETIME: Duration = Duration::from_secs(3);

/// Wires the reducer to a renderer, an exporter, storage and a clipboard.
pub struct Controller<R, S, C> {
    state: ViewState,
    orchestrator: RenderOrchestrator<R>,
    exporter: Exporter,
    stage: Stage,
    container: ContainerId,
    storage: S,
    clipboard: C,
    downloads: Box<dyn DownloadSink>,
    keymap: Keymap,
    debouncer: Debouncer,
    notification_lifetime: Duration,
    rng: StdRng,
    actions_tx: mpsc::UnboundedSender<Action>,
    actions_rx: mpsc::UnboundedReceiver<Action>,
}

impl<R: Renderer, S: Storage, C: Clipboard> Controller<R, S, C> {
    /// Restores the persisted text and theme and configures `renderer`.
    ///
    /// `options.theme` is used only when no theme has been persisted.
    /// Unreadable storage is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`TesseraError::Renderer`] when the renderer rejects its
    /// configuration.
    pub fn new(
        renderer: R,
        options: RendererOptions,
        storage: S,
        clipboard: C,
        downloads: impl DownloadSink + 'static,
    ) -> Result<Self, TesseraError> {
        let text = read_key(&storage, LAST_TEXT_KEY).unwrap_or_default();
        let theme = read_key(&storage, THEME_KEY)
            .map(|stored| ThemePreference::from_stored(Some(&stored)))
            .unwrap_or(options.theme);

        let mut orchestrator = RenderOrchestrator::new(renderer);
        orchestrator.configure(options.with_theme(theme))?;

        let container = ContainerId::from(DIAGRAM_CONTAINER);
        let stage = Stage::with_container(container.clone());
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();

        debug!(theme:% = theme, chars = text.len(); "Editor state restored");
        Ok(Self {
            state: ViewState::new(text, theme),
            orchestrator,
            exporter: Exporter::default(),
            stage,
            container,
            storage,
            clipboard,
            downloads: Box::new(downloads),
            keymap: Keymap::default(),
            debouncer: Debouncer::new(DEFAULT_DEBOUNCE),
            notification_lifetime: DEFAULT_NOTIFICATION_LIFETIME,
            rng: rand::make_rng(),
            actions_tx,
            actions_rx,
        })
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Sets the idle time before edited text is re-classified.
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    pub fn with_notification_lifetime(mut self, lifetime: Duration) -> Self {
        self.notification_lifetime = lifetime;
        self
    }

    /// Sets the source of random sample picks.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    pub fn orchestrator(&self) -> &RenderOrchestrator<R> {
        &self.orchestrator
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Runs `action` and every action produced by its effects.
    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let (state, effects) = update(std::mem::take(&mut self.state), action);
            self.state = state;
            for effect in effects {
                if let Some(follow_up) = self.run(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Loads one of the built-in examples at random.
    pub async fn load_random_sample(&mut self) {
        let sample = SampleKind::random(&mut self.rng);
        self.dispatch(Action::LoadSample(sample)).await;
    }

    /// Handles a key press. Returns `true` when the press matched a shortcut
    /// and the surface's default handling must be suppressed.
    pub async fn handle_key(&mut self, press: KeyPress) -> bool {
        let Some(shortcut) = self.keymap.resolve(press) else {
            return false;
        };
        debug!(shortcut:? = shortcut; "Keyboard shortcut");

        match shortcut {
            Shortcut::Generate => self.dispatch(Action::Generate).await,
            Shortcut::OpenExport => {
                if self.state.has_diagram {
                    self.dispatch(Action::OpenExport).await;
                }
            }
            Shortcut::LoadRandomSample => self.load_random_sample().await,
            Shortcut::ToggleTheme => self.dispatch(Action::ToggleTheme).await,
        }
        true
    }

    /// Waits for the next timer action and dispatches it.
    ///
    /// Never returns if no timer is pending.
    pub async fn process_next(&mut self) {
        // The controller holds a sender, so the channel never closes.
        if let Some(action) = self.actions_rx.recv().await {
            self.dispatch(action).await;
        }
    }

    /// Dispatches every timer action that has already fired.
    pub async fn process_pending(&mut self) {
        while let Ok(action) = self.actions_rx.try_recv() {
            self.dispatch(action).await;
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Persist { key, value } => {
                if let Err(err) = self.storage.set(key, &value) {
                    warn!(key, err:% = err; "Failed to persist editor state");
                }
                None
            }
            Effect::ScheduleDetect(text) => {
                let tx = self.actions_tx.clone();
                self.debouncer.schedule(async move {
                    let _ = tx.send(Action::Detected(classify(&text)));
                });
                None
            }
            Effect::CancelDetect => {
                self.debouncer.cancel();
                None
            }
            Effect::Render { text, requested } => {
                let outcome = self
                    .orchestrator
                    .render(&text, &self.stage, &self.container, requested)
                    .await;
                Some(Action::RenderFinished {
                    outcome,
                    has_diagram: self.stage.has_diagram(),
                    at: Local::now(),
                })
            }
            Effect::ClearStage => {
                self.stage.clear(&self.container);
                None
            }
            Effect::ApplyTheme(theme) => {
                if let Err(err) = self.orchestrator.set_theme(theme) {
                    warn!(theme:% = theme, err:% = err; "Failed to apply theme to renderer");
                }
                None
            }
            Effect::Export(format) => {
                let result = self.export(format).await.map_err(|err| {
                    warn!(format:% = format, err:% = err; "Export failed");
                    err.to_string()
                });
                Some(Action::ExportFinished { format, result })
            }
            Effect::Copy(text) => {
                let result = self.clipboard.write_text(&text).await;
                if let Err(err) = &result {
                    warn!(err:% = err; "Clipboard write failed");
                }
                Some(Action::CopyFinished(result))
            }
            Effect::Notify(notification) => {
                self.schedule_dismissal(&notification);
                None
            }
        }
    }

    async fn export(&mut self, format: ExportFormat) -> Result<PathBuf, ExportError> {
        let mut artifact = self
            .exporter
            .export(&self.stage, format, self.state.theme)
            .await?;
        let delivered = self.downloads.deliver(&artifact);
        if let Err(err) = artifact.release() {
            warn!(file = artifact.file_name(), err:% = err; "Failed to release download file");
        }
        delivered
    }

    fn schedule_dismissal(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Error | NotificationLevel::Warning => {
                warn!(id = notification.id; "{}", notification.message)
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(id = notification.id; "{}", notification.message)
            }
        }

        let tx = self.actions_tx.clone();
        let lifetime = self.notification_lifetime;
        let id = notification.id;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            let _ = tx.send(Action::DismissNotification(id));
        });
    }
}

fn read_key(storage: &impl Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value.filter(|value| !value.is_empty()),
        Err(err) => {
            warn!(key, err:% = err; "Failed to read persisted editor state");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rand::SeedableRng;
    use tessera_core::kind::DiagramKind;

    use super::*;
    use crate::{
        clipboard::MemoryClipboard, export::ExportArtifact, storage::MemoryStorage,
        test_utils::FakeRenderer,
    };

    const FLOWCHART: &str = "graph TD\nA[Start]-->B[End]";

    /// Sink that records file names instead of writing files.
    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl DownloadSink for RecordingSink {
        fn deliver(&mut self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
            assert!(artifact.download_path().is_some_and(|path| path.exists()));
            self.0.borrow_mut().push(artifact.file_name().to_string());
            Ok(PathBuf::from(artifact.file_name()))
        }
    }

    type TestController = Controller<FakeRenderer, MemoryStorage, MemoryClipboard>;

    fn controller_with(renderer: FakeRenderer, storage: MemoryStorage) -> TestController {
        Controller::new(
            renderer,
            RendererOptions::default(),
            storage,
            MemoryClipboard::new(),
            RecordingSink::default(),
        )
        .unwrap()
    }

    fn controller() -> TestController {
        controller_with(FakeRenderer::new(), MemoryStorage::new())
    }

    fn ctrl(key: Key) -> KeyPress {
        KeyPress::new(key, Modifiers::CTRL)
    }

    #[tokio::test]
    async fn test_restores_persisted_text_and_theme() {
        let mut storage = MemoryStorage::new();
        storage.set(LAST_TEXT_KEY, FLOWCHART).unwrap();
        storage.set(THEME_KEY, "dark").unwrap();

        let controller = controller_with(FakeRenderer::new(), storage);
        assert_eq!(controller.state().text, FLOWCHART);
        assert_eq!(controller.state().theme, ThemePreference::Dark);
        assert_eq!(
            controller.orchestrator().renderer().configured_theme(),
            Some(ThemePreference::Dark)
        );
        assert_eq!(controller.state().status.message, "Ready to generate diagram");
    }

    #[tokio::test]
    async fn test_generate_mounts_diagram() {
        let mut controller = controller();
        controller.dispatch(Action::Edit(FLOWCHART.into())).await;
        controller.dispatch(Action::Generate).await;

        let state = controller.state();
        assert!(state.has_diagram);
        assert_eq!(state.detected, Some(DiagramKind::Flowchart));
        assert_eq!(state.element_count, Some(3));
        assert_eq!(state.status.level, StatusLevel::Success);
        assert!(controller.stage().has_diagram());
    }

    #[tokio::test]
    async fn test_failed_generate_shows_diagnostic() {
        let mut controller = controller_with(
            FakeRenderer::new().reject_syntax("Parse error on line 1"),
            MemoryStorage::new(),
        );
        controller.dispatch(Action::Edit("graph TD\nA-->".into())).await;
        controller.dispatch(Action::Generate).await;

        assert!(!controller.state().has_diagram);
        assert_eq!(controller.state().status.level, StatusLevel::Error);
        assert_eq!(
            controller.state().notification.as_ref().unwrap().message,
            "Error: Parse error on line 1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_is_debounced() {
        let mut controller = controller();
        controller.dispatch(Action::Edit("sequenceDiagram".into())).await;
        controller
            .dispatch(Action::Edit("sequenceDiagram\nparticipant A".into()))
            .await;
        assert_eq!(controller.state().detected, None);

        controller.process_next().await;
        assert_eq!(controller.state().detected, Some(DiagramKind::Sequence));
        assert_eq!(controller.state().element_count, Some(1));
        assert_eq!(
            controller.storage().get(LAST_TEXT_KEY).unwrap().as_deref(),
            Some("sequenceDiagram\nparticipant A")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_dismiss_after_lifetime() {
        let mut controller = controller();
        controller.dispatch(Action::Copy).await;
        assert_eq!(
            controller.state().notification.as_ref().unwrap().message,
            "No text to copy"
        );

        let start = tokio::time::Instant::now();
        controller.process_next().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(controller.state().notification, None);
    }

    #[tokio::test]
    async fn test_export_delivers_and_releases() {
        let sink = RecordingSink::default();
        let mut controller = Controller::new(
            FakeRenderer::new(),
            RendererOptions::default(),
            MemoryStorage::new(),
            MemoryClipboard::new(),
            sink.clone(),
        )
        .unwrap();

        controller.dispatch(Action::Edit(FLOWCHART.into())).await;
        controller.dispatch(Action::Generate).await;
        controller.dispatch(Action::Export(ExportFormat::Svg)).await;

        let delivered = sink.0.borrow().clone();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].ends_with(".svg"));
        assert_eq!(controller.state().status.message, "Exported as SVG");
        assert_eq!(
            controller.state().last_export,
            Some(PathBuf::from(&delivered[0]))
        );
    }

    /// Sink that removes the download file, so releasing it fails.
    struct ConsumingSink;

    impl DownloadSink for ConsumingSink {
        fn deliver(&mut self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
            let path = artifact.download_path().expect("download file exists");
            std::fs::remove_file(path)?;
            Ok(PathBuf::from(artifact.file_name()))
        }
    }

    #[tokio::test]
    async fn test_delivered_export_succeeds_when_release_fails() {
        let mut controller = Controller::new(
            FakeRenderer::new(),
            RendererOptions::default(),
            MemoryStorage::new(),
            MemoryClipboard::new(),
            ConsumingSink,
        )
        .unwrap();

        controller.dispatch(Action::Edit(FLOWCHART.into())).await;
        controller.dispatch(Action::Generate).await;
        controller.dispatch(Action::Export(ExportFormat::Svg)).await;

        assert_eq!(controller.state().status.level, StatusLevel::Success);
        assert_eq!(controller.state().status.message, "Exported as SVG");
        assert!(controller.state().last_export.is_some());
    }

    #[tokio::test]
    async fn test_export_without_diagram_reports_failure() {
        let mut controller = controller();
        controller.dispatch(Action::Export(ExportFormat::Png)).await;
        assert_eq!(controller.state().status.message, "Export failed");
        assert_eq!(
            controller.state().notification.as_ref().unwrap().message,
            "Export failed: No diagram to export"
        );
    }

    #[tokio::test]
    async fn test_copy_writes_clipboard() {
        let mut controller = controller();
        controller.dispatch(Action::Edit(FLOWCHART.into())).await;
        controller.dispatch(Action::Copy).await;
        assert_eq!(controller.clipboard().contents(), Some(FLOWCHART));
        assert_eq!(
            controller.state().notification.as_ref().unwrap().message,
            "Code copied to clipboard"
        );
    }

    #[tokio::test]
    async fn test_theme_shortcut_rerenders_with_new_theme() {
        let mut controller = controller();
        controller.dispatch(Action::Edit(FLOWCHART.into())).await;
        controller.dispatch(Action::Generate).await;

        assert!(controller.handle_key(ctrl(Key::Character('d'))).await);
        assert_eq!(controller.state().theme, ThemePreference::Dark);
        assert_eq!(
            controller.storage().get(THEME_KEY).unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(
            controller.orchestrator().renderer().layout_themes(),
            vec![ThemePreference::Light, ThemePreference::Dark]
        );
    }

    #[tokio::test]
    async fn test_export_shortcut_is_silent_without_diagram() {
        let mut controller = controller();
        assert!(controller.handle_key(ctrl(Key::Character('s'))).await);
        assert!(!controller.state().export_open);
        assert_eq!(controller.state().notification, None);

        assert!(!controller
            .handle_key(KeyPress::new(Key::Character('s'), Modifiers::default()))
            .await);
    }

    #[tokio::test]
    async fn test_sample_shortcut_loads_an_example() {
        let mut controller = controller().with_rng(StdRng::seed_from_u64(3));
        assert!(controller.handle_key(ctrl(Key::Character('l'))).await);

        let text = controller.state().text.clone();
        let sample = SampleKind::ALL
            .into_iter()
            .find(|sample| sample.example() == text)
            .expect("an example was loaded");
        assert_eq!(controller.state().detected, Some(sample.kind()));
    }

    #[tokio::test]
    async fn test_clear_restores_placeholder() {
        let mut controller = controller();
        controller.dispatch(Action::Edit(FLOWCHART.into())).await;
        controller.dispatch(Action::Generate).await;
        controller.dispatch(Action::Clear).await;

        assert!(!controller.stage().has_diagram());
        assert!(!controller.state().has_diagram);
        assert_eq!(controller.state().text, "");
    }
}
