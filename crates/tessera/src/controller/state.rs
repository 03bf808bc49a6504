//! The editor's view state.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use tessera_core::{
    kind::{DiagramKind, RequestedKind},
    theme::ThemePreference,
};

pub const READY_MESSAGE: &str = "Ready to generate diagram";

/// Status indicator color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Ready,
    Processing,
    Success,
    Error,
}

/// Status indicator with its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn new(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message. Showing a new one replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

/// Everything the editor surface displays.
///
/// Values are replaced wholesale by [`update`](super::update), never
/// mutated in place by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub text: String,
    pub requested_kind: RequestedKind,
    pub theme: ThemePreference,
    pub help_expanded: bool,
    pub export_open: bool,
    pub fullscreen: bool,
    pub status: Status,
    /// Kind shown in the "detected" readout; `None` reads "Not detected".
    pub detected: Option<DiagramKind>,
    pub element_count: Option<usize>,
    pub last_generated: Option<DateTime<Local>>,
    /// Whether the stage currently shows a rendered diagram.
    pub has_diagram: bool,
    /// Where the last export was delivered.
    pub last_export: Option<PathBuf>,
    pub notification: Option<Notification>,
    pub(super) notifications_shown: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            text: String::new(),
            requested_kind: RequestedKind::Auto,
            theme: ThemePreference::Light,
            help_expanded: true,
            export_open: false,
            fullscreen: false,
            status: Status::new(StatusLevel::Ready, READY_MESSAGE),
            detected: None,
            element_count: None,
            last_generated: None,
            has_diagram: false,
            last_export: None,
            notification: None,
            notifications_shown: 0,
        }
    }
}

impl ViewState {
    /// Initial state from persisted values.
    pub fn new(text: impl Into<String>, theme: ThemePreference) -> Self {
        Self {
            text: text.into(),
            theme,
            ..Self::default()
        }
    }

    /// Number of characters in the editor.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn detected_label(&self) -> &'static str {
        self.detected
            .map(DiagramKind::display_name)
            .unwrap_or("Not detected")
    }

    /// Time of the last successful render, as shown in the readout.
    pub fn last_generated_label(&self) -> Option<String> {
        self.last_generated
            .map(|at| at.format("%H:%M:%S").to_string())
    }
}
