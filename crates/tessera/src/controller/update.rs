//! The editor reducer.
//!
//! [`update`] is a pure function from the current [`ViewState`] and one
//! [`Action`] to the next state plus the [`Effect`]s the controller must
//! run. Effects that complete asynchronously report back with one of the
//! result actions (`Detected`, `RenderFinished`, `ExportFinished`,
//! `CopyFinished`, `DismissNotification`).

use std::path::PathBuf;

use chrono::{DateTime, Local};

use tessera_classify::{Classification, classify, format_text};
use tessera_core::{export::ExportFormat, kind::RequestedKind, theme::ThemePreference};

use super::state::{Notification, NotificationLevel, Status, StatusLevel, ViewState};
use crate::{
    clipboard::ClipboardError,
    orchestrator::{RenderError, RenderOutcome, RenderResult},
    samples::SampleKind,
    storage::{LAST_TEXT_KEY, THEME_KEY},
};

/// Something the user did, or the result of an earlier [`Effect`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Edit(String),
    Clear,
    Format,
    LoadSample(SampleKind),
    InsertTemplate(SampleKind),
    SelectKind(RequestedKind),
    ToggleTheme,
    SetTheme(ThemePreference),
    ToggleHelp,
    OpenExport,
    CloseExport,
    ToggleFullscreen,
    Generate,
    Export(ExportFormat),
    Copy,
    /// Debounced classification of the text.
    Detected(Classification),
    RenderFinished {
        outcome: Result<RenderResult, RenderError>,
        /// Whether the stage shows a diagram after the render.
        has_diagram: bool,
        at: DateTime<Local>,
    },
    ExportFinished {
        format: ExportFormat,
        result: Result<PathBuf, String>,
    },
    CopyFinished(Result<(), ClipboardError>),
    DismissNotification(u64),
}

/// Work requested by [`update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Persist { key: &'static str, value: String },
    /// Classify `text` once the editor has been idle for the debounce delay.
    ScheduleDetect(String),
    CancelDetect,
    Render { text: String, requested: RequestedKind },
    /// Put the placeholder back in the diagram container.
    ClearStage,
    ApplyTheme(ThemePreference),
    Export(ExportFormat),
    Copy(String),
    /// Show `Notification` and dismiss it after its lifetime.
    Notify(Notification),
}

/// Applies `action` to `state`.
pub fn update(mut state: ViewState, action: Action) -> (ViewState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::Edit(text) => {
            set_text(&mut state, text, &mut effects);
            effects.push(Effect::ScheduleDetect(state.text.clone()));
        }
        Action::Clear => {
            set_text(&mut state, String::new(), &mut effects);
            effects.push(Effect::CancelDetect);
            detect_now(&mut state);
            effects.push(Effect::ClearStage);
            state.has_diagram = false;
            notify(&mut state, NotificationLevel::Info, "Text cleared", &mut effects);
        }
        Action::Format => {
            if let Some(formatted) = format_text(&state.text) {
                set_text(&mut state, formatted, &mut effects);
                notify(
                    &mut state,
                    NotificationLevel::Success,
                    "Text formatted",
                    &mut effects,
                );
            }
        }
        Action::LoadSample(sample) => {
            load_text(&mut state, sample, sample.example(), &mut effects);
            notify(
                &mut state,
                NotificationLevel::Success,
                format!("Loaded {sample} example"),
                &mut effects,
            );
        }
        Action::InsertTemplate(sample) => {
            load_text(&mut state, sample, sample.template(), &mut effects);
            notify(
                &mut state,
                NotificationLevel::Info,
                format!("Inserted {sample} template"),
                &mut effects,
            );
        }
        Action::SelectKind(requested) => {
            state.requested_kind = requested;
            detect_now(&mut state);
        }
        Action::ToggleTheme => {
            let theme = state.theme.toggled();
            change_theme(&mut state, theme, &mut effects);
        }
        Action::SetTheme(theme) => change_theme(&mut state, theme, &mut effects),
        Action::ToggleHelp => state.help_expanded = !state.help_expanded,
        Action::OpenExport => {
            if state.has_diagram {
                state.export_open = true;
            } else {
                notify(
                    &mut state,
                    NotificationLevel::Warning,
                    "No diagram to export",
                    &mut effects,
                );
            }
        }
        Action::CloseExport => state.export_open = false,
        Action::ToggleFullscreen => {
            state.fullscreen = !state.fullscreen;
            let message = if state.fullscreen {
                "Entered fullscreen mode"
            } else {
                "Exited fullscreen mode"
            };
            notify(&mut state, NotificationLevel::Info, message, &mut effects);
        }
        Action::Generate => generate(&mut state, &mut effects),
        Action::Export(format) => {
            state.export_open = false;
            let label = format.extension().to_ascii_uppercase();
            state.status = Status::new(StatusLevel::Processing, format!("Exporting as {label}..."));
            effects.push(Effect::Export(format));
        }
        Action::Copy => {
            if state.text.trim().is_empty() {
                notify(
                    &mut state,
                    NotificationLevel::Warning,
                    "No text to copy",
                    &mut effects,
                );
            } else {
                effects.push(Effect::Copy(state.text.clone()));
            }
        }
        Action::Detected(classification) => {
            if state.text.trim().is_empty() {
                state.detected = None;
            } else {
                apply_classification(&mut state, classification);
            }
        }
        Action::RenderFinished {
            outcome,
            has_diagram,
            at,
        } => render_finished(&mut state, outcome, has_diagram, at, &mut effects),
        Action::ExportFinished { format, result } => {
            let label = format.extension().to_ascii_uppercase();
            match result {
                Ok(path) => {
                    state.last_export = Some(path);
                    state.status = Status::new(StatusLevel::Success, format!("Exported as {label}"));
                    notify(
                        &mut state,
                        NotificationLevel::Success,
                        format!("Diagram exported as {label}"),
                        &mut effects,
                    );
                }
                Err(message) => {
                    state.status = Status::new(StatusLevel::Error, "Export failed");
                    notify(
                        &mut state,
                        NotificationLevel::Error,
                        format!("Export failed: {message}"),
                        &mut effects,
                    );
                }
            }
        }
        Action::CopyFinished(result) => {
            let (level, message) = match result {
                Ok(()) => (NotificationLevel::Success, "Code copied to clipboard"),
                Err(_) => (NotificationLevel::Error, "Failed to copy to clipboard"),
            };
            notify(&mut state, level, message, &mut effects);
        }
        Action::DismissNotification(id) => {
            if state.notification.as_ref().is_some_and(|shown| shown.id == id) {
                state.notification = None;
            }
        }
    }

    (state, effects)
}

fn set_text(state: &mut ViewState, text: String, effects: &mut Vec<Effect>) {
    effects.push(Effect::Persist {
        key: LAST_TEXT_KEY,
        value: text.clone(),
    });
    state.text = text;
}

/// Replaces the text with a built-in sample and selects its kind.
///
/// Detection runs before the selector changes, so the element count only
/// follows the new text when the selector was on `auto`.
fn load_text(state: &mut ViewState, sample: SampleKind, text: &str, effects: &mut Vec<Effect>) {
    set_text(state, text.to_string(), effects);
    effects.push(Effect::CancelDetect);
    detect_now(state);
    state.requested_kind = RequestedKind::Explicit(sample.kind());
}

fn detect_now(state: &mut ViewState) {
    if state.text.trim().is_empty() {
        state.detected = None;
        return;
    }
    let classification = classify(&state.text);
    apply_classification(state, classification);
}

fn apply_classification(state: &mut ViewState, classification: Classification) {
    state.detected = Some(classification.kind);
    if state.requested_kind.is_auto() {
        state.element_count = Some(classification.element_count);
    }
}

fn change_theme(state: &mut ViewState, theme: ThemePreference, effects: &mut Vec<Effect>) {
    state.theme = theme;
    effects.push(Effect::Persist {
        key: THEME_KEY,
        value: theme.as_str().to_string(),
    });
    effects.push(Effect::ApplyTheme(theme));
    if state.has_diagram && !state.text.trim().is_empty() {
        generate(state, effects);
    }
}

fn generate(state: &mut ViewState, effects: &mut Vec<Effect>) {
    let text = state.text.trim();
    if text.is_empty() {
        notify(
            state,
            NotificationLevel::Warning,
            "Please enter some text to generate a diagram",
            effects,
        );
        return;
    }
    effects.push(Effect::Render {
        text: text.to_string(),
        requested: state.requested_kind,
    });
    state.status = Status::new(StatusLevel::Processing, "Generating diagram...");
}

fn render_finished(
    state: &mut ViewState,
    outcome: Result<RenderResult, RenderError>,
    has_diagram: bool,
    at: DateTime<Local>,
    effects: &mut Vec<Effect>,
) {
    let message = match outcome {
        Ok(result) => match result.outcome {
            // A newer render owns the status.
            RenderOutcome::Superseded => return,
            RenderOutcome::Rendered(_) => {
                state.has_diagram = has_diagram;
                state.status = Status::new(StatusLevel::Success, "Diagram generated successfully");
                state.detected = Some(result.kind);
                state.element_count = Some(result.element_count);
                state.last_generated = Some(at);
                notify(
                    state,
                    NotificationLevel::Success,
                    "Diagram generated successfully!",
                    effects,
                );
                return;
            }
            RenderOutcome::Failed { message, .. } => message,
        },
        Err(err) => err.to_string(),
    };

    state.has_diagram = has_diagram;
    state.status = Status::new(StatusLevel::Error, "Error generating diagram");
    notify(
        state,
        NotificationLevel::Error,
        format!("Error: {message}"),
        effects,
    );
}

fn notify(
    state: &mut ViewState,
    level: NotificationLevel,
    message: impl Into<String>,
    effects: &mut Vec<Effect>,
) {
    state.notifications_shown += 1;
    let notification = Notification {
        id: state.notifications_shown,
        level,
        message: message.into(),
    };
    state.notification = Some(notification.clone());
    effects.push(Effect::Notify(notification));
}
