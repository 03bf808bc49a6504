//! CLI logic for the Tessera diagram workbench.
//!
//! Each subcommand drives the same editor [`Controller`] the interactive
//! surface uses, so saved text, theme handling and status messages behave
//! the same way on the command line.

pub mod error_adapter;

mod args;
mod clipboard;
mod config;

pub use args::{Args, Command, ThemeMode};
pub use clipboard::SystemClipboard;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};

use tessera::{
    ExportFormat, TesseraError,
    config::AppConfig,
    controller::{Action, Controller, NotificationLevel, StatusLevel},
    export::{Exporter, PathSink},
    renderer::AnyRenderer,
    storage::FileStorage,
};

type Session = Controller<AnyRenderer, FileStorage, SystemClipboard>;

/// Run the Tessera CLI application, writing command output to stdout.
///
/// # Errors
///
/// Returns `TesseraError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Missing diagram text
/// - Render, export and clipboard failures
pub fn run(args: &Args) -> Result<(), TesseraError> {
    let stdout = io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Run the Tessera CLI application, writing command output to `out`.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), TesseraError> {
    info!(command:? = args.command; "Processing command");

    let app_config = config::load_config(args.config.as_ref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(args, &app_config, out))
}

async fn execute(
    args: &Args,
    app_config: &AppConfig,
    out: &mut impl Write,
) -> Result<(), TesseraError> {
    let state_dir = config::state_dir(args.state_dir.as_ref());
    let storage = FileStorage::open(&state_dir)?;
    debug!(path:? = storage.path(); "Using editor state");

    match &args.command {
        Command::Detect { input } => {
            let mut session = open_session(app_config, storage, PathBuf::from("."))?;
            load_input(&mut session, input.as_deref()).await?;

            let classification = tessera::classify(&session.state().text);
            writeln!(out, "Detected: {}", classification.kind.display_name())?;
            writeln!(out, "Elements: {}", classification.element_count)?;
        }
        Command::Render {
            input,
            output,
            format,
            kind,
            theme,
        } => {
            let format = format
                .or_else(|| format_from_extension(output))
                .unwrap_or_else(|| app_config.export().format());
            let mut session = open_session(app_config, storage, PathBuf::from(output))?;
            load_input(&mut session, input.as_deref()).await?;

            session.dispatch(Action::SelectKind(*kind)).await;
            if let Some(theme) = theme {
                session.dispatch(Action::SetTheme(*theme)).await;
            }

            session.dispatch(Action::Generate).await;
            ensure_success(&session)?;
            session.dispatch(Action::Export(format)).await;
            ensure_success(&session)?;

            if let Some(path) = &session.state().last_export {
                info!(output_file = path.display().to_string(); "Diagram exported successfully");
                writeln!(out, "{}", path.display())?;
            }
        }
        Command::Format { input } => {
            let mut session = open_session(app_config, storage, PathBuf::from("."))?;
            load_input(&mut session, input.as_deref()).await?;
            session.dispatch(Action::Format).await;
            writeln!(out, "{}", session.state().text)?;
        }
        Command::Sample { kind, template } => {
            let mut session = open_session(app_config, storage, PathBuf::from("."))?;
            match (kind, template) {
                (Some(kind), true) => session.dispatch(Action::InsertTemplate(*kind)).await,
                (Some(kind), false) => session.dispatch(Action::LoadSample(*kind)).await,
                (None, _) => session.load_random_sample().await,
            }
            writeln!(out, "{}", session.state().text)?;
        }
        Command::Copy { input } => {
            let mut session = open_session(app_config, storage, PathBuf::from("."))?;
            load_input(&mut session, input.as_deref()).await?;
            session.dispatch(Action::Copy).await;
            if let Some(notification) = &session.state().notification {
                if notification.level == NotificationLevel::Error {
                    return Err(TesseraError::Editor(notification.message.clone()));
                }
                writeln!(out, "{}", notification.message)?;
            }
        }
        Command::Theme { mode } => {
            let mut session = open_session(app_config, storage, PathBuf::from("."))?;
            match mode {
                Some(ThemeMode::Toggle) => session.dispatch(Action::ToggleTheme).await,
                Some(ThemeMode::Light) => {
                    session
                        .dispatch(Action::SetTheme(tessera::ThemePreference::Light))
                        .await
                }
                Some(ThemeMode::Dark) => {
                    session
                        .dispatch(Action::SetTheme(tessera::ThemePreference::Dark))
                        .await
                }
                None => {}
            }
            writeln!(out, "{}", session.state().theme)?;
        }
    }

    Ok(())
}

fn open_session(
    app_config: &AppConfig,
    storage: FileStorage,
    destination: PathBuf,
) -> Result<Session, TesseraError> {
    let renderer = AnyRenderer::from_config(app_config.renderer());
    let options = app_config
        .renderer()
        .renderer_options(app_config.editor().theme());
    let exporter = Exporter::from_config(app_config.export()).map_err(TesseraError::Config)?;

    Ok(Controller::new(
        renderer,
        options,
        storage,
        SystemClipboard,
        PathSink::new(destination),
    )?
    .with_exporter(exporter)
    .with_debounce(app_config.editor().debounce())
    .with_notification_lifetime(app_config.editor().notification_lifetime()))
}

/// Replaces the editor text with the contents of `input`, if given.
async fn load_input(session: &mut Session, input: Option<&str>) -> Result<(), TesseraError> {
    if let Some(path) = input {
        let text = fs::read_to_string(path)?;
        debug!(input_path = path, chars = text.len(); "Loaded diagram text");
        session.dispatch(Action::Edit(text)).await;
    }

    if session.state().text.trim().is_empty() {
        return Err(TesseraError::Input(
            "No diagram text: the input is blank and no text has been saved".to_string(),
        ));
    }
    Ok(())
}

fn ensure_success(session: &Session) -> Result<(), TesseraError> {
    let state = session.state();
    if state.status.level != StatusLevel::Error {
        return Ok(());
    }
    let message = state
        .notification
        .as_ref()
        .map(|notification| notification.message.clone())
        .unwrap_or_else(|| state.status.message.clone());
    Err(TesseraError::Editor(message))
}

fn format_from_extension(output: &str) -> Option<ExportFormat> {
    Path::new(output)
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(|extension| extension.parse().ok())
}
