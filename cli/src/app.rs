use std::sync::Arc;

use docflow_core::config::{load_default, load_from, AppConfig};
use docflow_core::{ControllerSettings, TaskApi, TaskSession, UploadController};
use docflow_plugins::factory::{build_api, build_store};
use indicatif::{MultiProgress, ProgressDrawTarget};

use crate::commands::cli::Args;
use crate::error::CliError;
use crate::render::{Placeholders, TerminalUi, ToastNotifier};

/// Config file (or defaults), environment, then command-line overrides.
pub fn load_config(args: &Args) -> Result<AppConfig, CliError> {
    let mut cfg = match &args.config {
        Some(path) => load_from(path),
        None => load_default(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;

    if let Some(server) = args.server.as_deref().filter(|s| !s.trim().is_empty()) {
        cfg.server.base_url = server.trim().to_string();
    }
    Ok(cfg)
}

pub struct AppContext {
    pub cfg: AppConfig,
    pub api: Arc<dyn TaskApi>,
    pub session: Arc<TaskSession>,
    pub ui: Arc<TerminalUi>,
    pub notifier: Arc<ToastNotifier>,
    pub placeholders: Placeholders,
}

impl AppContext {
    pub fn build(cfg: AppConfig) -> Result<Self, CliError> {
        let interactive = atty::is(atty::Stream::Stderr);
        let multi = if interactive {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let api = build_api(&cfg)?;
        let store = build_store(&cfg)?;
        let session = Arc::new(TaskSession::new(store, api.clone()));
        let ui = Arc::new(TerminalUi::new(
            multi.clone(),
            interactive,
            &cfg.server.base_url,
        ));
        let notifier = Arc::new(ToastNotifier::new(
            cfg.notify.enabled,
            interactive.then(|| multi.clone()),
        ));
        let placeholders = Placeholders::new(multi);

        tracing::debug!(
            server = %cfg.server.base_url,
            storage = ?cfg.storage.kind,
            interactive,
            "context ready"
        );
        Ok(Self {
            cfg,
            api,
            session,
            ui,
            notifier,
            placeholders,
        })
    }

    pub fn controller(&self) -> UploadController {
        UploadController::new(
            self.api.clone(),
            self.session.clone(),
            self.ui.clone(),
            self.notifier.clone(),
            ControllerSettings::from_config(&self.cfg),
        )
    }
}
