//! Clipboard and open-with integration.

use magnetize_core::{LaunchError, Launcher};
use tracing::debug;

#[derive(Debug, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for SystemLauncher {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), LaunchError> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .map_err(|e| LaunchError::Clipboard(e.to_string()))
    }

    fn open(&self, uri: &str, app: Option<&str>) -> Result<(), LaunchError> {
        debug!(app = app.unwrap_or("default"), "Opening magnet link");
        let result = match app {
            Some(app) => open::with(uri, app),
            None => open::that(uri),
        };
        result.map_err(|e| LaunchError::Open(e.to_string()))
    }
}
