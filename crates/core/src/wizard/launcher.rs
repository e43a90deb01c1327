use thiserror::Error;

/// Errors from handing a magnet link to the desktop.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("failed to open: {0}")]
    Open(String),
}

/// Delivers a resolved magnet link.
pub trait Launcher: Send + Sync {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), LaunchError>;

    /// Open `uri` with `app`, or with the system default handler when `None`.
    fn open(&self, uri: &str, app: Option<&str>) -> Result<(), LaunchError>;
}
