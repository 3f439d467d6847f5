// Configuration loading

pub mod session;
pub mod settings;

pub use session::{Session, ViewportSnapshot};
pub use settings::Settings;

/// Directory holding settings.json and session.json.
pub fn config_dir() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("notegrid")
}
