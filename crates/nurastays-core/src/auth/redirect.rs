//! Hook fired when a session cannot be recovered and the user has to log in
//! again.

use std::sync::Mutex;

use tracing::warn;

/// Called once per unrecoverable refresh failure, after both tokens have
/// been cleared, with the configured login path.
pub trait LoginRedirect: Send + Sync {
    fn redirect(&self, login_path: &str);
}

/// Default hook: just log it. Front ends swap in their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect(&self, login_path: &str) {
        warn!(login_path = login_path, "Session expired, login required");
    }
}

impl<F> LoginRedirect for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, login_path: &str) {
        self(login_path)
    }
}

/// Remembers every redirect it receives.
#[derive(Debug, Default)]
pub struct RecordingRedirect {
    paths: Mutex<Vec<String>>,
}

impl RecordingRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.paths().len()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect(&self, login_path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(login_path.to_string());
    }
}
