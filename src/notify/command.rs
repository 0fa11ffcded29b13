//! Desktop notifications through platform commands.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::{Notification, NotifyError, OsNotifier};

/// Default time allowed for a notifier command to finish.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

const ENV_APP: &str = "DUEBELL_APP";
const ENV_TITLE: &str = "DUEBELL_TITLE";
const ENV_MESSAGE: &str = "DUEBELL_MESSAGE";

const APPLESCRIPT: &str = r#"display notification (system attribute "DUEBELL_MESSAGE") with title (system attribute "DUEBELL_TITLE") subtitle (system attribute "DUEBELL_APP")"#;

const POWERSHELL_TOAST: &str = r#"[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] > $null
$template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)
$texts = $template.GetElementsByTagName('text')
$texts.Item(0).AppendChild($template.CreateTextNode($env:DUEBELL_TITLE)) > $null
$texts.Item(1).AppendChild($template.CreateTextNode($env:DUEBELL_MESSAGE)) > $null
$toast = [Windows.UI.Notifications.ToastNotification]::new($template)
[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier($env:DUEBELL_APP).Show($toast)"#;

/// How a [`CommandNotifier`] invokes the desktop.
///
/// Title, message and application name are always exported to the child as
/// `DUEBELL_TITLE`, `DUEBELL_MESSAGE` and `DUEBELL_APP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierBackend {
    /// `notify-send` (freedesktop).
    NotifySend,
    /// `osascript` on macOS.
    Osascript,
    /// A PowerShell toast on Windows.
    PowerShell,
    /// Any program. `{app}`, `{title}` and `{message}` in arguments are
    /// replaced before spawning.
    Custom { program: String, args: Vec<String> },
}

impl NotifierBackend {
    /// Backend for the platform this binary was built for.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(NotifierBackend::Osascript)
        } else if cfg!(target_os = "windows") {
            Some(NotifierBackend::PowerShell)
        } else if cfg!(unix) {
            Some(NotifierBackend::NotifySend)
        } else {
            None
        }
    }

    /// Program to spawn.
    pub fn program(&self) -> &str {
        match self {
            NotifierBackend::NotifySend => "notify-send",
            NotifierBackend::Osascript => "osascript",
            NotifierBackend::PowerShell => "powershell",
            NotifierBackend::Custom { program, .. } => program,
        }
    }

    /// Arguments for one notification.
    pub fn args(&self, app_name: &str, notification: &Notification) -> Vec<String> {
        match self {
            NotifierBackend::NotifySend => vec![
                format!("--app-name={}", app_name),
                notification.title.clone(),
                notification.message.clone(),
            ],
            NotifierBackend::Osascript => vec!["-e".to_string(), APPLESCRIPT.to_string()],
            NotifierBackend::PowerShell => vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                POWERSHELL_TOAST.to_string(),
            ],
            NotifierBackend::Custom { args, .. } => args
                .iter()
                .map(|arg| {
                    arg.replace("{app}", app_name)
                        .replace("{title}", &notification.title)
                        .replace("{message}", &notification.message)
                })
                .collect(),
        }
    }
}

/// Delivers notifications by running a platform command.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    backend: NotifierBackend,
    app_name: String,
    timeout: Duration,
}

impl CommandNotifier {
    /// Create a notifier with an explicit backend.
    pub fn new(backend: NotifierBackend, app_name: impl Into<String>) -> Self {
        Self {
            backend,
            app_name: app_name.into(),
            timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Create a notifier for the current platform.
    pub fn for_platform(app_name: impl Into<String>) -> Result<Self, NotifyError> {
        let backend = NotifierBackend::detect()
            .ok_or_else(|| NotifyError::Unsupported(std::env::consts::OS.to_string()))?;
        Ok(Self::new(backend, app_name))
    }

    /// Set the delivery timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(&self) -> &NotifierBackend {
        &self.backend
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl OsNotifier for CommandNotifier {
    fn name(&self) -> &str {
        self.backend.program()
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let program = self.backend.program();
        let mut cmd = Command::new(program);
        cmd.args(self.backend.args(&self.app_name, notification))
            .env(ENV_APP, &self.app_name)
            .env(ENV_TITLE, &notification.title)
            .env(ENV_MESSAGE, &notification.message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))?
            .map_err(|source| NotifyError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(NotifyError::Failed {
                program: program.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Notifier that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl OsNotifier for NoopNotifier {
    fn name(&self) -> &str {
        "none"
    }

    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}
