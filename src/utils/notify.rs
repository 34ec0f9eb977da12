use std::io;

use async_trait::async_trait;
use tracing::debug;

use crate::utils::shell;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> io::Result<()>;
}

/// Raises desktop notifications through the configured `notify_cmd`.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    template: String,
}

impl CommandNotifier {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn command_line(&self, title: &str, body: &str) -> String {
        shell::fill_template(&self.template, &[("title", title), ("message", body)])
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, title: &str, body: &str) -> io::Result<()> {
        let command_line = self.command_line(title, body);
        debug!(command = %command_line, "Sending desktop notification");
        let output = shell::capture_async(&command_line).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "notify command exited with {}",
                output.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_title_and_body() {
        let notifier = CommandNotifier::new("notify-send {title} {message}");
        assert_eq!(
            notifier.command_line("Ada Lovelace", "see you at 5"),
            "notify-send 'Ada Lovelace' 'see you at 5'"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_an_error() {
        let notifier = CommandNotifier::new("exit 1 {title} {message}");
        assert!(notifier.notify("a", "b").await.is_err());
        let notifier = CommandNotifier::new("true {title} {message}");
        assert!(notifier.notify("a", "b").await.is_ok());
    }
}
