//! Helpers for the user-configurable command templates.

use std::io;
use std::process::{Command, ExitStatus, Output};

/// Quote `value` for a POSIX shell.
pub fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Replace each `{name}` placeholder in `template` with the quoted value.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), &quote(value))
        })
}

/// Run `command_line` through `sh -c` with the terminal attached.
pub fn run(command_line: &str) -> io::Result<ExitStatus> {
    Command::new("sh").arg("-c").arg(command_line).status()
}

/// Run `command_line` through `sh -c` and capture its output.
pub fn capture(command_line: &str) -> io::Result<Output> {
    Command::new("sh").arg("-c").arg(command_line).output()
}

/// Run `command_line` through `sh -c` on the runtime and capture its output.
pub async fn capture_async(command_line: &str) -> io::Result<Output> {
    tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command_line)
        .kill_on_drop(true)
        .output()
        .await
}
