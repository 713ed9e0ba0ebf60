//! # Platform-specific utilities
//!
//! Questo modulo centralizza la logica cross-platform per il tool esterno
//! di lettura metadata (exiftool): nome dell'eseguibile per piattaforma e
//! verifica della disponibilità prima di avviare il run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Platform-specific command manager
pub struct PlatformCommands {
    commands: HashMap<&'static str, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let mut commands = HashMap::new();
        let which_command = if cfg!(windows) {
            commands.insert("exiftool", "exiftool.exe");
            "where"
        } else {
            commands.insert("exiftool", "exiftool");
            "which"
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific command name, or the name itself if unknown
    pub fn get_command<'a>(&self, base_name: &'a str) -> &'a str {
        match self.commands.get(base_name) {
            Some(command) => *command,
            None => base_name,
        }
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Check if a command can be launched
    pub async fn is_command_available(&self, base_name: &str) -> bool {
        let command_name = self.get_command(base_name);

        // Explicit paths are checked directly
        if Path::new(command_name).components().count() > 1 {
            return Path::new(command_name).is_file();
        }

        if Self::find_in_system_path(command_name).is_some() {
            return true;
        }

        let result = tokio::process::Command::new(self.which_command)
            .arg(command_name)
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("{} {} failed: {}", self.which_command, command_name, e);
                false
            }
        }
    }

    fn find_in_system_path(command_name: &str) -> Option<PathBuf> {
        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(command_name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_commands() {
        let platform = PlatformCommands::instance();

        let exiftool = platform.get_command("exiftool");
        assert!(exiftool.starts_with("exiftool"));
        assert_eq!(platform.get_command("/opt/bin/exiftool"), "/opt/bin/exiftool");

        let which = platform.which_command();
        assert!(!which.is_empty());
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let platform = PlatformCommands::instance();
        assert!(!platform.is_command_available("definitely-not-a-real-exiftool").await);
        assert!(!platform.is_command_available("/nonexistent/dir/exiftool").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_is_available() {
        let platform = PlatformCommands::instance();
        assert!(platform.is_command_available("sh").await);
    }
}
