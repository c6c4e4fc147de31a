//! Host platform family, used wherever paths or variable names differ per OS.

use crate::config::env_keys::child;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Linux, BSDs and everything else following XDG conventions.
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// Executable directory inside a virtual environment.
    pub fn bin_dir_name(self) -> &'static str {
        match self {
            Platform::Windows => "Scripts",
            _ => "bin",
        }
    }

    /// File name of an executable in the environment (`python` → `python.exe` on Windows).
    pub fn exe_name(self, stem: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", stem),
            _ => stem.to_string(),
        }
    }

    /// Variable naming the user's default shell.
    pub fn shell_var(self) -> &'static str {
        match self {
            Platform::Windows => child::COMSPEC,
            _ => child::SHELL,
        }
    }

    /// Variable holding the interactive prompt.
    pub fn prompt_var(self) -> &'static str {
        match self {
            Platform::Windows => child::PROMPT,
            _ => child::PS1,
        }
    }

    /// Copies are the default on Windows, symlinks elsewhere.
    pub fn default_symlinks(self) -> bool {
        !matches!(self, Platform::Windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_layout_names() {
        assert_eq!(Platform::Windows.bin_dir_name(), "Scripts");
        assert_eq!(Platform::Windows.exe_name("python"), "python.exe");
        assert_eq!(Platform::Windows.shell_var(), "COMSPEC");
        assert_eq!(Platform::Windows.prompt_var(), "PROMPT");
        assert!(!Platform::Windows.default_symlinks());
    }

    #[test]
    fn test_unix_layout_names() {
        for p in [Platform::Unix, Platform::MacOs] {
            assert_eq!(p.bin_dir_name(), "bin");
            assert_eq!(p.exe_name("pip"), "pip");
            assert_eq!(p.shell_var(), "SHELL");
            assert_eq!(p.prompt_var(), "PS1");
            assert!(p.default_symlinks());
        }
    }
}
