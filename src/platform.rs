//! Host platform classification
//!
//! Computed once at startup (or taken from configuration) and handed to the
//! controller; nothing reads it from global state.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Windows,
    Linux,
    /// Intel Mac
    Mac,
    /// Apple Silicon Mac
    MacArm,
    Other,
}

impl Platform {
    /// Classify the platform this process was built for
    pub fn detect() -> Self {
        Self::classify(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Classify from an OS name and CPU architecture
    ///
    /// Accepts both Rust target names (`macos`, `aarch64`) and the
    /// JVM-style names reported by some hosts (`Mac OS X`).
    pub fn classify(os: &str, arch: &str) -> Self {
        let os = os.to_ascii_lowercase();
        if os.contains("windows") {
            Platform::Windows
        } else if os.contains("linux") {
            Platform::Linux
        } else if os.contains("macos") || os.contains("mac os x") {
            if arch.to_ascii_lowercase().contains("aarch64") {
                Platform::MacArm
            } else {
                Platform::Mac
            }
        } else {
            Platform::Other
        }
    }

    pub fn is_mac(self) -> bool {
        matches!(self, Platform::Mac | Platform::MacArm)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Mac => "macOS (Intel)",
            Platform::MacArm => "macOS (ARM)",
            Platform::Other => "Other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Platform::classify("windows", "x86_64"), Platform::Windows);
        assert_eq!(Platform::classify("Windows 10", "amd64"), Platform::Windows);
        assert_eq!(Platform::classify("linux", "aarch64"), Platform::Linux);
        assert_eq!(Platform::classify("macos", "x86_64"), Platform::Mac);
        assert_eq!(Platform::classify("macos", "aarch64"), Platform::MacArm);
        assert_eq!(Platform::classify("Mac OS X", "AARCH64"), Platform::MacArm);
        assert_eq!(Platform::classify("freebsd", "x86_64"), Platform::Other);
    }

    #[test]
    fn test_detect_matches_classify() {
        let detected = Platform::detect();
        assert_eq!(
            detected,
            Platform::classify(std::env::consts::OS, std::env::consts::ARCH)
        );
    }
}
