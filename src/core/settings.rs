//! Target settings, configuration flags, and the derived build mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;
use crate::core::option::{parse_bool, OptionName, ResolvedOptions};

/// Conf key that disables the test-execution step.
pub const SKIP_TEST_CONF: &str = "tools.build:skip_test";

/// Build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    #[default]
    Release,
    Debug,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Release => "Release",
            BuildType::Debug => "Debug",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(BuildType::Release),
            "debug" => Ok(BuildType::Debug),
            _ => Err(ConfigError::InvalidSetting {
                key: "build_type".to_string(),
                value: s.to_string(),
                reason: "valid values: Release, Debug".to_string(),
            }),
        }
    }
}

/// Compiler sub-settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerSettings {
    pub name: String,
    pub version: Option<String>,
    pub cppstd: Option<String>,
    pub libcxx: Option<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            name: "gcc".to_string(),
            version: None,
            cppstd: None,
            libcxx: None,
        }
    }
}

/// Target settings for a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub os: String,
    pub arch: String,
    pub compiler: CompilerSettings,
    pub build_type: BuildType,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::host()
    }
}

impl Settings {
    /// Settings describing the host machine.
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "Macos",
            "windows" => "Windows",
            "freebsd" => "FreeBSD",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "aarch64" => "armv8",
            "x86" => "x86",
            other => other,
        };

        Settings {
            os: os.to_string(),
            arch: arch.to_string(),
            compiler: CompilerSettings::default(),
            build_type: BuildType::default(),
        }
    }

    /// Apply a `key=value` setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key.trim() {
            "os" => self.os = value.to_string(),
            "arch" => self.arch = value.to_string(),
            "build_type" => self.build_type = value.parse()?,
            "compiler" => self.compiler.name = value.to_string(),
            "compiler.version" => self.compiler.version = Some(value.to_string()),
            "compiler.cppstd" => {
                if cppstd_level(value).is_none() {
                    return Err(ConfigError::InvalidSetting {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: "expected a C++ standard such as 17, 20 or gnu20".to_string(),
                    });
                }
                self.compiler.cppstd = Some(value.to_string());
            }
            "compiler.libcxx" => self.compiler.libcxx = Some(value.to_string()),
            other => {
                return Err(ConfigError::InvalidSetting {
                    key: other.to_string(),
                    value: value.to_string(),
                    reason: "unknown setting".to_string(),
                })
            }
        }
        Ok(())
    }

    /// The configured C++ standard as a comparable level, if any.
    pub fn cppstd_level(&self) -> Option<u32> {
        self.compiler.cppstd.as_deref().and_then(cppstd_level)
    }
}

/// Map a `cppstd` value (`17`, `gnu20`, `98`) to a comparable level.
pub fn cppstd_level(raw: &str) -> Option<u32> {
    let digits = raw.strip_prefix("gnu").unwrap_or(raw);
    match digits.parse::<u32>().ok()? {
        98 => Some(3),
        n @ (11 | 14 | 17 | 20 | 23 | 26) => Some(n),
        _ => None,
    }
}

/// Configuration flags that are not settings or options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conf {
    /// The test-execution step will not run
    pub skip_test: bool,
}

impl Conf {
    /// Apply a `key=value` conf entry.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key.trim() {
            SKIP_TEST_CONF | "skip_test" => {
                self.skip_test = parse_bool(value).ok_or_else(|| ConfigError::InvalidSetting {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "expected True or False".to_string(),
                })?;
                Ok(())
            }
            other => Err(ConfigError::InvalidSetting {
                key: other.to_string(),
                value: value.to_string(),
                reason: format!("unknown conf, supported: {}", SKIP_TEST_CONF),
            }),
        }
    }
}

/// Build type plus instrumentation flags.
///
/// The flags select the build root and sanitizer link flags in every build
/// type. Only the CMake instrumentation toggles are limited to Debug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BuildMode {
    pub build_type: BuildType,
    pub coverage: bool,
    pub sanitize: bool,
}

impl BuildMode {
    /// Derive the mode from the build type and resolved options.
    pub fn new(build_type: BuildType, options: &ResolvedOptions) -> Self {
        BuildMode {
            build_type,
            coverage: options.enabled(OptionName::Coverage),
            sanitize: options.enabled(OptionName::Sanitize),
        }
    }

    /// A plain mode with no instrumentation.
    pub fn plain(build_type: BuildType) -> Self {
        BuildMode {
            build_type,
            coverage: false,
            sanitize: false,
        }
    }

    pub fn is_debug(&self) -> bool {
        self.build_type == BuildType::Debug
    }
}
