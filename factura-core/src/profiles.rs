//! Render profile tables + YAML persistence.
//!
//! A [`RenderProfile`] is the explicit configuration for one render attempt:
//! per-stage timeouts, the settle delay, and the resource classes the engine
//! blocks. [`RenderProfiles`] pairs the full (primary) and degraded
//! (fallback) profiles and can be persisted so operators tune timeouts per
//! environment instead of patching code.
//!
//! # Storage layout
//!
//! ```text
//! ~/.factura/
//!   profiles.yaml   (mode 0600, created by `init`)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Resource classes
// ---------------------------------------------------------------------------

/// A class of page resource the engine refuses to load during a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Image,
    Font,
    Media,
    Stylesheet,
    Script,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceClass::Image => write!(f, "image"),
            ResourceClass::Font => write!(f, "font"),
            ResourceClass::Media => write!(f, "media"),
            ResourceClass::Stylesheet => write!(f, "stylesheet"),
            ResourceClass::Script => write!(f, "script"),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderProfile
// ---------------------------------------------------------------------------

/// Timeout and resource-blocking configuration for one render attempt.
///
/// All durations are stored as millisecond fields so the YAML stays plain;
/// use the `*_timeout()` / `settle_delay()` accessors for [`Duration`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderProfile {
    /// Maximum time for the engine process to become ready.
    pub launch_timeout_ms: u64,
    /// Default bound for individual protocol calls once the page is open.
    pub protocol_timeout_ms: u64,
    /// Bound on loading markup until the document-ready signal fires.
    pub content_load_timeout_ms: u64,
    /// Fixed delay between document-ready and export, letting asynchronous
    /// layout finish. Heuristic — tunable, not a correctness guarantee.
    pub settle_delay_ms: u64,
    /// Bound on the binary-export protocol call.
    pub export_timeout_ms: u64,
    /// Resource classes blocked while the page loads.
    #[serde(default)]
    pub blocked: Vec<ResourceClass>,
}

impl RenderProfile {
    /// Primary-attempt profile: generous timeouts, scripts allowed.
    pub fn full() -> Self {
        RenderProfile {
            launch_timeout_ms: 30_000,
            protocol_timeout_ms: 15_000,
            content_load_timeout_ms: 10_000,
            settle_delay_ms: 600,
            export_timeout_ms: 20_000,
            blocked: vec![
                ResourceClass::Image,
                ResourceClass::Font,
                ResourceClass::Media,
                ResourceClass::Stylesheet,
            ],
        }
    }

    /// Fallback profile: tight timeouts, scripts blocked as well, so the
    /// engine has the smallest possible surface to crash on.
    pub fn degraded() -> Self {
        RenderProfile {
            launch_timeout_ms: 15_000,
            protocol_timeout_ms: 8_000,
            content_load_timeout_ms: 5_000,
            settle_delay_ms: 250,
            export_timeout_ms: 10_000,
            blocked: vec![
                ResourceClass::Image,
                ResourceClass::Font,
                ResourceClass::Media,
                ResourceClass::Stylesheet,
                ResourceClass::Script,
            ],
        }
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    pub fn protocol_timeout(&self) -> Duration {
        Duration::from_millis(self.protocol_timeout_ms)
    }

    pub fn content_load_timeout(&self) -> Duration {
        Duration::from_millis(self.content_load_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }

    /// Whether `class` is blocked under this profile.
    pub fn blocks(&self, class: ResourceClass) -> bool {
        self.blocked.contains(&class)
    }
}

// ---------------------------------------------------------------------------
// RenderProfiles
// ---------------------------------------------------------------------------

/// The pair of profiles one `generate` call runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderProfiles {
    pub full: RenderProfile,
    pub degraded: RenderProfile,
}

impl Default for RenderProfiles {
    fn default() -> Self {
        RenderProfiles {
            full: RenderProfile::full(),
            degraded: RenderProfile::degraded(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}

/// `<home>/.factura/` — pure, no I/O.
pub fn factura_root_at(home: &Path) -> PathBuf {
    home.join(".factura")
}

/// `<home>/.factura/profiles.yaml` — pure, no I/O.
pub fn profiles_path_at(home: &Path) -> PathBuf {
    factura_root_at(home).join("profiles.yaml")
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o700);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load profiles from `<home>/.factura/profiles.yaml`.
///
/// Returns `CoreError::ProfilesNotFound` if absent,
/// `CoreError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<RenderProfiles, CoreError> {
    let path = profiles_path_at(home);
    load_from(&path)
}

/// Load profiles from an explicit file path (CLI `--profiles` flag).
pub fn load_from(path: &Path) -> Result<RenderProfiles, CoreError> {
    if !path.exists() {
        return Err(CoreError::ProfilesNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<RenderProfiles, CoreError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save profiles to `<home>/.factura/profiles.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_at(home: &Path, profiles: &RenderProfiles) -> Result<(), CoreError> {
    let dir = factura_root_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = profiles_path_at(home);
    let tmp_path = path.with_file_name("profiles.yaml.tmp");

    let yaml = serde_yaml::to_string(profiles)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(profiles: &RenderProfiles) -> Result<(), CoreError> {
    save_at(&home()?, profiles)
}

/// Atomically save profiles to an explicit file path (CLI `--file` flag).
///
/// Explicit-path files are operator-managed; no permission tightening.
pub fn save_to(path: &Path, profiles: &RenderProfiles) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_file_name(format!(
        "{}.tmp",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    ));
    let yaml = serde_yaml::to_string(profiles)?;
    std::fs::write(&tmp_path, yaml)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Write the default profile table if no file exists yet.
///
/// Idempotent: an existing file is loaded and returned unchanged.
pub fn init_at(home: &Path) -> Result<RenderProfiles, CoreError> {
    let path = profiles_path_at(home);
    if path.exists() {
        return load_at(home);
    }
    let profiles = RenderProfiles::default();
    save_at(home, &profiles)?;
    Ok(profiles)
}

/// `init_at` convenience wrapper.
pub fn init() -> Result<RenderProfiles, CoreError> {
    init_at(&home()?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
