// Process Initialization
//
// One-time setup shared by every engine instance in the process: platform
// prerequisite checks, the loader-flag bracket around builtin module
// registration, and on Windows the DLL search-path extension.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use thiserror::Error;

use crate::exec::functions;

/// Lazy symbol resolution.
pub const LOADER_LAZY: u32 = 0x0001;
/// Loaded symbols are visible to subsequently loaded modules.
pub const LOADER_GLOBAL: u32 = 0x0100;

static LOADER_FLAGS: Lazy<Mutex<u32>> = Lazy::new(|| Mutex::new(LOADER_LAZY));

static INIT_DONE: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

#[derive(Error, Debug)]
pub enum InitError {
    #[error("{var} must be set ({purpose})")]
    MissingPrerequisite { var: String, purpose: String },
    #[error("failed to load engine modules: {0}")]
    ModuleLoad(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Platform {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Other
        }
    }
}

/// An environment variable the platform requires before module loading.
pub struct EnvRequirement {
    pub var: &'static str,
    pub purpose: &'static str,
}

/// Environment variables that must be set on the given platform.
pub fn required_env_vars(platform: Platform) -> &'static [EnvRequirement] {
    match platform {
        Platform::Windows => &[EnvRequirement {
            var: "JAVA_HOME",
            purpose: "locating the JVM runtime used by the SQL frontend",
        }],
        Platform::Linux | Platform::Other => &[],
    }
}

/// Check the platform's prerequisites through the supplied environment
/// lookup. Split out from [`initialize`] so it is testable on any host.
pub fn check_prerequisites<F>(platform: Platform, lookup: F) -> Result<(), InitError>
where
    F: Fn(&str) -> Option<String>,
{
    for req in required_env_vars(platform) {
        if lookup(req.var).map_or(true, |v| v.is_empty()) {
            return Err(InitError::MissingPrerequisite {
                var: req.var.to_string(),
                purpose: req.purpose.to_string(),
            });
        }
    }
    Ok(())
}

/// The loader-flag mask currently in effect.
pub fn loader_flags() -> u32 {
    *LOADER_FLAGS.lock()
}

/// Scoped override of the loader-flag mask. The previous mask is restored
/// when the guard drops, on both success and error paths.
pub struct LoaderFlagsGuard {
    saved: u32,
}

impl LoaderFlagsGuard {
    pub fn set(flags: u32) -> LoaderFlagsGuard {
        let mut mask = LOADER_FLAGS.lock();
        let saved = *mask;
        *mask = flags;
        LoaderFlagsGuard { saved }
    }
}

impl Drop for LoaderFlagsGuard {
    fn drop(&mut self) {
        *LOADER_FLAGS.lock() = self.saved;
    }
}

/// Run process-wide setup once. Subsequent calls return immediately; a
/// failed call leaves the process uninitialized so it can be retried.
pub fn initialize() -> Result<(), InitError> {
    let mut done = INIT_DONE.lock();
    if *done {
        return Ok(());
    }

    let platform = Platform::current();
    check_prerequisites(platform, |var| std::env::var(var).ok())?;

    #[cfg(windows)]
    extend_dll_search_path()?;

    // Builtin registration runs with symbols resolved lazily and exported
    // globally, so modules loaded later can link against them.
    {
        let _guard = LoaderFlagsGuard::set(LOADER_LAZY | LOADER_GLOBAL);
        register_engine_modules()?;
    }

    *done = true;
    log::debug!("engine initialized on {:?}", platform);
    Ok(())
}

fn register_engine_modules() -> Result<(), InitError> {
    if functions::registry_size() == 0 {
        return Err(InitError::ModuleLoad(
            "builtin function registry is empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(windows)]
fn extend_dll_search_path() -> Result<(), InitError> {
    use std::path::PathBuf;

    let java_home = std::env::var("JAVA_HOME").map_err(|_| InitError::MissingPrerequisite {
        var: "JAVA_HOME".to_string(),
        purpose: "locating the JVM runtime used by the SQL frontend".to_string(),
    })?;
    let server = PathBuf::from(&java_home).join("bin").join("server");
    let mut path = std::env::var("PATH").unwrap_or_default();
    if !path.is_empty() {
        path.push(';');
    }
    path.push_str(&server.to_string_lossy());
    // Runs during single-threaded process startup, before any engine
    // component spawns threads.
    unsafe {
        std::env::set_var("PATH", path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // initialize() flips process-global state, so its idempotence is
    // covered by the integration tests; here we only exercise the pure
    // pieces and the guard.

    // The guard tests share the global mask, so they must not interleave.
    static FLAG_TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn test_guard_restores_on_drop() {
        let _lock = FLAG_TEST_LOCK.lock();
        let before = loader_flags();
        {
            let _guard = LoaderFlagsGuard::set(LOADER_LAZY | LOADER_GLOBAL);
            assert_eq!(loader_flags(), LOADER_LAZY | LOADER_GLOBAL);
        }
        assert_eq!(loader_flags(), before);
    }

    #[test]
    fn test_guard_restores_on_unwind() {
        let _lock = FLAG_TEST_LOCK.lock();
        let before = loader_flags();
        let result = std::panic::catch_unwind(|| {
            let _guard = LoaderFlagsGuard::set(LOADER_GLOBAL);
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(loader_flags(), before);
    }

    #[test]
    fn test_windows_requires_java_home() {
        let reqs = required_env_vars(Platform::Windows);
        assert!(reqs.iter().any(|r| r.var == "JAVA_HOME"));
        assert!(required_env_vars(Platform::Linux).is_empty());
    }

    #[test]
    fn test_prerequisite_failure_names_variable() {
        let err = check_prerequisites(Platform::Windows, |_| None).unwrap_err();
        assert!(err.to_string().contains("JAVA_HOME"));

        // Empty values count as unset.
        let err =
            check_prerequisites(Platform::Windows, |_| Some(String::new())).unwrap_err();
        assert!(matches!(err, InitError::MissingPrerequisite { .. }));

        check_prerequisites(Platform::Windows, |_| Some("/opt/jdk".to_string())).unwrap();
    }
}
