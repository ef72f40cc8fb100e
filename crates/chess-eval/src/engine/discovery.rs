//! Locating the engine executable.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::EngineError;

/// Conventional install locations, probed in order.
pub const ENGINE_CANDIDATES: &[&str] = &[
    "/usr/games/stockfish",
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
];

/// Name looked up on `PATH` when no conventional location exists.
pub const ENGINE_BARE_NAME: &str = "stockfish";

/// Last resort, relative to the working directory.
pub const ENGINE_LOCAL_FALLBACK: &str = "./stockfish";

pub const INSTALL_HINT: &str =
    "Install with: sudo apt-get install stockfish (Linux) or brew install stockfish (Mac)";

/// Resolves the engine executable.
///
/// An explicit path must exist; a bare name is looked up on `PATH`.
/// Without one, [`ENGINE_CANDIDATES`] are probed, then [`ENGINE_BARE_NAME`]
/// on `PATH`, then [`ENGINE_LOCAL_FALLBACK`].
pub fn discover_engine(explicit: Option<&Path>) -> Result<PathBuf, EngineError> {
    let search_path = env::var_os("PATH");
    match explicit {
        Some(path) => resolve_explicit(path, search_path.as_deref()),
        None => {
            let candidates: Vec<PathBuf> = ENGINE_CANDIDATES.iter().map(PathBuf::from).collect();
            find_engine(&candidates, search_path.as_deref())
        }
    }
}

fn resolve_explicit(path: &Path, search_path: Option<&OsStr>) -> Result<PathBuf, EngineError> {
    if is_bare_name(path) {
        if let Some(found) = search_on_path(path, search_path) {
            return Ok(found);
        }
    } else if path.is_file() {
        return Ok(path.to_path_buf());
    }
    Err(EngineError::Unavailable(format!(
        "engine not found at {}. {}",
        path.display(),
        INSTALL_HINT
    )))
}

pub(crate) fn find_engine(
    candidates: &[PathBuf],
    search_path: Option<&OsStr>,
) -> Result<PathBuf, EngineError> {
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .or_else(|| search_on_path(Path::new(ENGINE_BARE_NAME), search_path))
        .or_else(|| Some(PathBuf::from(ENGINE_LOCAL_FALLBACK)).filter(|p| p.is_file()))
        .ok_or_else(|| EngineError::Unavailable(format!("Stockfish not found. {}", INSTALL_HINT)))
}

fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && path.parent() == Some(Path::new(""))
}

fn search_on_path(name: &Path, search_path: Option<&OsStr>) -> Option<PathBuf> {
    env::split_paths(search_path?)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("second");
        let third = dir.path().join("third");
        File::create(&second).unwrap();
        File::create(&third).unwrap();

        let candidates = vec![dir.path().join("missing"), second.clone(), third];
        assert_eq!(find_engine(&candidates, None).unwrap(), second);
    }

    #[test]
    fn bare_name_is_resolved_on_path() {
        let dir = tempfile::tempdir().unwrap();
        let on_path = dir.path().join(ENGINE_BARE_NAME);
        File::create(&on_path).unwrap();

        let search_path = env::join_paths([dir.path()]).unwrap();
        let candidates = vec![dir.path().join("missing")];
        assert_eq!(
            find_engine(&candidates, Some(search_path.as_os_str())).unwrap(),
            on_path
        );
    }

    #[test]
    fn nothing_found_mentions_package_managers() {
        let dir = tempfile::tempdir().unwrap();
        let empty_path = env::join_paths([dir.path()]).unwrap();
        let candidates = vec![dir.path().join("missing")];

        match find_engine(&candidates, Some(empty_path.as_os_str())) {
            Err(EngineError::Unavailable(msg)) => {
                assert!(msg.contains("apt-get install stockfish"));
                assert!(msg.contains("brew install stockfish"));
            }
            // A stray ./stockfish in the working directory is a valid find.
            Ok(path) => assert_eq!(path, PathBuf::from(ENGINE_LOCAL_FALLBACK)),
            Err(other) => panic!("Expected Unavailable, got {:?}", other),
        }
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = discover_engine(Some(Path::new("/nonexistent/path/to/stockfish"))).unwrap_err();
        match err {
            EngineError::Unavailable(msg) => assert!(msg.contains("/nonexistent/path/to/stockfish")),
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }

    #[test]
    fn explicit_existing_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let engine = dir.path().join("my-engine");
        File::create(&engine).unwrap();

        assert_eq!(discover_engine(Some(&engine)).unwrap(), engine);
    }

    #[test]
    fn bare_name_detection() {
        assert!(is_bare_name(Path::new("stockfish")));
        assert!(!is_bare_name(Path::new("./stockfish")));
        assert!(!is_bare_name(Path::new("/usr/bin/stockfish")));
    }
}
