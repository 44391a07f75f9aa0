use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Finds executables by name on a search path.
pub trait Locator {
    /// Resolve `program` using `search_path`, or the inherited `PATH` when
    /// none is given.
    fn locate(&self, program: &str, search_path: Option<&OsStr>) -> Option<PathBuf>;
}

/// [`Locator`] backed by `which`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPathLocator;

impl Locator for SearchPathLocator {
    fn locate(&self, program: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
        let paths = search_path
            .map(OsStr::to_os_string)
            .or_else(|| env::var_os("PATH"));
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(program, paths, cwd).ok()
    }
}
