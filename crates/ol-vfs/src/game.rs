//! Locating a game's executable and install root on the host

use crate::probe;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// How many directory levels below an install dir are searched for a game ID
pub const MAX_SEARCH_DEPTH: usize = 5;

/// Suffixes of sibling folders that hold an update or patch for a base game
const UPDATE_SUFFIXES: [&str; 2] = ["-UPDATE", "-patch"];

/// Pick the folder treated as the game's install root.
///
/// An explicit folder is returned untouched. Otherwise the executable's
/// parent is used, except that `Foo-UPDATE/` or `Foo-patch/` redirect to a
/// sibling `Foo/` when that directory exists.
pub fn resolve_game_folder(file: &Path, provided_folder: Option<PathBuf>) -> PathBuf {
    if let Some(folder) = provided_folder {
        return folder;
    }

    let game_folder = file.parent().map(Path::to_path_buf).unwrap_or_default();
    let Some(folder_name) = game_folder.file_name().and_then(|n| n.to_str()) else {
        return game_folder;
    };

    if UPDATE_SUFFIXES.iter().any(|suffix| folder_name.ends_with(suffix)) {
        if let Some(hyphen) = folder_name.rfind('-') {
            let base_path = game_folder.with_file_name(&folder_name[..hyphen]);
            if probe::is_dir(&base_path) {
                tracing::debug!("Using base game folder {} for {}", base_path.display(), game_folder.display());
                return base_path;
            }
        }
    }

    game_folder
}

/// Depth-first search below `dir` for a folder named `game_id` holding
/// `sce_sys/param.sfo` and `eboot.bin`. Returns the `eboot.bin` path.
///
/// Subdirectories are visited in sorted order so the first match is stable.
pub fn find_game_by_id(dir: &Path, game_id: impl AsRef<OsStr>, max_depth: usize) -> Option<PathBuf> {
    search_dir(dir, game_id.as_ref(), max_depth)
}

fn search_dir(dir: &Path, game_id: &OsStr, max_depth: usize) -> Option<PathBuf> {
    if dir.file_name() == Some(game_id)
        && probe::exists(&dir.join("sce_sys").join("param.sfo"))
    {
        let eboot = dir.join("eboot.bin");
        if probe::exists(&eboot) {
            return Some(eboot);
        }
    }

    if max_depth == 0 {
        return None;
    }

    let entries = std::fs::read_dir(dir).ok()?;
    let mut children: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| probe::is_dir(path))
        .collect();
    children.sort();

    children
        .iter()
        .find_map(|child| search_dir(child, game_id, max_depth - 1))
}

/// Turn a command-line token into an executable path.
///
/// An existing path is returned as-is. Anything else is treated as a game ID
/// and looked up in each install directory in order.
pub fn resolve_game_path(game: impl AsRef<OsStr>, install_dirs: &[PathBuf]) -> Option<PathBuf> {
    let game = game.as_ref();
    let direct = PathBuf::from(game);
    if probe::exists(&direct) {
        return Some(direct);
    }

    install_dirs.iter().find_map(|install_dir| {
        let found = search_dir(install_dir, game, MAX_SEARCH_DEPTH);
        if let Some(path) = &found {
            tracing::info!("Resolved game ID {} to {}", game.to_string_lossy(), path.display());
        }
        found
    })
}
