//! Host file system helpers for orbis-launcher

pub mod formats;
pub mod game;
pub mod metadata;
pub mod probe;

pub use formats::sfo::{Sfo, SfoBuilder, SfoError, SfoValue};
pub use game::{find_game_by_id, resolve_game_folder, resolve_game_path, MAX_SEARCH_DEPTH};
pub use metadata::{load_psf_data, PsfAttributes, PsfData};
