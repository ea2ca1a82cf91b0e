//! Game metadata extracted from `sce_sys/param.sfo`

use crate::formats::sfo::Sfo;
use crate::probe;
use bitflags::bitflags;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Firmware version assumed when SYSTEM_VER is missing
pub const DEFAULT_FW_VERSION: u32 = 0x0470_0000;

pub const UNKNOWN_TITLE: &str = "Unknown title";
pub const UNKNOWN_VERSION: &str = "Unknown version";

/// Offset of the title ID inside a content ID ("UP0000-CUSA00001_00-...")
const CONTENT_ID_TITLE_OFFSET: usize = 7;
const TITLE_ID_LEN: usize = 9;

/// Key inside PUBTOOLINFO carrying the SDK version, followed by '='
const SDK_VER_KEY: &str = "sdk_ver";

bitflags! {
    /// Bits of the ATTRIBUTE entry that the launcher cares about
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PsfAttributes: u32 {
        const SUPPORT_PS_VR = 1 << 14;
        const REQUIRE_PS_VR = 1 << 22;
    }
}

/// Typed view of a game's PARAM.SFO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsfData {
    pub id: String,
    pub title: String,
    pub app_version: String,
    pub fw_version: u32,
    pub sdk_version: u32,
    pub psvr_supported: bool,
    pub psvr_required: bool,
    /// `pic1.png` next to the param file, when present
    pub splash_path: Option<PathBuf>,
}

impl PsfData {
    /// Extract metadata from an opened table
    pub fn from_sfo(sfo: &Sfo) -> Self {
        let fw_version = sfo.get_integer("SYSTEM_VER").unwrap_or(DEFAULT_FW_VERSION);
        let sdk_version = sfo
            .get_string("PUBTOOLINFO")
            .map(|info| parse_sdk_version(info, fw_version))
            .unwrap_or(fw_version);

        let attributes = sfo
            .get_integer("ATTRIBUTE")
            .map(PsfAttributes::from_bits_truncate)
            .unwrap_or(PsfAttributes::empty());

        Self {
            id: extract_id(sfo.get_string("CONTENT_ID"), sfo.get_string("TITLE_ID")),
            title: sfo.get_string("TITLE").unwrap_or(UNKNOWN_TITLE).to_string(),
            app_version: sfo.get_string("APP_VER").unwrap_or(UNKNOWN_VERSION).to_string(),
            fw_version,
            sdk_version,
            psvr_supported: attributes.contains(PsfAttributes::SUPPORT_PS_VR),
            psvr_required: attributes.contains(PsfAttributes::REQUIRE_PS_VR),
            splash_path: None,
        }
    }

    pub fn log(&self) {
        info!("Game id: {} Title: {}", self.id, self.title);
        info!("Fw: {:#x} App Version: {}", self.fw_version, self.app_version);
        info!("param.sfo SDK version: {:#x}", self.sdk_version);
        info!("PSVR Supported: {}", self.psvr_supported);
        info!("PSVR Required: {}", self.psvr_required);
    }
}

/// Load metadata from a param file.
///
/// A missing file is not an error; an unreadable one is logged. Both yield `None`.
pub fn load_psf_data(param_sfo_path: &Path) -> Option<PsfData> {
    if !probe::exists(param_sfo_path) {
        return None;
    }

    let sfo = match Sfo::open(param_sfo_path) {
        Ok(sfo) => sfo,
        Err(e) => {
            error!("Failed to open param.sfo: {}", e);
            return None;
        }
    };

    let mut data = PsfData::from_sfo(&sfo);
    data.splash_path = probe::find_file_if_exists(&param_sfo_path.with_file_name("pic1.png"));
    Some(data)
}

/// Content ID wins over title ID. A content ID too short to hold a title ID
/// defers to TITLE_ID, or is used whole when that is missing.
///
/// Offsets are in bytes. A cut that would split a UTF-8 sequence is moved
/// back to the previous character boundary, so the result is never empty
/// when the content ID is not.
fn extract_id(content_id: Option<&str>, title_id: Option<&str>) -> String {
    let Some(content_id) = content_id.filter(|c| !c.is_empty()) else {
        return title_id.unwrap_or_default().to_string();
    };

    if content_id.len() <= CONTENT_ID_TITLE_OFFSET {
        return title_id.unwrap_or(content_id).to_string();
    }

    let rest = &content_id[floor_char_boundary(content_id, CONTENT_ID_TITLE_OFFSET)..];
    rest[..floor_char_boundary(rest, TITLE_ID_LEN)].to_string()
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Parse `sdk_ver=XXXXXXXX` out of PUBTOOLINFO. Malformed hex falls back to `fw_version`.
fn parse_sdk_version(pubtool_info: &str, fw_version: u32) -> u32 {
    let Some(start) = pubtool_info.find(SDK_VER_KEY) else {
        return fw_version;
    };

    let value = pubtool_info
        .get(start + SDK_VER_KEY.len() + 1..)
        .and_then(|rest| rest.split(',').next())
        .unwrap_or_default();

    match u32::from_str_radix(value, 16) {
        Ok(version) => version,
        Err(e) => {
            warn!("Malformed sdk_ver '{}' in PUBTOOLINFO ({}), using firmware version", value, e);
            fw_version
        }
    }
}
