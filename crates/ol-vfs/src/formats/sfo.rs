//! PARAM.SFO file format
//!
//! Layout (all little-endian):
//! - Header (20 bytes): magic `\0PSF`, version, key table offset, data table offset, entry count
//! - Index table: 16 bytes per entry (key offset u16, format u16, length u32, max length u32, data offset u32)
//! - Key table: NUL-terminated names
//! - Data table: values, each padded to its max length

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const MAGIC: &[u8; 4] = b"\x00PSF";
const VERSION: u32 = 0x0101;
const HEADER_SIZE: usize = 20;
const INDEX_ENTRY_SIZE: usize = 16;

/// Entry data formats
pub mod data_format {
    /// UTF-8 string, not NUL-terminated
    pub const UTF8_SPECIAL: u16 = 0x0004;
    /// UTF-8 string, NUL-terminated
    pub const UTF8: u16 = 0x0204;
    pub const INTEGER: u16 = 0x0404;
}

/// PARAM.SFO errors
#[derive(Error, Debug)]
pub enum SfoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SFO magic")]
    InvalidMagic,

    #[error("SFO truncated: {0}")]
    Truncated(&'static str),
}

/// SFO file entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfoValue {
    Utf8(String),
    Utf8S(String),
    Integer(u32),
}

/// PARAM.SFO key/value table
#[derive(Debug, Clone, Default)]
pub struct Sfo {
    entries: BTreeMap<String, SfoValue>,
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

impl Sfo {
    /// Create a new empty SFO
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse the file at `path`
    pub fn open(path: &Path) -> Result<Self, SfoError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse SFO from an in-memory image
    pub fn from_bytes(data: &[u8]) -> Result<Self, SfoError> {
        if data.len() < HEADER_SIZE {
            return Err(SfoError::Truncated("header"));
        }
        if &data[0..4] != MAGIC {
            return Err(SfoError::InvalidMagic);
        }

        let key_table = read_u32(data, 8).ok_or(SfoError::Truncated("header"))? as usize;
        let data_table = read_u32(data, 12).ok_or(SfoError::Truncated("header"))? as usize;
        let count = read_u32(data, 16).ok_or(SfoError::Truncated("header"))? as usize;

        let mut entries = BTreeMap::new();

        for i in 0..count {
            let base = HEADER_SIZE + i * INDEX_ENTRY_SIZE;
            let index = data
                .get(base..base + INDEX_ENTRY_SIZE)
                .ok_or(SfoError::Truncated("index table"))?;

            let key_offset = read_u16(index, 0).unwrap_or_default() as usize;
            let data_fmt = read_u16(index, 2).unwrap_or_default();
            let data_len = read_u32(index, 4).unwrap_or_default() as usize;
            let data_offset = read_u32(index, 12).unwrap_or_default() as usize;

            let key_start = key_table + key_offset;
            let key_bytes = data.get(key_start..).ok_or(SfoError::Truncated("key table"))?;
            let key_end = key_bytes
                .iter()
                .position(|&b| b == 0)
                .ok_or(SfoError::Truncated("key table"))?;
            let key = String::from_utf8_lossy(&key_bytes[..key_end]).into_owned();

            let value_start = data_table + data_offset;
            let value = match data_fmt {
                data_format::INTEGER => {
                    let v = read_u32(data, value_start).ok_or(SfoError::Truncated("data table"))?;
                    SfoValue::Integer(v)
                }
                data_format::UTF8 | data_format::UTF8_SPECIAL => {
                    let raw = data
                        .get(value_start..value_start + data_len)
                        .ok_or(SfoError::Truncated("data table"))?;
                    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                    let s = String::from_utf8_lossy(&raw[..end]).into_owned();
                    if data_fmt == data_format::UTF8_SPECIAL {
                        SfoValue::Utf8S(s)
                    } else {
                        SfoValue::Utf8(s)
                    }
                }
                other => {
                    tracing::debug!("Skipping SFO key {} with unknown format 0x{:04x}", key, other);
                    continue;
                }
            };

            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            SfoValue::Utf8(s) | SfoValue::Utf8S(s) => Some(s),
            SfoValue::Integer(_) => None,
        }
    }

    /// Get an integer value
    pub fn get_integer(&self, key: &str) -> Option<u32> {
        match self.entries.get(key)? {
            SfoValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Add a string entry
    pub fn add_string(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), SfoValue::Utf8(value.to_string()));
    }

    /// Add an integer entry
    pub fn add_integer(&mut self, key: &str, value: u32) {
        self.entries.insert(key.to_string(), SfoValue::Integer(value));
    }

    /// Get all entries
    pub fn entries(&self) -> &BTreeMap<String, SfoValue> {
        &self.entries
    }

    /// Generate PARAM.SFO binary data, keys in sorted order
    pub fn generate(&self) -> Vec<u8> {
        let count = self.entries.len();
        let key_table_offset = HEADER_SIZE + count * INDEX_ENTRY_SIZE;

        let mut keys = Vec::new();
        let mut values = Vec::new();
        let mut index = Vec::with_capacity(count * INDEX_ENTRY_SIZE);

        for (key, value) in &self.entries {
            let key_offset = keys.len() as u16;
            keys.extend_from_slice(key.as_bytes());
            keys.push(0);

            let data_offset = values.len() as u32;
            let (data_fmt, len, bytes) = match value {
                SfoValue::Integer(v) => (data_format::INTEGER, 4, v.to_le_bytes().to_vec()),
                SfoValue::Utf8(s) => {
                    let mut bytes = s.as_bytes().to_vec();
                    bytes.push(0);
                    (data_format::UTF8, bytes.len() as u32, bytes)
                }
                SfoValue::Utf8S(s) => (data_format::UTF8_SPECIAL, s.len() as u32, s.as_bytes().to_vec()),
            };
            let max_len = (bytes.len() as u32 + 3) & !3;
            values.extend_from_slice(&bytes);
            values.resize(values.len() + (max_len as usize - bytes.len()), 0);

            index.extend_from_slice(&key_offset.to_le_bytes());
            index.extend_from_slice(&data_fmt.to_le_bytes());
            index.extend_from_slice(&len.to_le_bytes());
            index.extend_from_slice(&max_len.to_le_bytes());
            index.extend_from_slice(&data_offset.to_le_bytes());
        }

        // Data table starts 4-byte aligned
        keys.resize((keys.len() + 3) & !3, 0);
        let data_table_offset = key_table_offset + keys.len();

        let mut data = Vec::with_capacity(data_table_offset + values.len());
        data.extend_from_slice(MAGIC);
        data.extend_from_slice(&VERSION.to_le_bytes());
        data.extend_from_slice(&(key_table_offset as u32).to_le_bytes());
        data.extend_from_slice(&(data_table_offset as u32).to_le_bytes());
        data.extend_from_slice(&(count as u32).to_le_bytes());
        data.extend(index);
        data.extend(keys);
        data.extend(values);
        data
    }
}

/// Builder for creating PARAM.SFO files
#[derive(Default)]
pub struct SfoBuilder {
    sfo: Sfo,
}

impl SfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.sfo.add_string("TITLE", title);
        self
    }

    /// Set the title ID (e.g., "CUSA00001")
    pub fn title_id(mut self, title_id: &str) -> Self {
        self.sfo.add_string("TITLE_ID", title_id);
        self
    }

    /// Set the content ID (e.g., "UP0000-CUSA00001_00-0000000000000000")
    pub fn content_id(mut self, content_id: &str) -> Self {
        self.sfo.add_string("CONTENT_ID", content_id);
        self
    }

    pub fn app_ver(mut self, app_ver: &str) -> Self {
        self.sfo.add_string("APP_VER", app_ver);
        self
    }

    pub fn system_ver(mut self, system_ver: u32) -> Self {
        self.sfo.add_integer("SYSTEM_VER", system_ver);
        self
    }

    /// Set the publishing tool info (e.g., "c_date=20190101,sdk_ver=04508001")
    pub fn pubtool_info(mut self, info: &str) -> Self {
        self.sfo.add_string("PUBTOOLINFO", info);
        self
    }

    /// Set the attribute (bitmask)
    pub fn attribute(mut self, attr: u32) -> Self {
        self.sfo.add_integer("ATTRIBUTE", attr);
        self
    }

    /// Set the category (e.g., "gd" for a game application)
    pub fn category(mut self, category: &str) -> Self {
        self.sfo.add_string("CATEGORY", category);
        self
    }

    pub fn add_string(mut self, key: &str, value: &str) -> Self {
        self.sfo.add_string(key, value);
        self
    }

    pub fn add_integer(mut self, key: &str, value: u32) -> Self {
        self.sfo.add_integer(key, value);
        self
    }

    pub fn build(self) -> Sfo {
        self.sfo
    }

    /// Generate PARAM.SFO binary data
    pub fn generate(self) -> Vec<u8> {
        self.sfo.generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sfo_new() {
        let sfo = Sfo::new();
        assert!(sfo.entries().is_empty());
    }

    #[test]
    fn test_sfo_builder_generate_and_parse() {
        let data = SfoBuilder::new()
            .title("Test Game")
            .content_id("UP0000-CUSA00001_00-0000000000000000")
            .app_ver("01.02")
            .system_ver(0x0450_0000)
            .attribute(1 << 14)
            .generate();

        assert_eq!(&data[0..4], b"\x00PSF");

        let parsed = Sfo::from_bytes(&data).expect("Failed to parse generated SFO");

        assert_eq!(parsed.get_string("TITLE"), Some("Test Game"));
        assert_eq!(
            parsed.get_string("CONTENT_ID"),
            Some("UP0000-CUSA00001_00-0000000000000000")
        );
        assert_eq!(parsed.get_string("APP_VER"), Some("01.02"));
        assert_eq!(parsed.get_integer("SYSTEM_VER"), Some(0x0450_0000));
        assert_eq!(parsed.get_integer("ATTRIBUTE"), Some(1 << 14));
    }

    #[test]
    fn test_special_strings_round_trip() {
        let mut sfo = Sfo::new();
        sfo.entries.insert("PUBTOOLINFO".to_string(), SfoValue::Utf8S("sdk_ver=01000000".to_string()));

        let parsed = Sfo::from_bytes(&sfo.generate()).unwrap();
        assert_eq!(parsed.get_string("PUBTOOLINFO"), Some("sdk_ver=01000000"));
    }

    #[test]
    fn test_type_mismatch_returns_none() {
        let sfo = SfoBuilder::new().title("Game").attribute(3).build();
        assert_eq!(sfo.get_integer("TITLE"), None);
        assert_eq!(sfo.get_string("ATTRIBUTE"), None);
        assert_eq!(sfo.get_string("MISSING"), None);
    }

    #[test]
    fn test_sfo_generate_empty() {
        let data = Sfo::new().generate();
        assert_eq!(data.len(), HEADER_SIZE);
        assert!(Sfo::from_bytes(&data).unwrap().entries().is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut data = SfoBuilder::new().title("Game").generate();
        data[1] = b'X';
        assert!(matches!(Sfo::from_bytes(&data), Err(SfoError::InvalidMagic)));
    }

    #[test]
    fn test_truncated_input() {
        let data = SfoBuilder::new().title("Game").generate();
        assert!(matches!(
            Sfo::from_bytes(&data[..10]),
            Err(SfoError::Truncated("header"))
        ));
        assert!(matches!(
            Sfo::from_bytes(&data[..data.len() - 8]),
            Err(SfoError::Truncated(_))
        ));
    }
}
