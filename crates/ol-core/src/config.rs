//! Configuration system for orbis-launcher

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub gpu: GpuConfig,
    pub vulkan: VulkanConfig,
    pub paths: PathConfig,
    pub debug: DebugConfig,
    /// Runtime-only selection of which config layers are honoured
    #[serde(skip)]
    pub mode: ConfigMode,
}

/// General emulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    pub fullscreen: bool,
    pub show_fps: bool,
    pub neo_mode: bool,
    pub dev_kit: bool,
    pub connected_to_network: bool,
    pub psn_signed_in: bool,
}

/// GPU settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    pub null_gpu: bool,
    pub readbacks: bool,
    pub readback_linear_images: bool,
    pub direct_memory_access: bool,
    pub dump_shaders: bool,
    pub vblank_frequency: u32,
    pub copy_gpu_buffers: bool,
}

/// Vulkan renderer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulkanConfig {
    /// Physical device index, -1 selects automatically
    pub gpu_id: i32,
    pub validation: bool,
    pub validation_core: bool,
    pub validation_sync: bool,
    pub validation_gpu: bool,
    pub crash_diagnostics: bool,
    pub host_markers: bool,
    pub guest_markers: bool,
    pub rdoc_enable: bool,
}

/// Path configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathConfig {
    /// Ordered search roots for identifier lookup
    pub game_install_dirs: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addon_install_dir: Option<PathBuf>,
}

/// Debug settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    pub log_to_file: bool,
    pub log_path: PathBuf,
    /// Append to `log_path` instead of truncating it
    pub log_append: bool,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Which configuration layers are applied for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigMode {
    /// Global file plus per-game overrides
    #[default]
    Default,
    /// Built-in defaults only
    Clean,
    /// Global file only, per-game overrides ignored
    Global,
}

// Default implementations

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            null_gpu: false,
            readbacks: false,
            readback_linear_images: false,
            direct_memory_access: false,
            dump_shaders: false,
            vblank_frequency: 60,
            copy_gpu_buffers: false,
        }
    }
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            gpu_id: -1,
            validation: false,
            validation_core: true,
            validation_sync: false,
            validation_gpu: false,
            crash_diagnostics: false,
            host_markers: false,
            guest_markers: false,
            rdoc_enable: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_to_file: false,
            log_path: Config::config_dir().join("orbis-launcher.log"),
            log_append: false,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or create a default file if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))?;
        Ok(())
    }

    /// Directory holding the config file and per-game overrides
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orbis-launcher")
    }

    /// Path of the global configuration file inside `config_dir`
    pub fn config_file(config_dir: &Path) -> PathBuf {
        config_dir.join("config.toml")
    }

    /// Path of the override file for a single game
    pub fn game_config_path(config_dir: &Path, game_id: &str) -> PathBuf {
        config_dir.join("custom_configs").join(format!("{}.toml", game_id))
    }

    /// Append an install directory. Returns false if it was already listed.
    pub fn add_game_install_dir(&mut self, dir: PathBuf) -> bool {
        if self.paths.game_install_dirs.contains(&dir) {
            return false;
        }
        self.paths.game_install_dirs.push(dir);
        true
    }

    pub fn set_addon_install_dir(&mut self, dir: PathBuf) {
        self.paths.addon_install_dir = Some(dir);
    }

    /// Switch config mode. `Clean` drops every loaded setting except the path lists.
    pub fn apply_mode(&mut self, mode: ConfigMode) {
        if mode == ConfigMode::Clean {
            let paths = std::mem::take(&mut self.paths);
            *self = Self {
                paths,
                ..Self::default()
            };
        }
        self.mode = mode;
    }

    /// Layer the per-game override file for `game_id` over this config.
    ///
    /// Only honoured in [`ConfigMode::Default`]; a missing file leaves the
    /// config unchanged. Keys absent from the override keep their current value.
    pub fn with_game_overrides(&self, config_dir: &Path, game_id: &str) -> Result<Self, ConfigError> {
        if self.mode != ConfigMode::Default || game_id.is_empty() {
            return Ok(self.clone());
        }

        let path = Self::game_config_path(config_dir, game_id);
        if !path.is_file() {
            return Ok(self.clone());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        let overlay: toml::Value = toml::from_str(&content)?;
        let mut base = toml::Value::try_from(self)?;
        merge_values(&mut base, overlay);

        let mut merged: Config = base.try_into()?;
        merged.mode = self.mode;
        info!("Applied per-game config: {}", path.display());
        Ok(merged)
    }

    /// Log every loaded option
    pub fn log_configuration(&self) {
        info!("Config mode: {:?}", self.mode);

        info!("General fullscreen: {}", self.general.fullscreen);
        info!("General showFps: {}", self.general.show_fps);
        info!("General isNeo: {}", self.general.neo_mode);
        info!("General isDevKit: {}", self.general.dev_kit);
        info!("General isConnectedToNetwork: {}", self.general.connected_to_network);
        info!("General isPsnSignedIn: {}", self.general.psn_signed_in);

        info!("GPU isNullGpu: {}", self.gpu.null_gpu);
        info!("GPU readbacks: {}", self.gpu.readbacks);
        info!("GPU readbackLinearImages: {}", self.gpu.readback_linear_images);
        info!("GPU directMemoryAccess: {}", self.gpu.direct_memory_access);
        info!("GPU shouldDumpShaders: {}", self.gpu.dump_shaders);
        info!("GPU vblankFrequency: {}", self.gpu.vblank_frequency);
        info!("GPU shouldCopyGPUBuffers: {}", self.gpu.copy_gpu_buffers);

        info!("Vulkan gpuId: {}", self.vulkan.gpu_id);
        info!("Vulkan vkValidation: {}", self.vulkan.validation);
        info!("Vulkan vkValidationCore: {}", self.vulkan.validation_core);
        info!("Vulkan vkValidationSync: {}", self.vulkan.validation_sync);
        info!("Vulkan vkValidationGpu: {}", self.vulkan.validation_gpu);
        info!("Vulkan crashDiagnostics: {}", self.vulkan.crash_diagnostics);
        info!("Vulkan hostMarkers: {}", self.vulkan.host_markers);
        info!("Vulkan guestMarkers: {}", self.vulkan.guest_markers);
        info!("Vulkan rdocEnable: {}", self.vulkan.rdoc_enable);

        info!("Paths gameInstallDirs: {:?}", self.paths.game_install_dirs);
        info!("Paths addonInstallDir: {:?}", self.paths.addon_install_dir);
    }
}

/// Recursively overlay `overlay` onto `base`; tables merge, everything else replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
