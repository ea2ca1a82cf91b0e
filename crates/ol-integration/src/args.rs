//! Command-line parsing
//!
//! The scan is a single left-to-right pass with one token of lookahead for
//! flags that take a value. Nothing here touches global state: settings the
//! user asked for come back as [`Effect`]s and terminal actions (help, folder
//! registration) come back as [`Command`] variants for the caller to act on.

use ol_core::ConfigMode;
use ol_vfs::probe;
use std::ffi::OsString;
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

pub const USAGE: &str = "\
Usage: orbis-launcher [options] <elf or eboot.bin path>
Options:
  -g, --game <path|ID>          Specify game path to launch
  -- ...                        Parameters passed to the game ELF. Needs to be at the end of the line, and everything after \"--\" is a game argument.
  -p, --patch <patch_file>      Apply specified patch file
  -i, --ignore-game-patch       Disable automatic loading of game patch
  -f, --fullscreen <true|false> Specify window initial fullscreen state. Does not overwrite the config file.
  --add-game-folder <folder>    Adds a new game folder to the config.
  --set-addon-folder <folder>   Sets the addon folder to the config.
  --log-append                  Append log output to file instead of overwriting it.
  --override-root <folder>      Override the game root folder. Default is the parent of game path
  --wait-for-debugger           Wait for debugger to attach
  --wait-for-pid <pid>          Wait for process with specified PID to stop
  --config-clean                Run the emulator with the default config values, ignores the config file(s) entirely.
  --config-global               Run the emulator with the base config file only, ignores game specific configs.
  --show-fps                    Enable FPS counter display at startup
  -h, --help                    Display this help message
";

/// Launch parameters gathered from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub has_game_argument: bool,
    /// Path to an executable, or a game ID to search for
    pub game_path: OsString,
    /// Tokens after `--`, verbatim and in order
    pub game_args: Vec<OsString>,
    /// `--override-root`, already checked to be a directory
    pub game_folder: Option<PathBuf>,
    pub wait_for_debugger: bool,
    pub wait_pid: Option<i32>,
}

/// Setting change requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PatchFile(PathBuf),
    IgnoreGamePatch,
    Fullscreen(bool),
    LogAppend,
    ConfigMode(ConfigMode),
    ShowFps,
}

/// Non-fatal problems found while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    UnknownArgument(String),
    EmptyGameArguments,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArgument(arg) => {
                write!(f, "Unknown argument: {}, see --help for info.", arg)
            }
            Self::EmptyGameArguments => {
                write!(f, "Warning: -- is set, but no game arguments are added!")
            }
        }
    }
}

/// Result of a launch-style invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub args: ParsedArgs,
    /// In command-line order
    pub effects: Vec<Effect>,
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Launch(Invocation),
    Help,
    AddGameFolder(PathBuf),
    SetAddonFolder(PathBuf),
}

/// Outcome of a scan.
///
/// `warnings` holds everything reported before scanning stopped, including
/// when `command` is the first fatal error.
#[derive(Debug)]
pub struct Parsed {
    pub command: Result<Command, ArgError>,
    pub warnings: Vec<ParseWarning>,
}

/// Fatal command-line errors
#[derive(Error, Debug)]
pub enum ArgError {
    #[error("Error: No arguments given")]
    NoArguments,

    #[error("Error: Missing argument for {0}")]
    MissingValue(String),

    #[error("Error: Invalid argument for {flag}. Use 'true' or 'false'.")]
    InvalidBoolean { flag: String, value: String },

    #[error("Error: File does not exist: {0}")]
    FolderNotFound(String),

    #[error("Error: Folder does not exist: {0}")]
    OverrideRootNotFound(String),

    #[error("Error: Invalid PID argument: {source}")]
    InvalidPid {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl ArgError {
    /// Process exit status reported for this error
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Recognized flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Help,
    Game,
    Patch,
    IgnoreGamePatch,
    Fullscreen,
    AddGameFolder,
    SetAddonFolder,
    LogAppend,
    ConfigClean,
    ConfigGlobal,
    OverrideRoot,
    WaitForDebugger,
    WaitForPid,
    ShowFps,
    GameArgs,
}

impl Flag {
    fn from_token(token: &str) -> Option<Self> {
        let flag = match token {
            "-h" | "--help" => Self::Help,
            "-g" | "--game" => Self::Game,
            "-p" | "--patch" => Self::Patch,
            "-i" | "--ignore-game-patch" => Self::IgnoreGamePatch,
            "-f" | "--fullscreen" => Self::Fullscreen,
            "--add-game-folder" => Self::AddGameFolder,
            "--set-addon-folder" => Self::SetAddonFolder,
            "--log-append" => Self::LogAppend,
            "--config-clean" => Self::ConfigClean,
            "--config-global" => Self::ConfigGlobal,
            "--override-root" => Self::OverrideRoot,
            "--wait-for-debugger" => Self::WaitForDebugger,
            "--wait-for-pid" => Self::WaitForPid,
            "--show-fps" => Self::ShowFps,
            "--" => Self::GameArgs,
            _ => return None,
        };
        Some(flag)
    }
}

/// Parse a literal `true`/`false`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

struct Scanner {
    tokens: Vec<OsString>,
    pos: usize,
}

impl Scanner {
    fn is_last(&self) -> bool {
        self.pos + 1 == self.tokens.len()
    }

    /// Consume the token following the flag at the current position
    fn value_for(&mut self, flag: &str) -> Result<OsString, ArgError> {
        self.pos += 1;
        self.tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| ArgError::MissingValue(flag.to_string()))
    }
}

/// Parse `argv[1..]`.
///
/// Tokens are taken as OS strings so paths that are not valid UTF-8 reach
/// the filesystem untouched.
pub fn parse<I, S>(tokens: I) -> Parsed
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut scanner = Scanner {
        tokens: tokens.into_iter().map(Into::into).collect(),
        pos: 0,
    };
    let mut warnings = Vec::new();
    let command = scan(&mut scanner, &mut warnings);
    Parsed { command, warnings }
}

fn scan(scanner: &mut Scanner, warnings: &mut Vec<ParseWarning>) -> Result<Command, ArgError> {
    if scanner.tokens.is_empty() {
        return Err(ArgError::NoArguments);
    }

    let mut invocation = Invocation::default();

    while scanner.pos < scanner.tokens.len() {
        let token = scanner.tokens[scanner.pos].clone();

        // Non-UTF-8 tokens are never flags
        let Some((flag, name)) = token
            .to_str()
            .and_then(|name| Flag::from_token(name).map(|flag| (flag, name)))
        else {
            let args = &mut invocation.args;
            if scanner.is_last() && !args.has_game_argument && !token.as_encoded_bytes().starts_with(b"-") {
                args.game_path = token;
                args.has_game_argument = true;
            } else {
                warnings.push(ParseWarning::UnknownArgument(token.to_string_lossy().into_owned()));
            }
            scanner.pos += 1;
            continue;
        };

        match flag {
            Flag::Help => return Ok(Command::Help),
            Flag::Game => {
                invocation.args.game_path = scanner.value_for(name)?;
                invocation.args.has_game_argument = true;
            }
            Flag::Patch => {
                let file = scanner.value_for(name)?;
                invocation.effects.push(Effect::PatchFile(PathBuf::from(file)));
            }
            Flag::IgnoreGamePatch => invocation.effects.push(Effect::IgnoreGamePatch),
            Flag::Fullscreen => {
                let value = scanner.value_for(name)?;
                let fullscreen = value.to_str().and_then(parse_bool).ok_or_else(|| ArgError::InvalidBoolean {
                    flag: name.to_string(),
                    value: value.to_string_lossy().into_owned(),
                })?;
                invocation.effects.push(Effect::Fullscreen(fullscreen));
            }
            Flag::AddGameFolder => {
                let dir = scanner.value_for(name)?;
                return existing_dir(dir).map(Command::AddGameFolder);
            }
            Flag::SetAddonFolder => {
                let dir = scanner.value_for(name)?;
                return existing_dir(dir).map(Command::SetAddonFolder);
            }
            Flag::LogAppend => invocation.effects.push(Effect::LogAppend),
            Flag::ConfigClean => invocation.effects.push(Effect::ConfigMode(ConfigMode::Clean)),
            Flag::ConfigGlobal => invocation.effects.push(Effect::ConfigMode(ConfigMode::Global)),
            Flag::OverrideRoot => {
                let path = PathBuf::from(scanner.value_for(name)?);
                if !probe::is_dir(&path) {
                    return Err(ArgError::OverrideRootNotFound(path.display().to_string()));
                }
                invocation.args.game_folder = Some(path);
            }
            Flag::WaitForDebugger => invocation.args.wait_for_debugger = true,
            Flag::WaitForPid => {
                let value = scanner.value_for(name)?.to_string_lossy().into_owned();
                let pid = value
                    .parse::<i32>()
                    .map_err(|source| ArgError::InvalidPid { value, source })?;
                invocation.args.wait_pid = Some(pid);
            }
            Flag::ShowFps => invocation.effects.push(Effect::ShowFps),
            Flag::GameArgs => {
                if scanner.is_last() {
                    warnings.push(ParseWarning::EmptyGameArguments);
                } else {
                    invocation.args.game_args = scanner.tokens[scanner.pos + 1..].to_vec();
                }
                break;
            }
        }

        scanner.pos += 1;
    }

    Ok(Command::Launch(invocation))
}

fn existing_dir(dir: OsString) -> Result<PathBuf, ArgError> {
    let path = PathBuf::from(dir);
    if probe::is_dir(&path) {
        Ok(path)
    } else {
        Err(ArgError::FolderNotFound(path.display().to_string()))
    }
}
