use std::collections::HashMap;
use std::fmt;
use anyhow::{anyhow, Result};
use directories::BaseDirs;
use serde::Serialize;

/// Separator used in every install path written to the package.
pub const INSTALL_SEPARATOR: char = '\\';

/// Machine-wide directories and their installer identifiers.
const SYSTEM_DIRS: &[(&str, &str)] = &[
    (r"C:\Program Files", "ProgramFiles64Folder"),
    (r"C:\Program Files (x86)", "ProgramFilesFolder"),
    (r"C:\ProgramData", "CommonAppDataFolder"),
    (r"C:\Windows\System32", "SystemFolder"),
];

/// Per-user directories, relative to the home directory.
const USER_DIRS: &[(&str, &str)] = &[
    (r"Desktop", "DesktopFolder"),
    (r"Documents", "PersonalFolder"),
    (r"AppData\Local", "LocalAppDataFolder"),
    (r"AppData\Roaming", "AppDataFolder"),
    (r"AppData\Roaming\Microsoft\Windows\Start Menu", "StartMenuFolder"),
    (r"AppData\Roaming\Microsoft\Windows\Start Menu\Programs\Startup", "StartupFolder"),
];

/// Fixed table of well-known directories, keyed by normalized path.
///
/// Built once per run and passed to [`resolve_install_location`].
#[derive(Debug, Clone)]
pub struct WellKnownDirs {
    dirs: HashMap<String, &'static str>,
}

impl WellKnownDirs {
    /// Builds the table for the given home directory.
    pub fn for_home(home: &str) -> Self {
        let mut dirs = HashMap::new();
        for (path, id) in SYSTEM_DIRS {
            dirs.insert(normalize_install_path(path), *id);
        }
        let home = normalize_install_path(home);
        for (suffix, id) in USER_DIRS {
            dirs.insert(normalize_install_path(&format!("{home}{suffix}")), *id);
        }
        WellKnownDirs { dirs }
    }

    /// Builds the table for the invoking user.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn for_current_user() -> Result<Self> {
        let base = BaseDirs::new()
            .ok_or_else(|| anyhow!("Could not determine the current user's home directory"))?;
        let home = base.home_dir().to_string_lossy().to_string();
        Ok(Self::for_home(&home))
    }

    pub fn lookup(&self, normalized: &str) -> Option<&'static str> {
        self.dirs.get(normalized).copied()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Where the payload ends up on the target machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum InstallRoot {
    /// A literal path, backslash separated, ending in exactly one separator.
    Literal(String),
    /// An installer folder identifier such as `DesktopFolder`.
    Symbolic(&'static str),
}

impl InstallRoot {
    pub fn is_empty(&self) -> bool {
        matches!(self, InstallRoot::Literal(path) if path.is_empty())
    }

    /// The .NET `Environment.SpecialFolder` name the identifier maps to at install time.
    pub fn special_folder(&self) -> Option<&'static str> {
        match self {
            InstallRoot::Literal(_) => None,
            InstallRoot::Symbolic(id) => special_folder_for(id),
        }
    }
}

impl fmt::Display for InstallRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallRoot::Literal(path) => write!(f, "{path}"),
            InstallRoot::Symbolic(id) => write!(f, "{id}"),
        }
    }
}

fn special_folder_for(id: &str) -> Option<&'static str> {
    let name = match id {
        "ProgramFiles64Folder" => "ProgramFiles",
        "ProgramFilesFolder" => "ProgramFilesX86",
        "CommonAppDataFolder" => "CommonApplicationData",
        "SystemFolder" => "System",
        "DesktopFolder" => "Desktop",
        "PersonalFolder" => "MyDocuments",
        "LocalAppDataFolder" => "LocalApplicationData",
        "AppDataFolder" => "ApplicationData",
        "StartMenuFolder" => "StartMenu",
        "StartupFolder" => "Startup",
        _ => return None,
    };
    Some(name)
}

/// Converts `/` to `\` and makes sure the path ends in exactly one `\`.
///
/// An empty path stays empty.
pub fn normalize_install_path(raw: &str) -> String {
    let path = raw.replace('/', "\\");
    if path.is_empty() {
        return path;
    }
    let trimmed = path.trim_end_matches(INSTALL_SEPARATOR);
    format!("{trimmed}{INSTALL_SEPARATOR}")
}

/// Resolves the configured `install_location` to an [`InstallRoot`].
///
/// The normalized path is replaced by a symbolic identifier only on an exact
/// match with a well-known directory; prefixes never match.
///
/// # Example
///
/// ```
/// use chocopack::{resolve_install_location, InstallRoot, WellKnownDirs};
///
/// let dirs = WellKnownDirs::for_home(r"C:\Users\alice");
/// assert_eq!(
///     resolve_install_location("C:/Users/alice/Desktop", &dirs),
///     InstallRoot::Symbolic("DesktopFolder")
/// );
/// ```
pub fn resolve_install_location(raw: &str, dirs: &WellKnownDirs) -> InstallRoot {
    let normalized = normalize_install_path(raw);
    match dirs.lookup(&normalized) {
        Some(id) => InstallRoot::Symbolic(id),
        None => InstallRoot::Literal(normalized),
    }
}

/// Joins a relative child path onto a resolved root with a single `\` between them.
pub fn join_install_path(root: &InstallRoot, child: &str) -> String {
    let child = child.replace('/', "\\");
    let child = child.trim_start_matches(INSTALL_SEPARATOR);
    match root {
        InstallRoot::Literal(path) if path.is_empty() => child.to_string(),
        InstallRoot::Literal(path) => format!("{path}{child}"),
        InstallRoot::Symbolic(id) => format!("{id}{INSTALL_SEPARATOR}{child}"),
    }
}
