//! Converter configuration
//!
//! Holds everything needed to build the converter command line. Defaults
//! point at the jars and head rules bundled in the `ext` resource directory;
//! the directory itself is resolved once, by [`default_resource_dir`], and
//! the converter only ever sees explicit paths.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// Environment variable overriding the bundled resource directory
pub const RESOURCE_DIR_ENV: &str = "CLEARNLP_EXT_DIR";

pub const DEFAULT_JAVA_COMMAND: &str = "java";

pub const DEFAULT_CLASS_NAME: &str = "edu.emory.clir.clearnlp.bin.C2DConvert";

pub const DEFAULT_HEAD_RULES: &str = "headrule_en_stanford.txt";

/// Jars making up the default classpath, in order
pub const DEFAULT_JARS: [&str; 7] = [
    "clearnlp-3.1.2.jar",
    "args4j-2.0.29.jar",
    "log4j-1.2.17.jar",
    "hppc-0.6.1.jar",
    "xz-1.5.jar",
    "clearnlp-dictionary-3.2.jar",
    "clearnlp-global-lexica-3.1.jar",
];

/// Resource directory holding the bundled jars and head rules
///
/// Uses `$CLEARNLP_EXT_DIR` when set, otherwise the `ext` directory shipped
/// next to this crate.
pub fn default_resource_dir() -> PathBuf {
    match env::var_os(RESOURCE_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("ext"),
    }
}

/// Immutable settings shared by every conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub classpath: Vec<PathBuf>,
    pub head_rule_path: PathBuf,
    pub java_command: String,
    pub class_name: String,
    /// Directory for per-call request files
    pub scratch_dir: PathBuf,
}

impl ConverterConfig {
    /// Default jars, head rules, launcher and entry class under `dir`
    pub fn from_resource_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            classpath: DEFAULT_JARS.iter().map(|jar| dir.join(jar)).collect(),
            head_rule_path: dir.join(DEFAULT_HEAD_RULES),
            java_command: DEFAULT_JAVA_COMMAND.to_string(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
            scratch_dir: env::temp_dir(),
        }
    }

    pub fn with_java_command(mut self, java_command: impl Into<String>) -> Self {
        self.java_command = java_command.into();
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_classpath<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_head_rule_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.head_rule_path = path.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Classpath entries joined with the platform path-list separator
    pub fn classpath_arg(&self) -> Result<OsString, ConvertError> {
        Ok(env::join_paths(&self.classpath)?)
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::from_resource_dir(default_resource_dir())
    }
}
