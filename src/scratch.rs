//! Per-call request files for batch conversion
//!
//! Every batch writes its trees to its own randomly named file in the scratch
//! directory, so concurrent conversions never share a request or an output
//! file. Both files are removed when the [`ScratchFile`] is dropped.

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};

/// Suffix the converter appends to the input path for its output
pub const OUTPUT_SUFFIX: &str = ".dep";

/// Output artifact written by the converter for `input`
///
/// The suffix is appended to the whole file name, so `wsj.parse` becomes
/// `wsj.parse.dep`.
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(OUTPUT_SUFFIX);
    PathBuf::from(path)
}

/// Write trees one per block, each trimmed and followed by a blank line
pub fn write_trees<W, S>(writer: &mut W, trees: &[S]) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for tree in trees {
        writer.write_all(tree.as_ref().trim().as_bytes())?;
        writer.write_all(b"\n\n")?;
    }
    writer.flush()
}

/// A uniquely named request file and its converter output
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    /// Create a fresh request file in `dir` holding `trees`
    pub fn create<S: AsRef<str>>(dir: &Path, trees: &[S]) -> io::Result<Self> {
        // retries with a new name if one is already taken
        let mut file = Builder::new()
            .prefix("clearnlp-")
            .suffix(".parse")
            .tempfile_in(dir)?;
        write_trees(&mut BufWriter::new(file.as_file_mut()), trees)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn output_path(&self) -> PathBuf {
        output_path_for(&self.path)
    }
}

impl Drop for ScratchFile {
    // the request file goes with `TempPath`
    fn drop(&mut self) {
        let output = self.output_path();
        match fs::remove_file(&output) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", output.display(), e),
        }
    }
}
