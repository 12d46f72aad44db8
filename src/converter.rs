//! Constituency-to-dependency conversion through the external converter
//!
//! A conversion is a fixed pipeline:
//! 1. Build the invocation from the config and the input path
//! 2. Run it to completion, capturing exit code, stdout and stderr
//! 3. Log the diagnostics
//! 4. Classify the exit code and stderr into a [`ConvertError`]
//! 5. Read `<input>.dep` back as the result
//!
//! Batch conversion writes the trees to a per-call [`ScratchFile`] first and
//! splits the result back into one block per tree.

use log::{Level, log};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConverterConfig;
use crate::depfile::{self, split_blocks};
use crate::error::ConvertError;
use crate::failure::classify_failure;
use crate::process::{CommandRunner, Invocation, ProcessOutput, SystemRunner};
use crate::ptb::validate_tree;
use crate::scratch::{ScratchFile, output_path_for};
use crate::tree::DepTree;

/// Result of one converter run, with the diagnostics that produced it
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Contents of the output file
    pub text: String,
    pub output_path: PathBuf,
    /// Command line that was run
    pub command: String,
    pub output: ProcessOutput,
}

/// Adapter around the external converter
pub struct Converter {
    config: ConverterConfig,
    runner: Box<dyn CommandRunner>,
    debug: bool,
    validate: bool,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_runner(config, Box::new(SystemRunner))
    }

    /// Use a custom runner in place of spawning real processes
    pub fn with_runner(config: ConverterConfig, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            debug: false,
            validate: false,
        }
    }

    /// Log command lines and process output at `info` instead of `debug`
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check each tree's bracketing before starting the converter
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert trees, returning one dependency block per tree in input order
    ///
    /// The result has one entry per block in the converter output. That is
    /// one per tree unless a tree contains a blank line; enable validation
    /// to reject such trees up front.
    pub fn convert_trees<S: AsRef<str>>(&self, trees: &[S]) -> Result<Vec<String>, ConvertError> {
        if trees.is_empty() {
            return Ok(Vec::new());
        }

        if self.validate {
            validate_trees(trees)?;
        }

        let scratch = ScratchFile::create(&self.config.scratch_dir, trees)?;
        let conversion = self.run(scratch.path())?;
        let blocks: Vec<String> = split_blocks(&conversion.text)
            .into_iter()
            .map(str::to_string)
            .collect();

        if blocks.len() != trees.len() {
            log::warn!(
                "Converter returned {} blocks for {} trees",
                blocks.len(),
                trees.len()
            );
        }
        Ok(blocks)
    }

    /// Convert trees and parse the output into dependency trees
    pub fn convert_trees_parsed<S: AsRef<str>>(
        &self,
        trees: &[S],
    ) -> Result<Vec<DepTree>, ConvertError> {
        self.convert_trees(trees)?
            .iter()
            .map(|block| depfile::parse_block(block).map_err(ConvertError::from))
            .collect()
    }

    /// Convert a file of trees, returning the raw output text
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<String, ConvertError> {
        Ok(self.run_file(path.as_ref())?.text)
    }

    /// Convert a file of trees, keeping the process diagnostics
    pub fn run_file(&self, path: &Path) -> Result<Conversion, ConvertError> {
        if self.validate {
            let text = fs::read_to_string(path)?.replace("\r\n", "\n");
            validate_trees(&split_blocks(&text))?;
        }
        self.run(path)
    }

    fn run(&self, path: &Path) -> Result<Conversion, ConvertError> {
        let invocation = Invocation::for_input(&self.config, path)?;
        let command = invocation.to_string();

        let output = self.runner.run(&invocation)?;

        let level = if self.debug { Level::Info } else { Level::Debug };
        log!(level, "{}", command);
        log!(level, "stdout: {{{}}}", output.stdout);
        log!(level, "stderr: {{{}}}", output.stderr);
        log!(level, "Exit code: {}", output.code());

        classify_failure(output.code(), &output.stderr)?;

        let output_path = output_path_for(path);
        let text = fs::read_to_string(&output_path).map_err(|source| ConvertError::ReadOutput {
            path: output_path.clone(),
            source,
        })?;

        Ok(Conversion {
            text,
            output_path,
            command,
            output,
        })
    }
}

/// Validate each tree's bracketing, reporting the first bad tree's index
pub fn validate_trees<S: AsRef<str>>(trees: &[S]) -> Result<(), ConvertError> {
    for (index, tree) in trees.iter().enumerate() {
        validate_tree(tree.as_ref()).map_err(|e| ConvertError::InvalidTree {
            index,
            message: e.to_string(),
        })?;
    }
    Ok(())
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("debug", &self.debug)
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::flag_value;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use tempfile::tempdir;

    /// Runner that writes one fixed row per request block, like the converter
    struct FakeRunner {
        exit_code: i32,
        stderr: String,
        calls: Arc<Mutex<Vec<Invocation>>>,
    }

    impl FakeRunner {
        fn ok() -> Self {
            Self::failing(0, "")
        }

        fn failing(exit_code: i32, stderr: &str) -> Self {
            Self {
                exit_code,
                stderr: stderr.to_string(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push(invocation.clone());

            if self.exit_code == 0 {
                let input = Path::new(flag_value(invocation, "-i").unwrap());
                let request = fs::read_to_string(input)?;
                let rows: Vec<String> = split_blocks(&request)
                    .iter()
                    .enumerate()
                    .map(|(i, _)| format!("1\ttree{}\ttree{}\tNN\t_\t0\troot\t_\t_\t_", i, i))
                    .collect();
                fs::write(output_path_for(input), rows.join("\n\n") + "\n\n")?;
            }

            Ok(ProcessOutput {
                exit_code: Some(self.exit_code),
                stdout: String::new(),
                stderr: self.stderr.clone(),
            })
        }
    }

    fn converter(dir: &Path, runner: FakeRunner) -> Converter {
        let config = ConverterConfig::from_resource_dir("/ext").with_scratch_dir(dir);
        Converter::with_runner(config, Box::new(runner))
    }

    #[test]
    fn test_convert_trees_one_block_per_tree() {
        let dir = tempdir().unwrap();
        let converter = converter(dir.path(), FakeRunner::ok());

        let result = converter
            .convert_trees(&["(S (NN a))", "(S (NN b))", "(S (NN c))"])
            .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0], "1\ttree0\ttree0\tNN\t_\t0\troot\t_\t_\t_");
        assert_eq!(result[2], "1\ttree2\ttree2\tNN\t_\t0\troot\t_\t_\t_");
    }

    #[test]
    fn test_convert_no_trees_skips_process() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::ok();
        let calls = Arc::clone(&runner.calls);
        let converter = converter(dir.path(), runner);

        let result = converter.convert_trees::<&str>(&[]).unwrap();

        assert!(result.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_scratch_files_removed() {
        let dir = tempdir().unwrap();
        let converter = converter(dir.path(), FakeRunner::ok());

        converter.convert_trees(&["(S (NN a))"]).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_convert_file_reads_dep() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("wsj.parse");
        fs::write(&input, "(S (NN a))\n\n").unwrap();
        let converter = converter(dir.path(), FakeRunner::ok());

        let conversion = converter.run_file(&input).unwrap();

        assert_eq!(conversion.output_path, dir.path().join("wsj.parse.dep"));
        assert!(conversion.text.starts_with("1\ttree0"));
        assert!(conversion.command.starts_with("java -ea -cp "));
        assert!(conversion.command.ends_with(&format!("-i {}", input.display())));
        assert!(conversion.output.success());
    }

    #[test]
    fn test_failures_are_classified() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.parse");
        fs::write(&input, "(S (NN a))\n\n").unwrap();

        let too_old = converter(
            dir.path(),
            FakeRunner::failing(1, "Unsupported major.minor version 52.0"),
        );
        assert!(matches!(
            too_old.convert_file(&input),
            Err(ConvertError::RuntimeTooOld)
        ));

        let broken = converter(dir.path(), FakeRunner::failing(2, "boom"));
        assert!(matches!(
            broken.convert_file(&input),
            Err(ConvertError::ExternalTool { exit_code: 2 })
        ));
    }

    #[test]
    fn test_warning_on_clean_exit_is_malformed() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::ok();
        runner.stderr = "PennTreeReader: warning: file has extra non-matching".to_string();
        let converter = converter(dir.path(), runner);

        let err = converter.convert_trees(&["(S (NN a)))"]).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_missing_output_is_io_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.parse");

        struct SilentRunner;
        impl CommandRunner for SilentRunner {
            fn run(&self, _: &Invocation) -> io::Result<ProcessOutput> {
                Ok(ProcessOutput {
                    exit_code: Some(0),
                    ..Default::default()
                })
            }
        }

        let config = ConverterConfig::default().with_scratch_dir(dir.path());
        let converter = Converter::with_runner(config, Box::new(SilentRunner));
        let err = converter.convert_file(&input).unwrap_err();

        assert!(matches!(err, ConvertError::ReadOutput { .. }));
        assert_eq!(err.io_error().unwrap().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_validation_rejects_before_running() {
        let dir = tempdir().unwrap();
        let runner = FakeRunner::ok();
        let calls = Arc::clone(&runner.calls);
        let converter = converter(dir.path(), runner).with_validation(true);

        let err = converter
            .convert_trees(&["(S (NN a))", "(S (NN b)"])
            .unwrap_err();

        assert!(matches!(err, ConvertError::InvalidTree { index: 1, .. }));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_validation_applies_to_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.parse");
        fs::write(&input, "(S (NN a))\n\n(S (NN b)\n\n").unwrap();
        let converter = converter(dir.path(), FakeRunner::ok()).with_validation(true);

        let err = converter.convert_file(&input).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidTree { index: 1, .. }));
    }

    #[test]
    fn test_convert_trees_parsed() {
        let dir = tempdir().unwrap();
        let converter = converter(dir.path(), FakeRunner::ok());

        let trees = converter
            .convert_trees_parsed(&["(S (NN a))", "(S (NN b))"])
            .unwrap();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].nodes[0].form, "tree1");
        assert_eq!(trees[1].root_id, Some(0));
    }

    #[test]
    fn test_validation_accepts_crlf_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("crlf.parse");
        fs::write(&input, "(S (NN a))\r\n\r\n(S\r\n   (NN b))\r\n").unwrap();
        let converter = converter(dir.path(), FakeRunner::ok()).with_validation(true);

        let text = converter.convert_file(&input).unwrap();
        assert!(text.starts_with("1\ttree0"));

        fs::write(&input, "(S (NN a))\r\n\r\n(S (NN b)\r\n").unwrap();
        let err = converter.convert_file(&input).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidTree { index: 1, .. }));
    }

    /// Runner that copies each request block into the FORM column
    struct EchoRunner;

    impl CommandRunner for EchoRunner {
        fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
            let input = Path::new(flag_value(invocation, "-i").unwrap());
            let request = fs::read_to_string(input)?;
            let rows: Vec<String> = split_blocks(&request)
                .iter()
                .map(|block| format!("1\t{}\t_\tNN\t_\t0\troot\t_\t_\t_", block))
                .collect();
            fs::write(output_path_for(input), rows.join("\n\n") + "\n\n")?;
            Ok(ProcessOutput {
                exit_code: Some(0),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_shared_converter_across_threads() {
        let dir = tempdir().unwrap();
        let config = ConverterConfig::from_resource_dir("/ext").with_scratch_dir(dir.path());
        let converter = Arc::new(Converter::with_runner(config, Box::new(EchoRunner)));

        thread::scope(|s| {
            for i in 0..8 {
                let converter = Arc::clone(&converter);
                s.spawn(move || {
                    for round in 0..5 {
                        let tree = format!("(S (NN thread{}-{}))", i, round);
                        let blocks = converter.convert_trees(&[tree.as_str()]).unwrap();
                        assert_eq!(
                            blocks,
                            [format!("1\t{}\t_\tNN\t_\t0\troot\t_\t_\t_", tree)]
                        );
                    }
                });
            }
        });

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Runner that writes fixed output regardless of the request
    struct FixedOutputRunner(&'static str);

    impl CommandRunner for FixedOutputRunner {
        fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
            let input = Path::new(flag_value(invocation, "-i").unwrap());
            fs::write(output_path_for(input), self.0)?;
            Ok(ProcessOutput {
                exit_code: Some(0),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_parsed_rejects_empty_block() {
        let dir = tempdir().unwrap();
        let config = ConverterConfig::from_resource_dir("/ext").with_scratch_dir(dir.path());
        let output = "1\ta\ta\tNN\t_\t0\troot\n\n\n\n1\tb\tb\tNN\t_\t0\troot\n";
        let converter = Converter::with_runner(config, Box::new(FixedOutputRunner(output)));

        let err = converter
            .convert_trees_parsed(&["(S (NN a))", "(S (NN b))"])
            .unwrap_err();

        match err {
            ConvertError::Parse(e) => assert_eq!(e.message, "Empty block"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
