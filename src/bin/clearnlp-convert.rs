use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use clearnlp_convert::{ConvertError, Converter, ConverterConfig, FailureKind, parse_output};

#[derive(Parser)]
#[command(
    name = "clearnlp-convert",
    about = "Convert Penn Treebank trees to dependencies with the ClearNLP converter",
    arg_required_else_help = true
)]
struct Cli {
    /// Files of bracketed trees, separated by blank lines
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Command used to launch Java
    #[arg(long, default_value = "java")]
    java: String,
    /// Converter entry point class
    #[arg(long = "class")]
    class_name: Option<String>,
    /// Directory holding the bundled jars and head rules
    #[arg(long)]
    ext_dir: Option<PathBuf>,
    /// Head rules file
    #[arg(long)]
    head_rules: Option<PathBuf>,
    /// Classpath entry; replaces the bundled jars when given
    #[arg(long = "classpath")]
    classpath: Vec<PathBuf>,
    /// Check tree bracketing before running the converter
    #[arg(long, default_value_t = false)]
    validate: bool,
    /// Print one summary line per tree instead of the raw output
    #[arg(long, default_value_t = false)]
    parsed: bool,
    /// Log command lines and converter output
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    fn config(&self) -> ConverterConfig {
        let mut config = match &self.ext_dir {
            Some(dir) => ConverterConfig::from_resource_dir(dir),
            None => ConverterConfig::default(),
        }
        .with_java_command(&self.java);

        if let Some(class_name) = &self.class_name {
            config = config.with_class_name(class_name);
        }
        if let Some(head_rules) = &self.head_rules {
            config = config.with_head_rule_path(head_rules);
        }
        if !self.classpath.is_empty() {
            config = config.with_classpath(self.classpath.iter().cloned());
        }
        config
    }
}

fn setup_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<(), ConvertError> {
    let converter = Converter::new(cli.config())
        .with_debug(cli.debug)
        .with_validation(cli.validate);

    for input in &cli.inputs {
        let output = converter.convert_file(input)?;
        if cli.parsed {
            for tree in parse_output(&output)? {
                let root = tree.root().map(|node| node.form.as_str()).unwrap_or("-");
                println!("{}\t{}\t{}", tree.len(), root, tree.sentence());
            }
        } else {
            print!("{}", output);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("clearnlp-convert: {}", e);
            match e.kind() {
                Some(FailureKind::MalformedInput) => ExitCode::from(2),
                Some(FailureKind::RuntimeTooOld) => ExitCode::from(3),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
