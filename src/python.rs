//! Python bindings for clearnlp-convert
//!
//! Exposes `SubprocessConverter`, mirroring the Python package API.

use pyo3::exceptions::{PyEnvironmentError, PyIOError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::config::{ConverterConfig, DEFAULT_CLASS_NAME, DEFAULT_JAVA_COMMAND, default_resource_dir};
use crate::converter::Converter;
use crate::error::ConvertError;

pyo3::create_exception!(
    clearnlp_convert,
    JavaRuntimeVersionError,
    PyEnvironmentError,
    "The Java runtime is too old for the converter."
);

/// Convert ConvertError to Python exception
impl From<ConvertError> for PyErr {
    fn from(err: ConvertError) -> PyErr {
        match err {
            ConvertError::RuntimeTooOld => JavaRuntimeVersionError::new_err(err.to_string()),
            ConvertError::Io(_) | ConvertError::ReadOutput { .. } => {
                PyIOError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Converts Penn Treebank trees to dependencies with the ClearNLP converter.
///
/// Args:
///     filenames: Jar file names, resolved in the bundled `ext` directory
///     java_command: Command used to launch Java
///     head_rule_path: Head rules file (defaults to the bundled English rules)
///     class_name: Converter entry point
#[pyclass(name = "SubprocessConverter")]
#[derive(Clone)]
pub struct PySubprocessConverter {
    config: ConverterConfig,
}

#[pymethods]
impl PySubprocessConverter {
    #[new]
    #[pyo3(signature = (
        filenames=None,
        java_command=DEFAULT_JAVA_COMMAND.to_string(),
        head_rule_path=None,
        class_name=DEFAULT_CLASS_NAME.to_string()
    ))]
    fn new(
        filenames: Option<Vec<String>>,
        java_command: String,
        head_rule_path: Option<PathBuf>,
        class_name: String,
    ) -> Self {
        let dir = default_resource_dir();
        let mut config = ConverterConfig::from_resource_dir(&dir)
            .with_java_command(java_command)
            .with_class_name(class_name);
        if let Some(filenames) = filenames {
            config = config.with_classpath(filenames.iter().map(|name| dir.join(name)));
        }
        if let Some(path) = head_rule_path {
            config = config.with_head_rule_path(path);
        }
        PySubprocessConverter { config }
    }

    #[getter]
    fn java_command(&self) -> String {
        self.config.java_command.clone()
    }

    #[getter]
    fn class_name(&self) -> String {
        self.config.class_name.clone()
    }

    #[getter]
    fn head_rule_path(&self) -> PathBuf {
        self.config.head_rule_path.clone()
    }

    #[getter]
    fn classpath(&self) -> Vec<PathBuf> {
        self.config.classpath.clone()
    }

    /// Convert a list of bracketed trees.
    ///
    /// Returns:
    ///     One dependency block (string) per input tree
    ///
    /// Raises:
    ///     ValueError: If the trees are not valid Penn Treebank trees
    ///     JavaRuntimeVersionError: If Java is too old for the converter
    #[pyo3(signature = (trees, debug=false))]
    fn convert_trees(&self, trees: Vec<String>, debug: bool) -> PyResult<Vec<String>> {
        Ok(self.converter(debug).convert_trees(&trees)?)
    }

    /// Convert a file of bracketed trees, returning the raw output text.
    #[pyo3(signature = (file_loc, debug=false))]
    fn convert_file(&self, file_loc: PathBuf, debug: bool) -> PyResult<String> {
        Ok(self.converter(debug).convert_file(file_loc)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "<SubprocessConverter java_command='{}' class_name='{}'>",
            self.config.java_command, self.config.class_name
        )
    }
}

impl PySubprocessConverter {
    fn converter(&self, debug: bool) -> Converter {
        Converter::new(self.config.clone()).with_debug(debug)
    }
}

#[pyfunction]
fn __version__() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn clearnlp_convert(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySubprocessConverter>()?;
    m.add(
        "JavaRuntimeVersionError",
        m.py().get_type::<JavaRuntimeVersionError>(),
    )?;
    m.add_function(wrap_pyfunction!(__version__, m)?)?;

    Ok(())
}
