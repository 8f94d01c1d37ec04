use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use super::classifier::{Classifier, ClassifierError, ClassifierSpec, OnnxClassifier};
use super::domain::SchemaVersion;

/// On-disk layout of a bundle document.
#[derive(Debug, Deserialize)]
struct BundleDocument {
    schema_version: SchemaVersion,
    #[serde(default)]
    best_threshold: Option<f64>,
    #[serde(default)]
    features: Vec<String>,
    classifier: ClassifierSpec,
}

/// Trained classifier plus the threshold and feature ordering it was tuned with.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct ModelBundle {
    classifier: Arc<dyn Classifier>,
    threshold: f64,
    required_features: Vec<String>,
    schema: SchemaVersion,
}

impl ModelBundle {
    /// Assemble a bundle, falling back to the generation's default threshold.
    pub fn new(
        schema: SchemaVersion,
        classifier: Arc<dyn Classifier>,
        threshold: Option<f64>,
        required_features: Vec<String>,
    ) -> Result<Self, BundleError> {
        let threshold = threshold.unwrap_or_else(|| schema.default_threshold());
        if !(0.0..=1.0).contains(&threshold) {
            return Err(BundleError::InvalidThreshold(threshold));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = required_features
            .iter()
            .find(|name| !seen.insert(name.as_str()))
        {
            return Err(BundleError::DuplicateFeature(duplicate.clone()));
        }

        if let Some(width) = classifier.input_width() {
            if !required_features.is_empty() && width != required_features.len() {
                return Err(BundleError::WidthMismatch {
                    features: required_features.len(),
                    classifier: width,
                });
            }
        }

        Ok(Self {
            classifier,
            threshold,
            required_features,
            schema,
        })
    }

    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let file = File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BundleError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                BundleError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_reader_in(BufReader::new(file), base_dir)
    }

    /// Parse a bundle; relative graph paths resolve against the working directory.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BundleError> {
        Self::from_reader_in(reader, Path::new("."))
    }

    /// Parse a bundle whose relative graph paths resolve against `base_dir`.
    pub fn from_reader_in<R: Read>(reader: R, base_dir: &Path) -> Result<Self, BundleError> {
        let document: BundleDocument = serde_json::from_reader(reader)?;
        document.classifier.validate()?;

        let classifier = instantiate(document.classifier, &document.features, base_dir)?;
        Self::new(
            document.schema_version,
            classifier,
            document.best_threshold,
            document.features,
        )
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn required_features(&self) -> &[String] {
        &self.required_features
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }
}

fn instantiate(
    spec: ClassifierSpec,
    features: &[String],
    base_dir: &Path,
) -> Result<Arc<dyn Classifier>, BundleError> {
    let classifier: Arc<dyn Classifier> = match spec {
        ClassifierSpec::LogisticRegression(model) => Arc::new(model),
        ClassifierSpec::TreeEnsemble(model) => Arc::new(model),
        ClassifierSpec::Onnx(reference) => {
            let width = reference.n_features.unwrap_or(features.len());
            if width == 0 {
                return Err(ClassifierError::Malformed(
                    "onnx classifier needs `features` or `n_features`".to_string(),
                )
                .into());
            }

            let path = base_dir.join(&reference.path);
            let model =
                OnnxClassifier::load(&path, width, reference.output, reference.output_index)
                    .map_err(|err| BundleError::Onnx {
                        path,
                        message: format!("{err:#}"),
                    })?;
            Arc::new(model)
        }
    };
    Ok(classifier)
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("schema", &self.schema)
            .field("threshold", &self.threshold)
            .field("required_features", &self.required_features)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("model bundle not found at {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read model bundle at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model bundle is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("decision threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
    #[error("bundle lists {features} features but the classifier expects {classifier}")]
    WidthMismatch { features: usize, classifier: usize },
    #[error("feature {0} is listed more than once")]
    DuplicateFeature(String),
    #[error("failed to load onnx graph at {}: {message}", path.display())]
    Onnx { path: PathBuf, message: String },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}
