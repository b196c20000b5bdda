use thiserror::Error;

use crate::model::sir::ParamName;

/// Engine defects. User-correctable problems are reported as
/// [`ValidationResult`](crate::validation::ValidationResult) values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A variant's required parameter was absent when its equations were evaluated.
    #[error("model '{model}' requires parameter '{parameter}' but it was not provided")]
    MissingParameter {
        model: &'static str,
        parameter: ParamName,
    },
}
