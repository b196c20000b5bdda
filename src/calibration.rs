use crate::error::ModelError;
use crate::model::sir::ModelParameters;
use crate::model::variants::ModelKind;

/// Compute beta so that the variant reaches a target R0 with the other rates held fixed.
/// R0 = beta / (gamma + mu + alpha), using only the removal terms the variant has.
pub fn beta_for_r0(kind: ModelKind, params: &ModelParameters, r0: f64) -> Result<f64, ModelError> {
    let rates = kind.model().resolve(params)?;
    Ok(r0 * (rates.gamma + rates.mu + rates.alpha))
}
