use crate::error::EffectError;
use crate::model::EffectParameter;

/// Index of the parameter named exactly `name`.
///
/// Only meaningful once every parameter has been parsed.
pub fn find_parameter(parameters: &[EffectParameter], name: &str) -> Result<usize, EffectError> {
    parameters
        .iter()
        .position(|parameter| parameter.name() == name)
        .ok_or_else(|| EffectError::ParameterNotFound {
            name: name.to_owned(),
        })
}
