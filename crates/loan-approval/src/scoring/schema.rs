use super::features::FeatureVector;

/// The derived vector lacks features the bundle was trained on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing engineered features: {}", missing.join(", "))]
pub struct SchemaMismatch {
    pub missing: Vec<String>,
}

/// Select and reorder `vector` to exactly the `required` names.
///
/// An empty `required` list keeps the vector as derived. Missing names are
/// reported in `required` order and nothing is projected.
pub fn project(
    vector: FeatureVector,
    required: &[String],
) -> Result<FeatureVector, SchemaMismatch> {
    if required.is_empty() {
        return Ok(vector);
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|name| !vector.contains(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SchemaMismatch { missing });
    }

    Ok(required
        .iter()
        .filter_map(|name| vector.get(name).map(|value| (name.as_str(), value)))
        .collect())
}
