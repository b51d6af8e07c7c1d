use crate::spinner::types::SpinnerOptions;

/// Layers `defaults < theme < instance` into a fresh record.
///
/// The merge is shallow: a key present in a later layer replaces the whole
/// value from earlier layers. Inputs are only borrowed.
pub fn merge(
    defaults: &SpinnerOptions,
    theme: Option<&SpinnerOptions>,
    instance: &SpinnerOptions,
) -> SpinnerOptions {
    let mut merged = defaults.clone();
    if let Some(theme) = theme {
        merged.extend(theme.clone());
    }
    merged.extend(instance.clone());
    merged
}
