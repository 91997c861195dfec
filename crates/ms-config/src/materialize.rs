use ms_types::{Modification, ModificationSet, MsResult, SimConfig};

use crate::overlays::intervention_overlay;

/// Apply one run's modifications to a fresh copy of the baseline.
pub fn materialize(base: &SimConfig, set: &ModificationSet) -> MsResult<SimConfig> {
    let mut config = base.clone();
    for modification in &set.modifications {
        config = apply_modification(config, modification)?;
    }
    Ok(config)
}

fn apply_modification(mut config: SimConfig, modification: &Modification) -> MsResult<SimConfig> {
    match modification {
        Modification::SetParam { path, value } => {
            config.set_param(path, value.clone())?;
            Ok(config)
        }
        Modification::Overlay { overlay } => intervention_overlay(overlay).apply(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::{params, ItnAgeSeasonParams, OverlaySpec};
    use serde_json::json;

    #[test]
    fn materialize_leaves_base_untouched() {
        let base = SimConfig::default()
            .with_param(params::RUN_NUMBER, json!(0))
            .unwrap();
        let set = ModificationSet::new()
            .set_param(params::RUN_NUMBER, 4)
            .set_param(params::LARVAL_HABITAT_MULTIPLIER, 100.0)
            .overlay(OverlaySpec::ItnAgeSeason(ItnAgeSeasonParams::with_coverage(0.4)));

        let run = materialize(&base, &set).unwrap();

        assert_eq!(run.get_param(params::RUN_NUMBER), Some(&json!(4)));
        assert_eq!(
            run.get_param(params::LARVAL_HABITAT_MULTIPLIER),
            Some(&json!(100.0))
        );
        assert_eq!(run.campaign.events.len(), 1);
        assert_eq!(base.get_param(params::RUN_NUMBER), Some(&json!(0)));
        assert!(base.campaign.events.is_empty());
    }

    #[test]
    fn invalid_overlay_fails_materialization() {
        let set = ModificationSet::new()
            .overlay(OverlaySpec::ItnAgeSeason(ItnAgeSeasonParams::with_coverage(2.0)));
        assert!(materialize(&SimConfig::default(), &set).is_err());
    }
}
