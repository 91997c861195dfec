//! Ordered composition of configuration overlay steps.

use ms_types::{MsResult, SimConfig, SweepError};
use tracing::debug;

/// One configuration overlay: a pure function from the current snapshot to
/// the next.
pub trait Overlay: Send + Sync {
    /// Step name used in logs and clobber errors.
    fn name(&self) -> &str;

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig>;
}

/// Overlay backed by a closure.
pub struct FnOverlay<F> {
    name: String,
    f: F,
}

impl<F> FnOverlay<F>
where
    F: Fn(SimConfig) -> MsResult<SimConfig> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Overlay for FnOverlay<F>
where
    F: Fn(SimConfig) -> MsResult<SimConfig> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, config: SimConfig) -> MsResult<SimConfig> {
        (self.f)(config)
    }
}

/// Runs overlay steps in insertion order.
///
/// A step may add keys, overwrite values and append events, but must not
/// remove anything an earlier step produced; doing so fails the run with
/// `OverlayClobbered`.
#[derive(Default)]
pub struct ConfigPipeline {
    steps: Vec<Box<dyn Overlay>>,
}

impl ConfigPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn then(mut self, step: impl Overlay + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn then_if(self, condition: bool, step: impl Overlay + 'static) -> Self {
        if condition {
            self.then(step)
        } else {
            self
        }
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, base: SimConfig) -> MsResult<SimConfig> {
        let mut config = base;
        for step in &self.steps {
            let before = config.footprint();
            config = step.apply(config)?;
            if let Some(key) = before.first_missing_in(&config.footprint()) {
                return Err(SweepError::OverlayClobbered {
                    step: step.name().to_string(),
                    key,
                }
                .into());
            }
            debug!("Applied overlay step: {}", step.name());
        }
        Ok(config)
    }
}

impl std::fmt::Debug for ConfigPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigPipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::MsError;
    use serde_json::json;

    #[test]
    fn steps_run_in_order() {
        let pipeline = ConfigPipeline::new()
            .then(FnOverlay::new("first", |c: SimConfig| {
                c.with_param("Run_Number", json!(1))
            }))
            .then(FnOverlay::new("second", |c: SimConfig| {
                c.with_param("Run_Number", json!(2))
            }));

        let config = pipeline.run(SimConfig::default()).unwrap();
        assert_eq!(config.get_param("Run_Number"), Some(&json!(2)));
        assert_eq!(pipeline.step_names(), vec!["first", "second"]);
    }

    #[test]
    fn then_if_skips_disabled_steps() {
        let pipeline = ConfigPipeline::new()
            .then_if(false, FnOverlay::new("skipped", |c: SimConfig| {
                c.with_param("Skipped", json!(true))
            }))
            .then_if(true, FnOverlay::new("kept", |c: SimConfig| {
                c.with_param("Kept", json!(true))
            }));

        let config = pipeline.run(SimConfig::default()).unwrap();
        assert!(config.get_param("Skipped").is_none());
        assert_eq!(pipeline.step_names(), vec!["kept"]);
    }

    #[test]
    fn removing_an_earlier_key_is_rejected() {
        let pipeline = ConfigPipeline::new()
            .then(FnOverlay::new("reporting", |c: SimConfig| {
                c.with_param("Report_Event_Recorder", json!(1))
            }))
            .then(FnOverlay::new("clobber", |mut c: SimConfig| {
                c.parameters.remove("Report_Event_Recorder");
                Ok(c)
            }));

        match pipeline.run(SimConfig::default()) {
            Err(MsError::Sweep(SweepError::OverlayClobbered { step, key })) => {
                assert_eq!(step, "clobber");
                assert_eq!(key, "Report_Event_Recorder");
            }
            other => panic!("expected OverlayClobbered, got {other:?}"),
        }
    }

    #[test]
    fn step_errors_propagate() {
        let pipeline = ConfigPipeline::new().then(FnOverlay::new("fails", |_c: SimConfig| {
            Err(MsError::Validation("bad input".to_string()))
        }));
        assert!(pipeline.run(SimConfig::default()).is_err());
    }
}
