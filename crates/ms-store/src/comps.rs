use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ms_types::{MsResult, StoreError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::store::{most_recent, Experiment, ExperimentId, ExperimentStore, SimulationRecord};

pub const USERNAME_VAR: &str = "COMPS_USERNAME";
pub const PASSWORD_VAR: &str = "COMPS_PASSWORD";
const TOKEN_HEADER: &str = "X-COMPS-Token";

/// Rewrites the service's working-directory prefix to a local mount point
#[derive(Debug, Clone, PartialEq)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    pub fn apply(&self, path: &str) -> PathBuf {
        match path.strip_prefix(&self.from) {
            Some(rest) => {
                let rest = rest.replace('\\', "/");
                PathBuf::from(format!(
                    "{}/{}",
                    self.to.trim_end_matches('/'),
                    rest.trim_start_matches('/')
                ))
            }
            None => PathBuf::from(path),
        }
    }
}

/// Client for the COMPS experiment-tracking service
#[derive(Debug)]
pub struct CompsClient {
    pub name: String,
    pub base_url: String,
    pub mount: Option<PathRewrite>,
    pub client: reqwest::Client,
    token: Option<String>,
}

impl CompsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            name: "COMPS".to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mount: None,
            client: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn with_mount(mut self, mount: PathRewrite) -> Self {
        self.mount = Some(mount);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn credentials(&self) -> MsResult<(String, String)> {
        let read = |var: &str| {
            std::env::var(var).map_err(|_| StoreError::AuthenticationFailure {
                url: self.base_url.clone(),
                message: format!("{} is not set", var),
            })
        };
        Ok((read(USERNAME_VAR)?, read(PASSWORD_VAR)?))
    }

    fn token(&self) -> MsResult<&str> {
        self.token.as_deref().ok_or_else(|| {
            StoreError::AuthenticationFailure {
                url: self.base_url.clone(),
                message: "no session; call authenticate first".to_string(),
            }
            .into()
        })
    }

    async fn get_json(&self, url: &str, experiment_id: &ExperimentId) -> MsResult<Value> {
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, self.token()?)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed {
                message: format!("HTTP request failed: {}", e),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::ExperimentNotFound {
                experiment_id: experiment_id.to_string(),
            }
            .into());
        }
        if !response.status().is_success() {
            return Err(StoreError::RequestFailed {
                message: format!("HTTP error: {}", response.status()),
            }
            .into());
        }

        response.json().await.map_err(|e| {
            StoreError::ParseError {
                message: format!("Failed to parse JSON response: {}", e),
            }
            .into()
        })
    }

    fn parse_experiments(&self, response: &Value) -> MsResult<Vec<Experiment>> {
        let items = response
            .get("Experiments")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::ParseError {
                message: "Missing 'Experiments' in response".to_string(),
            })?;

        items
            .iter()
            .map(|item| -> MsResult<Experiment> {
                let id = string_field(item, "Id")?;
                let id = id.parse::<ExperimentId>().map_err(|e| StoreError::ParseError {
                    message: format!("Invalid experiment id '{}': {}", id, e),
                })?;
                let created = string_field(item, "DateCreated")?;
                let date_created = DateTime::parse_from_rfc3339(created)
                    .map_err(|e| StoreError::ParseError {
                        message: format!("Failed to parse date '{}': {}", created, e),
                    })?
                    .with_timezone(&Utc);
                Ok(Experiment {
                    id,
                    name: string_field(item, "Name")?.to_string(),
                    date_created,
                    simulations: Vec::new(),
                })
            })
            .collect()
    }

    fn parse_simulations(&self, response: &Value) -> MsResult<Vec<SimulationRecord>> {
        let items = response
            .get("Simulations")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::ParseError {
                message: "Missing 'Simulations' in response".to_string(),
            })?;

        items
            .iter()
            .map(|item| -> MsResult<SimulationRecord> {
                let id = string_field(item, "Id")?.to_string();
                let tags: BTreeMap<String, Value> = item
                    .get("Tags")
                    .and_then(Value::as_object)
                    .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default();
                let working_dir = item
                    .get("HPCJobs")
                    .and_then(Value::as_array)
                    .and_then(|jobs| jobs.last())
                    .and_then(|job| job.get("WorkingDirectory"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| StoreError::ParseError {
                        message: format!("Simulation {} has no working directory", id),
                    })?;
                let path = match &self.mount {
                    Some(mount) => mount.apply(working_dir),
                    None => PathBuf::from(working_dir),
                };
                Ok(SimulationRecord { id, tags, path })
            })
            .collect()
    }
}

fn string_field<'a>(item: &'a Value, field: &str) -> MsResult<&'a str> {
    item.get(field).and_then(Value::as_str).ok_or_else(|| {
        StoreError::ParseError {
            message: format!("Missing field '{}'", field),
        }
        .into()
    })
}

#[async_trait]
impl ExperimentStore for CompsClient {
    async fn authenticate(&mut self) -> MsResult<()> {
        let (username, password) = self.credentials()?;
        let url = format!("{}/api/tokens", self.base_url);
        tracing::info!("Authenticating against {}", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "UserName": username, "Password": password }))
            .send()
            .await
            .map_err(|e| StoreError::AuthenticationFailure {
                url: self.base_url.clone(),
                message: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::AuthenticationFailure {
                url: self.base_url.clone(),
                message: format!("HTTP error: {}", response.status()),
            }
            .into());
        }

        let body: Value = response.json().await.map_err(|e| StoreError::AuthenticationFailure {
            url: self.base_url.clone(),
            message: format!("Failed to parse token response: {}", e),
        })?;
        let token = body
            .get("Token")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::AuthenticationFailure {
                url: self.base_url.clone(),
                message: "Missing 'Token' in response".to_string(),
            })?;

        self.token = Some(token.to_string());
        Ok(())
    }

    async fn get_most_recent_experiment(&self, id: &ExperimentId) -> MsResult<Experiment> {
        tracing::info!("Fetching experiment {} from COMPS", id);

        let url = format!(
            "{}/api/Experiments?Id={}&orderby=DateCreated%20desc",
            self.base_url, id
        );
        let experiments = self.parse_experiments(&self.get_json(&url, id).await?)?;
        let mut experiment = most_recent(experiments).ok_or_else(|| StoreError::ExperimentNotFound {
            experiment_id: id.to_string(),
        })?;

        let url = format!(
            "{}/api/Simulations?ExperimentId={}&flags=tags,hpcjobs",
            self.base_url, experiment.id
        );
        experiment.simulations = self.parse_simulations(&self.get_json(&url, id).await?)?;

        tracing::info!(
            "Retrieved {} simulations for experiment {}",
            experiment.simulations.len(),
            experiment.name
        );
        Ok(experiment)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> Value {
        serde_json::json!({
            "type": "comps",
            "url": self.base_url,
            "authenticated": self.is_authenticated()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_types::MsError;
    use serde_json::json;

    #[test]
    fn parses_experiment_listing() {
        let client = CompsClient::new("https://comps.idmod.org/");
        let response = json!({
            "Experiments": [
                {"Id": "cc8002ec-a665-e811-a2c0-c4346bcb7275", "Name": "burnin", "DateCreated": "2018-06-01T10:00:00Z"},
                {"Id": "cc8002ec-a665-e811-a2c0-c4346bcb7275", "Name": "burnin_rerun", "DateCreated": "2018-06-05T10:00:00Z"}
            ]
        });

        let experiments = client.parse_experiments(&response).unwrap();
        assert_eq!(client.base_url, "https://comps.idmod.org");
        assert_eq!(most_recent(experiments).unwrap().name, "burnin_rerun");
    }

    #[test]
    fn parses_simulations_with_mount_rewrite() {
        let client = CompsClient::new("https://comps.idmod.org").with_mount(PathRewrite {
            from: "\\\\internal.idm.ctr\\IDM\\Home".to_string(),
            to: "/mnt/idm/home".to_string(),
        });
        let response = json!({
            "Simulations": [{
                "Id": "sim-1",
                "Tags": {"Run_Number": "2", "x_Temporary_Larval_Habitat": "31.62"},
                "HPCJobs": [{"WorkingDirectory": "\\\\internal.idm.ctr\\IDM\\Home\\user\\sim-1"}]
            }]
        });

        let sims = client.parse_simulations(&response).unwrap();
        assert_eq!(sims.len(), 1);
        assert_eq!(sims[0].tags.get("Run_Number"), Some(&json!("2")));
        assert_eq!(sims[0].path, PathBuf::from("/mnt/idm/home/user/sim-1"));
    }

    #[test]
    fn simulation_without_working_directory_is_parse_error() {
        let client = CompsClient::new("https://comps.idmod.org");
        let response = json!({"Simulations": [{"Id": "sim-1", "Tags": {}}]});
        assert!(matches!(
            client.parse_simulations(&response),
            Err(MsError::Store(StoreError::ParseError { .. }))
        ));
    }

    #[tokio::test]
    async fn lookup_without_session_fails_authentication() {
        let client = CompsClient::new("https://comps.idmod.org");
        let result = client.get_most_recent_experiment(&uuid::Uuid::nil()).await;
        assert!(matches!(
            result,
            Err(MsError::Store(StoreError::AuthenticationFailure { .. }))
        ));
    }

    #[test]
    fn path_rewrite_leaves_foreign_paths() {
        let rewrite = PathRewrite {
            from: "/remote".to_string(),
            to: "/local".to_string(),
        };
        assert_eq!(rewrite.apply("/other/sim"), PathBuf::from("/other/sim"));
        assert_eq!(rewrite.apply("/remote/sim"), PathBuf::from("/local/sim"));
    }
}
