use std::{env::var, path::PathBuf, str::FromStr as _, sync::Arc};

use dotenv::dotenv;
use eyre::{eyre, Context, Error};
use log::debug;
use model::rights::{Role, Viewer};

const DEFAULT_CALENDAR_DAYS: u32 = 7;

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

#[derive(Clone)]
pub struct EnvInner {
    fixture: PathBuf,
    viewer_role: Role,
    viewer_id: i64,
    calendar_days: u32,
    rust_log: String,
}

impl Env {
    pub fn fixture(&self) -> &PathBuf {
        &self.0.fixture
    }

    pub fn viewer_role(&self) -> Role {
        self.0.viewer_role
    }

    pub fn viewer_id(&self) -> i64 {
        self.0.viewer_id
    }

    pub fn viewer(&self) -> Viewer {
        Viewer::new(self.0.viewer_id, self.0.viewer_role)
    }

    pub fn calendar_days(&self) -> u32 {
        self.0.calendar_days
    }

    pub fn rust_log(&self) -> &str {
        &self.0.rust_log
    }

    pub fn load() -> Result<Env, Error> {
        if let Err(err) = dotenv() {
            debug!("No .env file: {}", err);
        }
        Env::from_lookup(|key| var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Env, Error> {
        let fixture = get("DASHBOARD_FIXTURE")
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("DASHBOARD_FIXTURE is not set"))?;
        let viewer_role = match get("VIEWER_ROLE") {
            Some(role) => Role::from_str(role.trim().to_lowercase().as_str())
                .with_context(|| format!("VIEWER_ROLE is not a role: {}", role))?,
            None => Role::Admin,
        };
        let viewer_id = match get("VIEWER_ID") {
            Some(id) => id.trim().parse::<i64>().context("VIEWER_ID is not a number")?,
            None => 0,
        };
        let calendar_days = match get("CALENDAR_DAYS") {
            Some(days) => days.trim().parse::<u32>().context("CALENDAR_DAYS is not a number")?,
            None => DEFAULT_CALENDAR_DAYS,
        };
        let rust_log = get("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Env(Arc::new(EnvInner {
            fixture,
            viewer_role,
            viewer_id,
            calendar_days,
            rust_log,
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Result<Env, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Env::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let env = env(&[("DASHBOARD_FIXTURE", "fixtures/studio.json")]).unwrap();
        assert_eq!(env.fixture(), &PathBuf::from("fixtures/studio.json"));
        assert_eq!(env.viewer_role(), Role::Admin);
        assert_eq!(env.viewer_id(), 0);
        assert_eq!(env.calendar_days(), 7);
        assert_eq!(env.rust_log(), "info");
    }

    #[test]
    fn test_trainer_viewer() {
        let env = env(&[
            ("DASHBOARD_FIXTURE", "f.json"),
            ("VIEWER_ROLE", "Trainer"),
            ("VIEWER_ID", "7"),
        ])
        .unwrap();
        let viewer = env.viewer();
        assert!(viewer.is_trainer());
        assert_eq!(viewer.id, 7);
    }

    #[test]
    fn test_missing_fixture_and_bad_values() {
        assert!(env(&[]).is_err());
        assert!(env(&[("DASHBOARD_FIXTURE", "f.json"), ("VIEWER_ROLE", "owner")]).is_err());
        assert!(env(&[("DASHBOARD_FIXTURE", "f.json"), ("CALENDAR_DAYS", "week")]).is_err());
    }
}
