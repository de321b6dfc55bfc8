use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// Firebase Cloud Messaging settings.
///
/// Either a static `FCM_ACCESS_TOKEN` or a service account key file is
/// needed for push delivery; without both, notifications are stored but
/// never pushed.
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: Option<String>,
    pub service_account_path: Option<PathBuf>,
    pub access_token: Option<String>,
    pub base_url: String,
}

impl FcmConfig {
    pub fn from_env() -> Result<Self> {
        let project_id = non_empty("FCM_PROJECT_ID").or_else(|| non_empty("GOOGLE_CLOUD_PROJECT"));
        let service_account_path = non_empty("FCM_SERVICE_ACCOUNT_PATH")
            .or_else(|| non_empty("GOOGLE_APPLICATION_CREDENTIALS"))
            .map(PathBuf::from);
        let access_token = non_empty("FCM_ACCESS_TOKEN");
        let base_url = non_empty("FCM_BASE_URL").unwrap_or_else(|| DEFAULT_FCM_BASE_URL.to_string());

        Ok(FcmConfig {
            project_id,
            service_account_path,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.service_account_path.is_some()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
