//! Drive v3 transport for script containers.
//!
//! Three calls, all against the files API: export the container as a script
//! JSON document, read its `modifiedTime`, and replace its content with a
//! media upload. The alias is resolved through the credential provider on
//! every call; the provider caches handles so each alias authenticates once
//! per process.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use gas_sync_core::types::{Alias, FileId, ScriptBundle};
use gas_sync_core::{CredentialProvider, GatewayError, ScriptGateway};

use crate::error::gateway_err;

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/drive/v3/files";
const SCRIPT_MIME: &str = "application/vnd.google-apps.script+json";

/// Metadata subset requested by [`ScriptGateway::modified_time`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMeta {
    modified_time: DateTime<Utc>,
}

pub struct DriveGateway {
    agent: ureq::Agent,
    credentials: Arc<dyn CredentialProvider>,
}

impl DriveGateway {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            credentials,
        }
    }

    fn bearer(&self, alias: &Alias) -> Result<String, GatewayError> {
        let handle = self.credentials.resolve(alias)?;
        Ok(format!("Bearer {}", handle.bearer()))
    }
}

impl ScriptGateway for DriveGateway {
    fn export_files(&self, alias: &Alias, file_id: &FileId) -> Result<ScriptBundle, GatewayError> {
        let bearer = self.bearer(alias)?;
        let url = format!("{FILES_ENDPOINT}/{file_id}/export");
        log::debug!("exporting container {file_id}");
        let response = self
            .agent
            .get(&url)
            .query("mimeType", SCRIPT_MIME)
            .set("Authorization", &bearer)
            .call()
            .map_err(gateway_err)?;
        response
            .into_json()
            .map_err(|err| GatewayError::Payload(err.to_string()))
    }

    fn modified_time(
        &self,
        alias: &Alias,
        file_id: &FileId,
    ) -> Result<DateTime<Utc>, GatewayError> {
        let bearer = self.bearer(alias)?;
        let url = format!("{FILES_ENDPOINT}/{file_id}");
        let response = self
            .agent
            .get(&url)
            .query("fields", "modifiedTime")
            .set("Authorization", &bearer)
            .call()
            .map_err(gateway_err)?;
        let meta: FileMeta = response
            .into_json()
            .map_err(|err| GatewayError::Payload(err.to_string()))?;
        Ok(meta.modified_time)
    }

    fn replace_files(
        &self,
        alias: &Alias,
        file_id: &FileId,
        bundle: &ScriptBundle,
    ) -> Result<(), GatewayError> {
        let bearer = self.bearer(alias)?;
        let url = format!("{UPLOAD_ENDPOINT}/{file_id}");
        let body = serde_json::to_string(bundle)
            .map_err(|err| GatewayError::Payload(err.to_string()))?;
        log::debug!("replacing container {file_id} ({} files)", bundle.files.len());
        self.agent
            .request("PATCH", &url)
            .query("uploadType", "media")
            .set("Authorization", &bearer)
            .set("Content-Type", SCRIPT_MIME)
            .send_string(&body)
            .map_err(gateway_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_meta_parses_drive_timestamp() {
        let meta: FileMeta =
            serde_json::from_str(r#"{"modifiedTime": "2024-01-01T00:00:00.000Z"}"#)
                .expect("parse");
        assert_eq!(meta.modified_time.timestamp(), 1_704_067_200);
    }
}
