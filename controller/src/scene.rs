use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use scenekick_common::{SceneRef, VendorConfig};

/// Seam to the external scene-execution collaborator. The worker loop and the
/// configuration API only ever see this trait; tests substitute a recorder.
#[async_trait]
pub trait SceneExecutor: Send + Sync {
    async fn execute(&self, scene_id: &str) -> anyhow::Result<()>;
    async fn list_scenes(&self) -> anyhow::Result<Vec<SceneRef>>;
}

#[derive(Debug, Deserialize)]
struct VendorSceneList {
    body: Vec<VendorScene>,
}

#[derive(Debug, Deserialize)]
struct VendorScene {
    #[serde(rename = "sceneName")]
    scene_name: String,
    #[serde(rename = "sceneId")]
    scene_id: String,
}

/// HTTP client for the vendor scene API. The request timeout is bounded so a
/// hung vendor endpoint cannot stall the worker past the watchdog.
pub struct VendorSceneClient {
    http: reqwest::Client,
    api_base: String,
    api_token: String,
}

impl VendorSceneClient {
    pub fn new(vendor: &VendorConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(vendor.request_timeout_ms))
            .build()
            .context("building vendor http client")?;

        Ok(Self {
            http,
            api_base: vendor.api_base.clone(),
            api_token: vendor.api_token.clone(),
        })
    }
}

#[async_trait]
impl SceneExecutor for VendorSceneClient {
    async fn execute(&self, scene_id: &str) -> anyhow::Result<()> {
        let url = format!("{}/v1.0/scenes/{scene_id}/execute", self.api_base);
        info!("executing scene {scene_id}");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .with_context(|| format!("posting scene execution to {url}"))?;

        if !response.status().is_success() {
            bail!("scene execution returned {}", response.status());
        }
        Ok(())
    }

    async fn list_scenes(&self) -> anyhow::Result<Vec<SceneRef>> {
        let url = format!("{}/v1.0/scenes", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .with_context(|| format!("fetching scene list from {url}"))?
            .error_for_status()
            .context("scene list request rejected")?;

        let parsed: VendorSceneList = response.json().await.context("decoding scene list")?;
        Ok(parsed
            .body
            .into_iter()
            .map(|scene| SceneRef {
                name: scene.scene_name,
                id: scene.scene_id,
            })
            .collect())
    }
}
