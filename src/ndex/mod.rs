// mod.rs - NDEx REST client

//! Thin synchronous client for the two NDEx endpoints families this tool
//! touches: the v3 CX2 network endpoints (read, create, update) and the v2
//! user endpoints used to find the networks already owned by the account.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Page size for the network summary listing.
const SUMMARY_PAGE_SIZE: usize = 1000;

/// Visibility of a network created on NDEx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(Visibility::Public),
            "PRIVATE" => Ok(Visibility::Private),
            other => Err(format!(
                "Invalid visibility '{}'. Available: PUBLIC, PRIVATE",
                other
            )),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "PUBLIC"),
            Visibility::Private => write!(f, "PRIVATE"),
        }
    }
}

/// The authenticated NDEx account, as returned by `/v2/user?valid=true`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdexUser {
    pub external_id: String,
    pub user_name: String,
}

/// Summary record for a network owned by the account. Only the fields the
/// loader consults are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub external_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct NdexClient {
    host: String,
    username: String,
    password: String,
    user_agent: String,
}

impl NdexClient {
    pub fn new(server: &str, username: &str, password: &str, user_agent: &str) -> Self {
        NdexClient {
            host: normalize_host(server),
            username: username.to_string(),
            password: password.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Fetch a network as a CX2 document.
    pub fn get_network_as_cx2(&self, network_uuid: &str) -> Result<Value, String> {
        let url = self.v3(&format!("/networks/{}", network_uuid));
        let text = self.get_text(&url)?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Network {} is not valid CX2 JSON: {}", network_uuid, e))
    }

    /// The account behind the configured credentials.
    pub fn get_user(&self) -> Result<NdexUser, String> {
        let url = self.v2("/user?valid=true");
        let text = self.get_text(&url)?;
        serde_json::from_str(&text).map_err(|e| format!("Unexpected user record from NDEx: {}", e))
    }

    /// All network summaries owned by the given user, paging through the
    /// listing endpoint.
    pub fn get_user_network_summaries(
        &self,
        user_uuid: &str,
    ) -> Result<Vec<NetworkSummary>, String> {
        let mut summaries = Vec::new();
        let mut offset = 0;
        loop {
            let url = self.v2(&format!(
                "/user/{}/networksummary?offset={}&limit={}",
                user_uuid, offset, SUMMARY_PAGE_SIZE
            ));
            let text = self.get_text(&url)?;
            let page: Vec<NetworkSummary> = serde_json::from_str(&text)
                .map_err(|e| format!("Unexpected network summary listing from NDEx: {}", e))?;
            let page_len = page.len();
            summaries.extend(page);
            if page_len < SUMMARY_PAGE_SIZE {
                break;
            }
            offset += SUMMARY_PAGE_SIZE;
        }
        Ok(summaries)
    }

    /// Create a new network from a CX2 document. Returns the UUID assigned
    /// by the server.
    pub fn save_new_cx2_network(
        &self,
        cx2: &Value,
        visibility: Visibility,
    ) -> Result<String, String> {
        let url = self.v3(&format!("/networks?visibility={}", visibility));
        let body = serde_json::to_string(cx2)
            .map_err(|e| format!("Failed to serialize CX2 network: {}", e))?;

        let mut response = ureq::post(&url)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("Authorization", &self.auth_header())
            .send(body.as_str())
            .map_err(|e| format!("Failed to create network on '{}': {}", url, e))?;

        if let Some(location) = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
        {
            return Ok(uuid_from_uri(location));
        }

        // some deployments return the network URI in the body instead
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| format!("Failed to read create response from '{}': {}", url, e))?;
        let uri = text.trim().trim_matches('"');
        if uri.is_empty() {
            return Err(format!("NDEx did not return the UUID of the network created via '{}'", url));
        }
        Ok(uuid_from_uri(uri))
    }

    /// Replace the content of an existing network with a CX2 document.
    pub fn update_cx2_network(&self, cx2: &Value, network_uuid: &str) -> Result<(), String> {
        let url = self.v3(&format!("/networks/{}", network_uuid));
        let body = serde_json::to_string(cx2)
            .map_err(|e| format!("Failed to serialize CX2 network: {}", e))?;

        ureq::put(&url)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("Authorization", &self.auth_header())
            .send(body.as_str())
            .map_err(|e| format!("Failed to update network {} on '{}': {}", network_uuid, url, e))?;
        Ok(())
    }

    fn get_text(&self, url: &str) -> Result<String, String> {
        let mut response = ureq::get(url)
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("Authorization", &self.auth_header())
            .call()
            .map_err(|e| format!("Request to '{}' failed: {}", url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(format!("Request to '{}' failed: HTTP status {}", url, status));
        }

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| format!("Failed to read response from '{}': {}", url, e))
    }

    fn auth_header(&self) -> String {
        basic_auth(&self.username, &self.password)
    }

    fn v2(&self, path: &str) -> String {
        format!("https://{}/v2{}", self.host, path)
    }

    fn v3(&self, path: &str) -> String {
        format!("https://{}/v3{}", self.host, path)
    }
}

/// Strip scheme and trailing slashes from a configured server value.
pub fn normalize_host(server: &str) -> String {
    server
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

fn basic_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

fn uuid_from_uri(uri: &str) -> String {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(uri)
        .to_string()
}
