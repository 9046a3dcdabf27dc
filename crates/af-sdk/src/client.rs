//! GraphQL client for the Alternate Futures platform.
//!
//! # Example
//!
//! ```rust,no_run
//! use af_sdk::{PersonalAccessTokenService, SdkClient, SdkOptions};
//!
//! # async fn example() -> Result<(), af_sdk::SdkError> {
//! let options = SdkOptions::new("https://graphql.example/graphql");
//! let tokens = PersonalAccessTokenService::new("af_pat", None);
//! let sdk = SdkClient::new(options, tokens)?;
//! let me = sdk.user().me().await?;
//! println!("{}", me.id);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::api::{DomainsApi, EnsApi, SitesApi};
use crate::error::SdkError;
use crate::types::{Deployment, Domain, EnsRecord, User, Zone};

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Service endpoints the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkOptions {
    /// GraphQL API endpoint.
    pub graphql_service_api_url: String,
    /// IPFS storage API endpoint.
    pub ipfs_storage_api_url: Option<String>,
    /// Upload proxy endpoint.
    pub upload_proxy_api_url: Option<String>,
    /// Auth service endpoint (billing and token management).
    pub auth_service_url: Option<String>,
}

impl SdkOptions {
    /// Options with only the GraphQL endpoint set.
    #[must_use]
    pub fn new(graphql_service_api_url: impl Into<String>) -> Self {
        Self {
            graphql_service_api_url: graphql_service_api_url.into(),
            ipfs_storage_api_url: None,
            upload_proxy_api_url: None,
            auth_service_url: None,
        }
    }
}

/// Supplies request credentials from a personal access token.
#[derive(Clone)]
pub struct PersonalAccessTokenService {
    personal_access_token: String,
    project_id: Option<String>,
}

impl std::fmt::Debug for PersonalAccessTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonalAccessTokenService")
            .field("personal_access_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl PersonalAccessTokenService {
    /// Create a token service.
    #[must_use]
    pub fn new(personal_access_token: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            personal_access_token: personal_access_token.into(),
            project_id,
        }
    }

    /// The personal access token.
    #[must_use]
    pub fn personal_access_token(&self) -> &str {
        &self.personal_access_token
    }

    /// The project the requests are scoped to, if any.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

/// Platform client. Cheap to build; one per command invocation.
pub struct SdkClient {
    http: reqwest::Client,
    options: SdkOptions,
    tokens: PersonalAccessTokenService,
}

impl std::fmt::Debug for SdkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkClient")
            .field("options", &self.options)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorBody>,
}

#[derive(Deserialize)]
struct GraphQlErrorBody {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlExtensions>,
}

#[derive(Deserialize)]
struct GraphQlExtensions {
    code: Option<String>,
}

impl SdkClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(options: SdkOptions, tokens: PersonalAccessTokenService) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .user_agent(concat!("af-sdk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SdkError::Client(e.to_string()))?;

        debug!(
            graphql = %options.graphql_service_api_url,
            project_id = tokens.project_id().unwrap_or("-"),
            "SDK client constructed"
        );

        Ok(Self {
            http,
            options,
            tokens,
        })
    }

    /// Endpoints this client was built with.
    #[must_use]
    pub const fn options(&self) -> &SdkOptions {
        &self.options
    }

    /// Credentials this client sends.
    #[must_use]
    pub const fn tokens(&self) -> &PersonalAccessTokenService {
        &self.tokens
    }

    /// Domain operations.
    #[must_use]
    pub const fn domains(&self) -> Domains<'_> {
        Domains { client: self }
    }

    /// ENS operations.
    #[must_use]
    pub const fn ens(&self) -> Ens<'_> {
        Ens { client: self }
    }

    /// Site operations.
    #[must_use]
    pub const fn sites(&self) -> Sites<'_> {
        Sites { client: self }
    }

    /// User operations.
    #[must_use]
    pub const fn user(&self) -> Users<'_> {
        Users { client: self }
    }

    /// Run a GraphQL operation and decode its `data`.
    ///
    /// `resource` names what the operation fetches and is used for
    /// [`SdkError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns the first GraphQL error (classified), an HTTP status error,
    /// or a transport/decoding error.
    pub async fn query<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, SdkError> {
        let mut request = self
            .http
            .post(&self.options.graphql_service_api_url)
            .header("authorization", self.tokens.personal_access_token())
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(project_id) = self.tokens.project_id() {
            request = request.header("x-project-id", project_id);
        }

        trace!(resource, "Sending GraphQL request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: GraphQlResponse<T> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(SdkError::Decode(e)),
            Err(_) => {
                return Err(SdkError::Http {
                    status: status.as_u16(),
                    message: body,
                });
            }
        };

        if let Some(error) = parsed.errors.into_iter().next() {
            let code = error.extensions.and_then(|ext| ext.code);
            return Err(SdkError::from_graphql(error.message, code.as_deref(), resource));
        }

        if !status.is_success() {
            return Err(SdkError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        parsed.data.ok_or_else(|| SdkError::GraphQl {
            message: format!("response for {resource} contained no data"),
            code: None,
        })
    }
}

fn present<T>(value: Option<T>, resource: &str) -> Result<T, SdkError> {
    value.ok_or_else(|| SdkError::NotFound {
        resource: resource.to_string(),
    })
}

// ============================================================================
// Sub-clients
// ============================================================================

/// Domain sub-client.
#[derive(Debug, Clone, Copy)]
pub struct Domains<'a> {
    client: &'a SdkClient,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainByHostnameData {
    domain_by_hostname: Option<Domain>,
}

#[derive(Deserialize)]
struct DomainData {
    domain: Option<Domain>,
}

#[derive(Deserialize)]
struct ZoneData {
    zone: Option<Zone>,
}

const DOMAIN_FIELDS: &str = "id hostname status zone { id }";

impl DomainsApi for Domains<'_> {
    async fn get_by_hostname(&self, hostname: &str) -> Result<Domain, SdkError> {
        let query = format!(
            "query domainByHostname($where: DomainByHostnameWhereInput!) \
             {{ domainByHostname(where: $where) {{ {DOMAIN_FIELDS} }} }}"
        );
        let data: DomainByHostnameData = self
            .client
            .query("domain", &query, json!({ "where": { "hostname": hostname } }))
            .await?;
        present(data.domain_by_hostname, "domain")
    }

    async fn get(&self, domain_id: &str) -> Result<Domain, SdkError> {
        let query = format!(
            "query domain($where: DomainWhereInput!) {{ domain(where: $where) {{ {DOMAIN_FIELDS} }} }}"
        );
        let data: DomainData = self
            .client
            .query("domain", &query, json!({ "where": { "id": domain_id } }))
            .await?;
        present(data.domain, "domain")
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone, SdkError> {
        let data: ZoneData = self
            .client
            .query(
                "zone",
                "query zone($where: ZoneWhereInput!) { zone(where: $where) { id status } }",
                json!({ "where": { "id": zone_id } }),
            )
            .await?;
        present(data.zone, "zone")
    }
}

/// ENS sub-client.
#[derive(Debug, Clone, Copy)]
pub struct Ens<'a> {
    client: &'a SdkClient,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnsRecordData {
    ens_record: Option<EnsRecord>,
}

impl EnsApi for Ens<'_> {
    async fn get(&self, id: &str) -> Result<EnsRecord, SdkError> {
        let data: EnsRecordData = self
            .client
            .query(
                "ens record",
                "query ensRecord($where: EnsRecordWhereInput!) \
                 { ensRecord(where: $where) { id name status } }",
                json!({ "where": { "id": id } }),
            )
            .await?;
        present(data.ens_record, "ens record")
    }
}

/// Site sub-client.
#[derive(Debug, Clone, Copy)]
pub struct Sites<'a> {
    client: &'a SdkClient,
}

#[derive(Deserialize)]
struct DeploymentData {
    deployment: Option<Deployment>,
}

impl SitesApi for Sites<'_> {
    async fn get_deployment(&self, id: &str) -> Result<Deployment, SdkError> {
        let data: DeploymentData = self
            .client
            .query(
                "deployment",
                "query deployment($where: DeploymentWhereInput!) \
                 { deployment(where: $where) { id status cid } }",
                json!({ "where": { "id": id } }),
            )
            .await?;
        present(data.deployment, "deployment")
    }
}

/// User sub-client.
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a SdkClient,
}

#[derive(Deserialize)]
struct MeData {
    me: Option<User>,
}

impl Users<'_> {
    /// Fetch the user the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no user is returned.
    pub async fn me(&self) -> Result<User, SdkError> {
        let data: MeData = self
            .client
            .query(
                "user",
                "query Me { me { id email username walletAddress createdAt updatedAt } }",
                json!({}),
            )
            .await?;
        present(data.me, "user")
    }
}
