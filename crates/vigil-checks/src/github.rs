//! Organization membership security check: flags members of a GitHub
//! organization that have multi-factor authentication disabled.

use crate::check::{Check, ExecuteError, ProbeError};
use serde::Deserialize;
use tracing::debug;
use vigil_config::CheckOptions;
use vigil_types::{Issue, ids};

const K_ORGANIZATION_NAME: &str = "organization_name";
const K_USERNAME: &str = "username";
const K_ACCESS_KEY: &str = "access_key";

const REQUIRED_KEYS: &[&str] = &[K_ORGANIZATION_NAME, K_USERNAME, K_ACCESS_KEY];

const PAGE_SIZE: usize = 100;

/// Seam between the check logic and the organization-management API.
/// Production uses [`GithubDirectory`]; tests inject scripted member lists.
pub trait OrgDirectory: Send {
    /// Logins of members missing the required security control, in the order
    /// the API reports them.
    fn members_without_mfa(
        &self,
        organization: &str,
        username: &str,
        token: &str,
    ) -> Result<Vec<String>, ProbeError>;
}

/// Emits one issue per organization member without MFA enabled.
pub struct GithubOrganizationCheck {
    id: String,
    options: CheckOptions,
    directory: Box<dyn OrgDirectory>,
}

impl GithubOrganizationCheck {
    pub fn new(id: String, options: CheckOptions) -> Self {
        Self::with_directory(id, options, Box::new(GithubDirectory::default()))
    }

    pub fn with_directory(
        id: String,
        options: CheckOptions,
        directory: Box<dyn OrgDirectory>,
    ) -> Self {
        Self {
            id,
            options,
            directory,
        }
    }
}

impl Check for GithubOrganizationCheck {
    fn check_id(&self) -> &str {
        &self.id
    }

    fn type_identifier(&self) -> &'static str {
        ids::CHECK_TYPE_GITHUB_ORGANIZATION
    }

    fn required_keys(&self) -> &'static [&'static str] {
        REQUIRED_KEYS
    }

    fn options(&self) -> &CheckOptions {
        &self.options
    }

    fn execute(&self) -> Result<Vec<Issue>, ExecuteError> {
        let organization = self.options.require_str(K_ORGANIZATION_NAME)?;
        let username = self.options.require_str(K_USERNAME)?;
        let access_key = self.options.require_str(K_ACCESS_KEY)?;

        let members = self
            .directory
            .members_without_mfa(&organization, &username, &access_key)?;
        debug!(
            check_id = %self.id,
            organization = %organization,
            flagged = members.len(),
            "fetched organization membership"
        );

        Ok(members
            .into_iter()
            .map(|login| {
                Issue::new(
                    self.id.as_str(),
                    ids::CHECK_TYPE_GITHUB_ORGANIZATION,
                    format!(
                        "member '{login}' of organization '{organization}' has multi-factor authentication disabled"
                    ),
                )
            })
            .collect())
    }
}

/// Production directory backed by the GitHub REST API.
pub struct GithubDirectory {
    api_base: String,
}

impl Default for GithubDirectory {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl GithubDirectory {
    /// Point the directory at a different API host (enterprise installs).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Member {
    login: String,
}

impl OrgDirectory for GithubDirectory {
    fn members_without_mfa(
        &self,
        organization: &str,
        username: &str,
        token: &str,
    ) -> Result<Vec<String>, ProbeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("vigil/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ProbeError(format!("failed to construct http client: {err}")))?;

        let url = format!("{}/orgs/{}/members", self.api_base, organization);
        let per_page = PAGE_SIZE.to_string();
        let mut logins = Vec::new();

        for page in 1u32.. {
            let page_param = page.to_string();
            let response = client
                .get(&url)
                .query(&[
                    ("filter", "2fa_disabled"),
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                ])
                .basic_auth(username, Some(token))
                .header(reqwest::header::ACCEPT, "application/vnd.github+json")
                .send()
                .map_err(|err| ProbeError(format!("organization membership query failed: {err}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProbeError(format!(
                    "organization membership query for '{organization}' returned {status}"
                )));
            }

            let members: Vec<Member> = response
                .json()
                .map_err(|err| ProbeError(format!("invalid membership response: {err}")))?;
            let fetched = members.len();
            logins.extend(members.into_iter().map(|member| member.login));
            if fetched < PAGE_SIZE {
                break;
            }
        }

        Ok(logins)
    }
}
