use super::{DirectoryError, DirectoryService, MembershipChange, MembershipState};
use crate::config::DirectoryConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DirectoryApiClient {
    api_base: String,
    search_limit: usize,
    agent: ureq::Agent,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectoryEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct EmptyData {}

#[derive(Debug, Clone, Deserialize)]
struct MembershipData {
    status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchData {
    #[serde(default)]
    resources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResolveData {
    #[serde(default)]
    primary: Option<String>,
}

impl DirectoryApiClient {
    pub fn new(config: &DirectoryConfig) -> Self {
        let api_base = std::env::var("OPSDESK_DIRECTORY_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| config.api_base.clone());
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            api_base,
            search_limit: config.search_limit,
            agent,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<DirectoryEnvelope<T>, DirectoryError> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{url}?{encoded}");
        }

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| DirectoryError::ApiRequest(e.to_string()))?;
        response
            .into_json::<DirectoryEnvelope<T>>()
            .map_err(|e| DirectoryError::ApiRequest(e.to_string()))
    }

    fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<DirectoryEnvelope<T>, DirectoryError> {
        let url = self.endpoint(path);
        let response = self
            .agent
            .post(&url)
            .send_json(body.clone())
            .map_err(|e| DirectoryError::ApiRequest(e.to_string()))?;
        response
            .into_json::<DirectoryEnvelope<T>>()
            .map_err(|e| DirectoryError::ApiRequest(e.to_string()))
    }
}

fn membership_state_from_api(raw: &str) -> Result<MembershipState, DirectoryError> {
    match raw {
        "member" => Ok(MembershipState::Member),
        "not_member" => Ok(MembershipState::NotMember),
        "subject_not_found" => Ok(MembershipState::SubjectNotFound),
        "resource_not_found" => Ok(MembershipState::ResourceNotFound),
        other => Err(DirectoryError::UnknownMembershipState(other.to_string())),
    }
}

impl DirectoryService for DirectoryApiClient {
    fn check_membership(
        &self,
        subject: &str,
        resource: &str,
    ) -> Result<MembershipState, DirectoryError> {
        let envelope: DirectoryEnvelope<MembershipData> = self.get(
            "membership/check",
            &[
                ("subject", subject.to_string()),
                ("resource", resource.to_string()),
            ],
        )?;
        if !envelope.ok {
            return Err(DirectoryError::ApiResponse(
                envelope
                    .error
                    .unwrap_or_else(|| "membership/check failed".to_string()),
            ));
        }
        membership_state_from_api(&envelope.data.status)
    }

    fn mutate_membership(
        &self,
        subject: &str,
        resource: &str,
        change: MembershipChange,
    ) -> Result<(), DirectoryError> {
        let body = json!({
            "subject": subject,
            "resource": resource,
            "action": change.as_str(),
        });
        let envelope: DirectoryEnvelope<EmptyData> = self.post_json("membership/mutate", &body)?;
        if !envelope.ok {
            return Err(DirectoryError::ApiResponse(
                envelope
                    .error
                    .unwrap_or_else(|| "membership/mutate failed".to_string()),
            ));
        }
        Ok(())
    }

    fn search_resources(&self, name_fragment: &str) -> Result<Vec<String>, DirectoryError> {
        let envelope: DirectoryEnvelope<SearchData> = self.get(
            "resources/search",
            &[
                ("q", name_fragment.to_string()),
                ("limit", self.search_limit.to_string()),
            ],
        )?;
        if !envelope.ok {
            return Err(DirectoryError::ApiResponse(
                envelope
                    .error
                    .unwrap_or_else(|| "resources/search failed".to_string()),
            ));
        }
        Ok(envelope.data.resources)
    }

    fn resolve_alias(&self, subject: &str) -> Result<Option<String>, DirectoryError> {
        let envelope: DirectoryEnvelope<ResolveData> =
            self.get("identities/resolve", &[("alias", subject.to_string())])?;
        if !envelope.ok {
            return Err(DirectoryError::ApiResponse(
                envelope
                    .error
                    .unwrap_or_else(|| "identities/resolve failed".to_string()),
            ));
        }
        Ok(envelope.data.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectoryConfig;

    #[test]
    fn membership_states_parse_from_api_values() {
        assert_eq!(
            membership_state_from_api("member").expect("member"),
            MembershipState::Member
        );
        assert_eq!(
            membership_state_from_api("resource_not_found").expect("rnf"),
            MembershipState::ResourceNotFound
        );
        assert!(membership_state_from_api("banned").is_err());
    }

    #[test]
    fn endpoint_joins_without_duplicate_slash() {
        let config = DirectoryConfig {
            api_base: "https://dir.example/api/".to_string(),
            ..DirectoryConfig::default()
        };
        let client = DirectoryApiClient::new(&config);
        assert!(client.endpoint("membership/check").ends_with("api/membership/check"));
    }
}
