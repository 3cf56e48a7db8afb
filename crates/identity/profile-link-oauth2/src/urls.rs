//! Query parameter names and redirect target construction.

use url::Url;
use url::form_urlencoded::byte_serialize;

/// Flow marker placed on the provider callback URL.
pub const FLOW_MARKER_PARAM: &str = "auth0-profile";
/// Authorization code parameter on the provider callback.
pub const CODE_PARAM: &str = "code";
/// One-shot parameter carrying the access token between the two steps.
pub const TOKEN_PARAM: &str = "auth0-profile-token";
/// Token value signalling that the code exchange failed.
pub const FAILURE_MARKER: &str = "0";

pub const AUTHORIZE_SCOPES: [&str; 4] = ["openid", "email", "email_verified", "profile"];

/// Local URLs the flow redirects between.
#[derive(Debug, Clone)]
pub struct FlowUrls {
    /// Site home; the provider redirects here with the flow marker.
    pub home_url: Url,
    /// The current user's profile edit page.
    pub profile_edit_url: Url,
}

impl FlowUrls {
    pub fn new(home_url: Url, profile_edit_url: Url) -> Self {
        Self {
            home_url,
            profile_edit_url,
        }
    }

    /// `redirect_uri` registered with the provider for this flow.
    pub fn callback_url(&self) -> Url {
        with_query_arg(&self.home_url, FLOW_MARKER_PARAM, "1")
    }

    pub fn profile_with_token(&self, token: &str) -> Url {
        with_query_arg(&self.profile_edit_url, TOKEN_PARAM, token)
    }

    pub fn profile_with_failure(&self) -> Url {
        with_query_arg(&self.profile_edit_url, TOKEN_PARAM, FAILURE_MARKER)
    }

    pub fn profile(&self) -> Url {
        without_query_arg(&self.profile_edit_url, TOKEN_PARAM)
    }
}

/// Set `key` to `value`, replacing any existing occurrences.
pub fn with_query_arg(url: &Url, key: &str, value: &str) -> Url {
    let mut url = without_query_arg(url, key);
    url.query_pairs_mut().append_pair(key, value);
    url
}

/// Drop every occurrence of `key` from the query.
pub fn without_query_arg(url: &Url, key: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = url.clone();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url
}

/// Provider login URL for the profile linking flow.
pub fn authorization_url(domain: &str, client_id: &str, urls: &FlowUrls) -> String {
    let redirect_uri: String = byte_serialize(urls.callback_url().as_str().as_bytes()).collect();
    let client_id: String = byte_serialize(client_id.as_bytes()).collect();

    format!(
        "https://{}/authorize?response_type=code&client_id={}&scope={}&redirect_uri={}",
        domain,
        client_id,
        AUTHORIZE_SCOPES.join("%20"),
        redirect_uri
    )
}
