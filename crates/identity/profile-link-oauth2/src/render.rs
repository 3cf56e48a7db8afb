//! HTML for the provider section of the profile pages.

use crate::types::TokenParam;
use profile_link_core::IdentityClaims;
use serde_json::Value;
use std::fmt::Write;

pub const FAILURE_NOTICE: &str =
    "Login attempt was unsuccessful. Please try again or see a site admin.";
pub const LOGIN_LABEL: &str = "Login with Auth0";
pub const CONNECTED_LABEL: &str = "Connected to Auth0 user ID";

/// Everything the own-profile section needs to know about the request.
#[derive(Debug, Clone)]
pub struct ProfileView<'a> {
    pub claims: Option<&'a IdentityClaims>,
    pub token: &'a TokenParam,
    /// Viewer holds the `edit_users` capability.
    pub can_edit_users: bool,
    /// `None` when the provider is not configured.
    pub authorization_url: Option<&'a str>,
}

/// One rendered cell of the claims table, chosen by claim name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimField<'a> {
    EmailVerified(bool),
    Picture(&'a str),
    Text(String),
}

impl<'a> ClaimField<'a> {
    /// Nested arrays and objects are not shown.
    pub fn from_claim(name: &str, value: &'a Value) -> Option<Self> {
        if value.is_array() || value.is_object() {
            return None;
        }

        let field = match name {
            "email_verified" => ClaimField::EmailVerified(is_truthy(value)),
            "picture" => ClaimField::Picture(value.as_str().unwrap_or_default()),
            _ => ClaimField::Text(scalar_text(value)),
        };
        Some(field)
    }

    pub fn to_html(&self) -> String {
        match self {
            ClaimField::EmailVerified(true) => {
                r#"<span class="dashicons dashicons-yes"></span>"#.to_string()
            }
            ClaimField::EmailVerified(false) => {
                r#"<span class="dashicons dashicons-no-alt"></span>"#.to_string()
            }
            ClaimField::Picture(src) => {
                format!(r#"<img width="50" src="{}">"#, escape_html(&safe_url(src)))
            }
            ClaimField::Text(text) => format!("<code>{}</code>", escape_html(text)),
        }
    }
}

/// Section shown to a user on their own profile page.
pub fn render_own_profile(view: &ProfileView<'_>) -> String {
    let Some(authorization_url) = view.authorization_url else {
        return String::new();
    };

    let mut html = String::new();
    match view.claims {
        None => {
            html.push_str("<h3>Auth0</h3>");
            if view.token.is_failure_notice() {
                let _ = write!(html, "<p><strong>{}</strong></p>", FAILURE_NOTICE);
            }
            let _ = write!(
                html,
                r#"<a href="{}" class="button">{}</a>"#,
                escape_html(authorization_url),
                LOGIN_LABEL
            );
        }
        Some(claims) if !view.can_edit_users => {
            let _ = write!(
                html,
                "<h3>Auth0</h3><p>{}: <code>{}</code></p>",
                CONNECTED_LABEL,
                escape_html(claims.subject())
            );
        }
        Some(_) => {}
    }

    if view.can_edit_users {
        html.push_str(&render_claims_table(view.claims));
    }
    html
}

/// Full claims table, for viewers with `edit_users` only.
pub fn render_claims_table(claims: Option<&IdentityClaims>) -> String {
    let Some(claims) = claims else {
        return String::new();
    };

    let mut html = String::from(r#"<h3>Auth0</h3><table class="form-table">"#);
    for (name, value) in claims.iter() {
        if let Some(field) = ClaimField::from_claim(name, value) {
            let _ = write!(
                html,
                r#"<tr><th scope="row"><strong>{}</strong></th><td>{}</td></tr>"#,
                escape_html(name),
                field.to_html()
            );
        }
    }
    html.push_str("</table>");
    html
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn safe_url(src: &str) -> String {
    match url::Url::parse(src) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
