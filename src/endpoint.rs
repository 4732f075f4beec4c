//! URL construction for the REST and streaming endpoints.
//!
//! Base URLs always end with `/` so relative paths join under them instead of
//! replacing their last segment. Path segments that come from callers are
//! percent-encoded.

use reqwest::Url;

use crate::error::RequestError;

const ACCESS_TOKEN: &str = "access_token=";

/// Parse a base URL, adding a trailing `/` when missing.
pub fn parse_base_url(base: &str) -> Result<Url, RequestError> {
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };

    let url = Url::parse(&normalized).map_err(|e| RequestError::InvalidBaseUrl {
        url: base.to_string(),
        message: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(RequestError::InvalidBaseUrl {
            url: base.to_string(),
            message: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Percent-encode a caller supplied path segment, rejecting empty and dot
/// segments (`.` and `..` would be resolved away by URL joining).
pub fn segment(name: &'static str, value: &str) -> Result<String, RequestError> {
    if value.is_empty() {
        return Err(RequestError::EmptySegment { name });
    }
    if value == "." || value == ".." {
        return Err(RequestError::InvalidPath {
            path: value.to_string(),
            message: format!("{} must not be a dot segment", name),
        });
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// Join an already encoded relative path onto a base URL.
pub fn join(base: &Url, path: &str) -> Result<Url, RequestError> {
    base.join(path).map_err(|e| RequestError::InvalidPath {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// `flows/{org}/{flow}/messages`
pub fn messages_path(org: &str, flow: &str) -> Result<String, RequestError> {
    Ok(format!(
        "flows/{}/{}/messages",
        segment("organization", org)?,
        segment("flow", flow)?
    ))
}

/// `flows/{org}/{flow}/messages/{id}`
pub fn message_path(org: &str, flow: &str, id: i64) -> Result<String, RequestError> {
    Ok(format!("{}/{}", messages_path(org, flow)?, id))
}

/// `v1/messages/team_inbox/{token}`
pub fn inbox_path(flow_api_token: &str) -> Result<String, RequestError> {
    Ok(format!(
        "v1/messages/team_inbox/{}",
        segment("flow API token", flow_api_token)?
    ))
}

/// Streaming URL for one flow: `flows/{org}/{flow}?access_token={token}`.
pub fn stream_url(base: &Url, token: &str, org: &str, flow: &str) -> Result<Url, RequestError> {
    if token.is_empty() {
        return Err(RequestError::EmptySegment { name: "access token" });
    }
    let path = format!(
        "flows/{}/{}",
        segment("organization", org)?,
        segment("flow", flow)?
    );
    let mut url = join(base, &path)?;
    url.query_pairs_mut().append_pair("access_token", token);
    Ok(url)
}

/// Replace the value of any `access_token` parameter with `***`.
///
/// Works on arbitrary text, so it is safe on strings that failed to parse.
pub fn redact_access_token(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;

    while let Some(pos) = rest.find(ACCESS_TOKEN) {
        let value_start = pos + ACCESS_TOKEN.len();
        out.push_str(&rest[..value_start]);
        out.push_str("***");
        rest = &rest[value_start..];
        let value_end = rest.find(['&', '#']).unwrap_or(rest.len());
        rest = &rest[value_end..];
    }
    out.push_str(rest);
    out
}
