/// Hide the password and sensitive query parameters of a connection string
/// so it can be logged.
pub fn redact_connection_string(conn: &str) -> String {
    let (base, query) = match conn.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (conn, None),
    };

    let mut redacted = redact_authority(base);
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&redact_query_params(query));
    }
    redacted
}

fn redact_authority(base: &str) -> String {
    let Some(scheme_end) = base.find("://") else {
        return base.to_string();
    };
    let authority_start = scheme_end + 3;
    let rest = &base[authority_start..];

    let Some(at_idx) = rest.rfind('@') else {
        return base.to_string();
    };
    let userinfo = &rest[..at_idx];

    match userinfo.split_once(':') {
        Some((user, _password)) => format!(
            "{}{user}:***{}",
            &base[..authority_start],
            &rest[at_idx..]
        ),
        None => base.to_string(),
    }
}

fn redact_query_params(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pass" | "token" | "sslpassword"
    )
}
