use actix_web::HttpRequest;

/// Best-effort client address for diagnostics. Header values are supplied by
/// the client and can be forged; never use this for access decisions.
///
/// Priority: `Client-IP`, then the first `X-Forwarded-For` entry, then the
/// peer address. First non-empty wins.
pub fn client_ip(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(ip) = header("client-ip") {
        return ip.to_string();
    }
    if let Some(ip) = header("x-forwarded-for")
        .and_then(|list| list.split(',').map(str::trim).find(|s| !s.is_empty()))
    {
        return ip.to_string();
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}
