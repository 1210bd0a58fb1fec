use actix_web::HttpRequest;

const PROXY_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Extract the client's IP address from the request, considering proxy headers if trusted.
/// `trust_proxy_headers`: whether to trust X-Forwarded-For, X-Real-IP and CF-Connecting-IP
pub fn get_client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        for header in PROXY_HEADERS {
            let value = req
                .headers()
                .get(header)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(str::trim)
                .filter(|s| !s.is_empty());

            if let Some(ip) = value {
                return ip.to_string();
            }
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
