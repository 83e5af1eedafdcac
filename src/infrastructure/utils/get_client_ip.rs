use actix_web::HttpRequest;

/// Client address used as the rate-limit key.
///
/// The left-most `X-Forwarded-For` entry is only honoured when the service runs
/// behind a proxy that sets it (`RATE_LIMIT__TRUST_X_FORWARDED_FOR`).
pub fn get_client_ip(req: &HttpRequest, trust_x_forwarded_for: bool) -> String {
    if trust_x_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_header_only_when_trusted() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.9:5000".parse().unwrap())
            .insert_header(("x-forwarded-for", "203.0.113.7, 10.0.0.1"))
            .to_http_request();

        assert_eq!(get_client_ip(&req, true), "203.0.113.7");
        assert_eq!(get_client_ip(&req, false), "192.168.1.9");
    }

    #[test]
    fn missing_peer_is_unknown() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_client_ip(&req, false), "unknown");
    }
}
