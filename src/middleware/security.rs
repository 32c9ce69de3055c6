use crate::config::parse_bool_env;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::env;

// The Swagger UI page needs inline scripts and styles; API responses are JSON only.
const DEFAULT_CSP_POLICY: &str = "default-src 'self'; base-uri 'self'; frame-ancestors 'none'; object-src 'none'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    csp: HeaderValue,
    enable_hsts: bool,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            csp: HeaderValue::from_static(DEFAULT_CSP_POLICY),
            enable_hsts: true,
        }
    }
}

impl SecurityHeaders {
    pub fn from_env() -> Self {
        let csp = match env::var("CSP_POLICY") {
            Ok(raw) => HeaderValue::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(
                    "Invalid CSP_POLICY value ({}), falling back to default policy",
                    err
                );
                HeaderValue::from_static(DEFAULT_CSP_POLICY)
            }),
            Err(_) => HeaderValue::from_static(DEFAULT_CSP_POLICY),
        };

        Self {
            csp,
            enable_hsts: parse_bool_env("ENABLE_HSTS", true),
        }
    }
}

pub async fn security_headers_middleware(
    State(config): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("content-security-policy", config.csp.clone());
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if config.enable_hsts {
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}
