use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};

/// Bearer token from the Authorization header
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let token = bearer_token(&req).ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = super::jwt::validate_token(token).await.map_err(|e| {
        tracing::warn!("Rejected token: {:#}", e);
        StatusCode::UNAUTHORIZED
    })?;

    // Handlers read the claims through `CurrentUser`
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let req = axum::http::Request::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let basic = axum::http::Request::builder()
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&basic), None);

        let missing = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&missing), None);
    }
}
