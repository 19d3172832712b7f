use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;

/// The authenticated identity making a request, resolved from the identity
/// provider's token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Principal {
    pub email: String,
    pub name: String,
}

/// Claims carried by the identity provider's ID token. The token is signed
/// HS256 with the OAuth client secret.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    #[serde(default)]
    name: String,
    exp: usize,
}

fn client_secret() -> Option<String> {
    env::var("AUTH_CLIENT_SECRET").ok().filter(|s| !s.is_empty())
}

/// Middleware that authenticates every request. A valid bearer token puts a
/// `Principal` extension on the request; anything else is a 401.
pub async fn auth_middleware(mut req: Request, next: Next) -> Response {
    let principal = match principal_from_request(&req) {
        Ok(principal) => principal,
        Err(reason) => {
            warn!(
                "Rejecting unauthenticated request to {}: {}",
                req.uri(),
                reason
            );
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response();
        }
    };

    req.extensions_mut().insert(principal);
    next.run(req).await
}

fn principal_from_request(req: &Request) -> Result<Principal, String> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "missing Authorization header".to_string())?
        .to_str()
        .map_err(|_| "malformed Authorization header".to_string())?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header is not a bearer token".to_string())?;

    decode_principal(token)
}

fn decode_principal(token: &str) -> Result<Principal, String> {
    let secret = client_secret().ok_or_else(|| "AUTH_CLIENT_SECRET is not set".to_string())?;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| format!("invalid token: {}", e))?;

    Ok(Principal {
        email: data.claims.email,
        name: data.claims.name,
    })
}

/// Signs a token the middleware will accept. Used by tests and local tooling.
pub fn issue_token(email: &str, name: &str) -> String {
    let secret = client_secret().unwrap_or_else(|| "test-secret".to_string());
    let claims = Claims {
        sub: email.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding cannot fail with HS256")
}

/// Builds a signed request for handler tests. The display name defaults to
/// the email's local part.
pub fn create_test_request(
    method: &str,
    path: &str,
    email: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let name = email.split('@').next().unwrap_or("user").to_string();
    create_test_request_as(method, path, email, &name, body)
}

pub fn create_test_request_as(
    method: &str,
    path: &str,
    email: &str,
    name: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let token = issue_token(email, name);
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("valid test request"),
        None => builder.body(Body::empty()).expect("valid test request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch the shared AUTH_CLIENT_SECRET variable
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_token_round_trip() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("AUTH_CLIENT_SECRET", "test-secret");

        let token = issue_token("alice@example.com", "Alice");
        let principal = decode_principal(&token).unwrap();
        assert_eq!(principal.email, "alice@example.com");
        assert_eq!(principal.name, "Alice");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("AUTH_CLIENT_SECRET", "test-secret");

        assert!(decode_principal("not-a-jwt").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("AUTH_CLIENT_SECRET", "test-secret");

        let claims = Claims {
            sub: "alice@example.com".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            // Far enough in the past to clear the default validation leeway
            exp: (Utc::now().timestamp() - 600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(decode_principal(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("AUTH_CLIENT_SECRET", "test-secret");
        let token = issue_token("alice@example.com", "Alice");

        env::set_var("AUTH_CLIENT_SECRET", "other-secret");
        assert!(decode_principal(&token).is_err());
        env::set_var("AUTH_CLIENT_SECRET", "test-secret");
    }
}
