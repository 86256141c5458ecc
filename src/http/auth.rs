use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

use super::error::ApiError;

pub const ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    fn from_header(req: &HttpRequest) -> Result<Self, ApiError> {
        let value = req
            .headers()
            .get(ROLE_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing user role"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Unreadable user role"))?;

        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => Err(ApiError::unauthorized(format!("Unknown user role: {}", other))),
        }
    }
}

/// Any signed-in caller
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Role);

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Role::from_header(req).map(Authenticated))
    }
}

/// Caller holding the admin role; viewers get 403
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl FromRequest for AdminOnly {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = Role::from_header(req).and_then(|role| match role {
            Role::Admin => Ok(AdminOnly),
            Role::Viewer => {
                tracing::warn!(path = %req.path(), "Viewer denied access to admin route");
                Err(ApiError::forbidden())
            }
        });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_role_parsing() {
        let req = TestRequest::default().insert_header((ROLE_HEADER, " Admin ")).to_http_request();
        assert_eq!(Role::from_header(&req).unwrap(), Role::Admin);

        let req = TestRequest::default().insert_header((ROLE_HEADER, "viewer")).to_http_request();
        assert_eq!(Role::from_header(&req).unwrap(), Role::Viewer);

        let req = TestRequest::default().insert_header((ROLE_HEADER, "guest")).to_http_request();
        assert!(Role::from_header(&req).is_err());

        let req = TestRequest::default().to_http_request();
        assert!(Role::from_header(&req).is_err());
    }
}
