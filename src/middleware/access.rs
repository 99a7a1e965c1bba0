use axum::http::Method;

use crate::auth::Claims;

/// Who is making the request, as far as access control is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Member,
    Admin,
}

impl Principal {
    pub fn from_claims(claims: Option<&Claims>) -> Self {
        match claims {
            None => Principal::Anonymous,
            Some(claims) if claims.is_admin() => Principal::Admin,
            Some(_) => Principal::Member,
        }
    }
}

/// Which guarded area a request falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Public,
    Admin,
    AdminWriteApi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// No session on a protected page: go through sign-in, then come back
    SignIn { callback: String },
    /// Signed in without the admin role on an admin page
    RedirectToLogin,
    Unauthorized,
}

const PUBLIC_PREFIXES: &[&str] = &[
    "/health",
    "/catalog",
    "/about",
    "/contact",
    "/login",
    "/signup",
    "/api/auth",
];
const PUBLIC_READ_PREFIX: &str = "/api/products";

const ADMIN_PREFIXES: &[&str] = &["/dashboard", "/admin"];
const UPLOAD_PREFIX: &str = "/api/upload";

/// GET and HEAD; axum answers HEAD through the GET handler
fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// `path` is `prefix` itself or lies below it
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Two-stage access policy: a pre-authorization check that demands a session
/// outside the public routes, then a role table over the guarded areas.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn evaluate(&self, method: &Method, path: &str, principal: Principal) -> AccessDecision {
        if principal == Principal::Anonymous && !Self::is_pre_authorized(method, path) {
            return if under(path, "/api") {
                AccessDecision::Unauthorized
            } else {
                AccessDecision::SignIn {
                    callback: path.to_string(),
                }
            };
        }

        match (Self::classify(method, path), principal) {
            (None, _) | (Some(PathClass::Public), _) => AccessDecision::Allow,
            (Some(_), Principal::Admin) => AccessDecision::Allow,
            (Some(PathClass::Admin), _) => AccessDecision::RedirectToLogin,
            (Some(PathClass::AdminWriteApi), _) => AccessDecision::Unauthorized,
        }
    }

    /// Requests that may proceed without any session
    pub fn is_pre_authorized(method: &Method, path: &str) -> bool {
        path == "/"
            || PUBLIC_PREFIXES.iter().any(|prefix| under(path, prefix))
            || (is_read(method) && under(path, PUBLIC_READ_PREFIX))
    }

    /// Class of a request inside the guarded globs; `None` outside them
    pub fn classify(method: &Method, path: &str) -> Option<PathClass> {
        if ADMIN_PREFIXES.iter().any(|prefix| under(path, prefix)) {
            return Some(PathClass::Admin);
        }
        if under(path, UPLOAD_PREFIX) {
            return Some(PathClass::AdminWriteApi);
        }
        if under(path, PUBLIC_READ_PREFIX) {
            return Some(if is_read(method) {
                PathClass::Public
            } else {
                PathClass::AdminWriteApi
            });
        }
        None
    }
}
