//! Session cookies. Shoppers and the store owner are two separate realms,
//! each with its own cookie, account table and login page.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::http::AppState;
use crate::repository::{OwnerAccount, ShopperProfile};

pub const SHOPPER_COOKIE: &str = "token";
pub const OWNER_COOKIE: &str = "ownerToken";

#[derive(Debug, Clone, Copy)]
pub enum Realm {
    Shopper,
    Owner,
}

impl Realm {
    pub fn cookie(&self) -> &'static str {
        match self {
            Self::Shopper => SHOPPER_COOKIE,
            Self::Owner => OWNER_COOKIE,
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Self::Shopper => "/login",
            Self::Owner => "/owners/login",
        }
    }

    fn token(&self, parts: &Parts) -> Option<String> {
        CookieJar::from_headers(&parts.headers)
            .get(self.cookie())
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Clears the realm cookie and sends the client to `to`.
    pub fn sign_out(&self, jar: CookieJar, to: &'static str) -> (CookieJar, Redirect) {
        (jar.remove(Cookie::from(self.cookie())), Redirect::to(to))
    }

    fn reject(&self, parts: &Parts) -> Response {
        self.sign_out(CookieJar::from_headers(&parts.headers), self.login_path()).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct ShopperSession(pub ShopperProfile);

#[derive(Debug, Clone)]
pub struct OwnerSession(pub OwnerAccount);

#[async_trait]
impl FromRequestParts<AppState> for ShopperSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let realm = Realm::Shopper;
        let token = realm.token(parts).ok_or_else(|| realm.reject(parts))?;
        match state.shoppers.find_by_session(&token).await {
            Ok(Some(shopper)) => Ok(Self(shopper)),
            Ok(None) => {
                tracing::debug!("unknown shopper session");
                Err(realm.reject(parts))
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OwnerSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let realm = Realm::Owner;
        let token = realm.token(parts).ok_or_else(|| realm.reject(parts))?;
        match state.owners.find_by_session(&token).await {
            Ok(Some(owner)) => Ok(Self(owner)),
            Ok(None) => {
                tracing::debug!("unknown owner session");
                Err(realm.reject(parts))
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request, StatusCode};

    #[test]
    fn test_realms_use_separate_cookies() {
        let (parts, _) = Request::builder()
            .header(header::COOKIE, "token=abc; ownerToken=")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(Realm::Shopper.token(&parts).as_deref(), Some("abc"));
        assert_eq!(Realm::Owner.token(&parts), None);
    }

    #[test]
    fn test_rejection_clears_cookie_and_redirects() {
        let (parts, _) = Request::builder()
            .header(header::COOKIE, "ownerToken=stale")
            .body(())
            .unwrap()
            .into_parts();
        let response = Realm::Owner.reject(&parts);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/owners/login");
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("ownerToken="));
    }
}
