use axum::extract::State;
use axum::response::Redirect;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::http::session::ShopperSession;
use crate::http::AppState;
use crate::repository::ProfileChanges;
use crate::Result;

const ACCOUNT_PAGE: &str = "/account";

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(max = 120))]
    pub fullname: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 60))]
    pub username: Option<String>,
    #[validate(length(max = 30))]
    pub contact: Option<String>,
    pub dob: Option<NaiveDate>,
    #[validate(length(max = 250))]
    pub address: Option<String>,
    #[validate(length(max = 80))]
    pub city: Option<String>,
    #[validate(length(max = 80))]
    pub state: Option<String>,
    #[validate(length(max = 80))]
    pub country: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProfileRequest {
    fn into_changes(self) -> Result<ProfileChanges> {
        self.validate()?;
        Ok(ProfileChanges {
            fullname: non_blank(self.fullname),
            email: self.email.trim().to_lowercase(),
            username: non_blank(self.username),
            contact: non_blank(self.contact),
            dob: self.dob,
            address: non_blank(self.address),
            city: non_blank(self.city),
            state: non_blank(self.state),
            country: non_blank(self.country),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PictureUpload {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
}

/// The session token is not tied to the email, so changing it keeps the shopper signed in.
pub async fn update_profile(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Json(req): Json<ProfileRequest>,
) -> Result<Redirect> {
    s.shoppers.update_profile(user.id, &req.into_changes()?).await?;
    Ok(Redirect::to(ACCOUNT_PAGE))
}

pub async fn update_picture(
    State(s): State<AppState>,
    ShopperSession(user): ShopperSession,
    Json(req): Json<PictureUpload>,
) -> Result<Redirect> {
    req.validate()?;
    s.shoppers.update_picture(user.id, req.filename.trim()).await?;
    Ok(Redirect::to(ACCOUNT_PAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorefrontError;
    use serde_json::{json, Value};

    fn request(body: Value) -> ProfileRequest { serde_json::from_value(body).unwrap() }

    #[test]
    fn test_profile_changes_trimmed() {
        let changes = request(json!({
            "fullname": " Asha Rao ",
            "email": "Asha@Example.com",
            "contact": "",
            "dob": "1994-03-07",
            "country": "India"
        }))
        .into_changes()
        .unwrap();
        assert_eq!(changes.fullname.as_deref(), Some("Asha Rao"));
        assert_eq!(changes.email, "asha@example.com");
        assert_eq!(changes.contact, None);
        assert_eq!(changes.dob, NaiveDate::from_ymd_opt(1994, 3, 7));
        assert_eq!(changes.country.as_deref(), Some("India"));
    }

    #[test]
    fn test_profile_rejects_bad_email() {
        let bad = request(json!({"email": "not-an-email"}));
        assert!(matches!(bad.into_changes(), Err(StorefrontError::Validation(_))));
        assert!(serde_json::from_value::<ProfileRequest>(json!({"email": "a@b.co", "dob": "07/03/1994"})).is_err());
    }

    #[test]
    fn test_picture_requires_filename() {
        let upload: PictureUpload = serde_json::from_value(json!({"filename": ""})).unwrap();
        assert!(upload.validate().is_err());
    }
}
