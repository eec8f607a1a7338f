/// Organisor signup and credential checks

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{CrmService, Outcome, Redirect};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{CrmError, CrmResult};
use crate::identity::{AccountRole, Principal};
use crate::models::user::{CreateUser, User};

/// Organisor signup form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Signup {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,

    pub password: String,

    /// Defaults to the username
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Organisation name must be 1-255 characters"))]
    pub organisation_name: Option<String>,
}

impl CrmService {
    /// Registers an organisor together with a new organisation
    ///
    /// The organisation starts with the default categories.
    pub async fn signup(&self, form: Signup) -> CrmResult<Outcome<User>> {
        form.validate()?;
        validate_password_strength(&form.password)
            .map_err(|msg| CrmError::invalid("password", &msg))?;

        let username = form.username.trim().to_string();
        let organisation_name = form
            .organisation_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&username)
            .to_string();

        let account = CreateUser {
            email: form.email.trim().to_lowercase(),
            username,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            password_hash: hash_password(&form.password)?,
            role: AccountRole::Organisor,
        };

        let (user, organisation) = self
            .store
            .create_organisor(account, &organisation_name)
            .await?;

        info!(
            user_id = %user.id,
            organisation_id = %organisation.id,
            "Organisor signed up"
        );
        Ok(Outcome::new(user, Redirect::Login))
    }

    /// Checks an email/password pair
    ///
    /// `None` when the account doesn't exist or the password is wrong; the
    /// two cases are not distinguished.
    pub async fn authenticate(&self, email: &str, password: &str) -> CrmResult<Option<User>> {
        let Some(user) = self.store.find_user_by_email(email.trim()).await? else {
            debug!("Login for unknown email");
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login with wrong password");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Principal for an authenticated account, if it still has one
    pub async fn principal(&self, user_id: Uuid) -> CrmResult<Option<Principal>> {
        Ok(self.store.resolve_principal(user_id).await?)
    }
}
