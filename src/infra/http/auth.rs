//! Account flows against `/auth/*` and `/profiles/me`.
//!
//! Sign-in flows write the returned token pair and a best-effort identity
//! into the credential store. Everything goes through
//! [`ApiClient::dispatch`]; `reset_password` and `load_profile` are the
//! authenticated ones.

use bridgeus_api_types::{
    CodePurpose, ForgotPasswordRequest, LoginRequest, LogoutRequest, ProfileResponse,
    RegisterRequest, ResetPasswordRequest, SendEmailCodeRequest, SendEmailCodeResponse, StatusResponse,
    TokenResponse,
};
use tracing::{info, warn};

use crate::domain::credentials::{Language, UserIdentity};

use super::{client::ApiClient, error::ClientError, jwt, options::RequestOptions};

pub async fn send_email_code(
    client: &ApiClient,
    email: &str,
    purpose: CodePurpose,
) -> Result<SendEmailCodeResponse, ClientError> {
    let payload = SendEmailCodeRequest {
        email: email.to_string(),
        purpose,
    };
    client
        .dispatch(
            "/auth/send-code",
            RequestOptions::post().without_auth().json(&payload)?,
        )
        .await
}

pub async fn register(
    client: &ApiClient,
    email: &str,
    password: &str,
    display_name: &str,
    code: &str,
) -> Result<UserIdentity, ClientError> {
    let payload = RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        display_name: display_name.to_string(),
        code: code.to_string(),
    };
    let tokens: TokenResponse = client
        .dispatch(
            "/auth/register",
            RequestOptions::post().without_auth().json(&payload)?,
        )
        .await?;

    let identity = UserIdentity::new(email)
        .with_display_name(display_name)
        .with_user_id(jwt::subject(&tokens.access_token));
    sign_in(client, tokens, identity.clone());
    Ok(identity)
}

pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<UserIdentity, ClientError> {
    let payload = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let tokens: TokenResponse = client
        .dispatch(
            "/auth/login",
            RequestOptions::post().without_auth().json(&payload)?,
        )
        .await?;

    let identity = UserIdentity::new(email)
        .with_display_name(email_local_part(email))
        .with_user_id(jwt::subject(&tokens.access_token));
    sign_in(client, tokens, identity.clone());
    Ok(identity)
}

/// Revoke the refresh token and clear the local session. The session is
/// cleared even when the revocation call fails; that failure is still
/// returned.
pub async fn logout(client: &ApiClient) -> Result<(), ClientError> {
    let outcome = match client.store().refresh_token() {
        Some(refresh_token) => {
            let options = RequestOptions::post()
                .without_auth()
                .json(&LogoutRequest { refresh_token })?;
            client
                .dispatch::<StatusResponse>("/auth/logout", options)
                .await
                .map(|_| ())
        }
        None => Ok(()),
    };

    client.store().clear();
    match &outcome {
        Ok(()) => info!("signed out"),
        Err(err) => warn!(
            target = "bridgeus::infra::http::auth",
            error = %err,
            "logout request failed; local session cleared anyway"
        ),
    }
    outcome
}

pub async fn forgot_password(
    client: &ApiClient,
    email: &str,
    code: &str,
    new_password: &str,
) -> Result<StatusResponse, ClientError> {
    let payload = ForgotPasswordRequest {
        email: email.to_string(),
        code: code.to_string(),
        new_password: new_password.to_string(),
    };
    client
        .dispatch(
            "/auth/forgot-password",
            RequestOptions::post().without_auth().json(&payload)?,
        )
        .await
}

pub async fn reset_password(
    client: &ApiClient,
    current_password: &str,
    new_password: &str,
) -> Result<StatusResponse, ClientError> {
    let payload = ResetPasswordRequest {
        current_password: current_password.to_string(),
        new_password: new_password.to_string(),
    };
    client
        .dispatch("/auth/reset-password", RequestOptions::post().json(&payload)?)
        .await
}

/// Fetch the signed-in user's profile and fold its display name, language
/// and id into the stored identity. Returns `None` when no identity is held.
pub async fn load_profile(client: &ApiClient) -> Result<Option<UserIdentity>, ClientError> {
    let profile: ProfileResponse = client
        .dispatch("/profiles/me", RequestOptions::get())
        .await?;

    let Some(mut identity) = client.store().current().identity else {
        return Ok(None);
    };
    if let Some(name) = profile.display_name.filter(|name| !name.is_empty()) {
        identity.display_name = Some(name);
    }
    if let Some(language) = profile
        .language_preference
        .as_deref()
        .and_then(Language::from_code)
    {
        identity.language_preference = Some(language);
    }
    if identity.user_id.is_none() {
        identity.user_id = Some(profile.user_id);
    }

    client.store().set_identity(identity.clone());
    Ok(Some(identity))
}

fn sign_in(client: &ApiClient, tokens: TokenResponse, identity: UserIdentity) {
    let store = client.store();
    store.set(tokens.access_token, tokens.refresh_token);
    store.set_identity(identity);
    info!("signed in");
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_part_is_text_before_at() {
        assert_eq!(email_local_part("ada@example.com"), "ada");
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
        assert_eq!(email_local_part("@example.com"), "");
    }
}
