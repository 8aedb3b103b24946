use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::auth::SessionEvent;
use crate::models::{AuthPayload, GoogleLoginRequest, LoginRequest, RegisterRequest, User, UserResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Account endpoints. Successful sign-ins store the returned token pair in
/// the session.
pub struct AuthService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl AuthService<'_> {
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.sign_in("/auth/login", &body).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.sign_in("/auth/register", request).await
    }

    /// Sign in with the ID token issued by Google.
    pub async fn google(&self, credential: &str) -> Result<User, ApiError> {
        let body = GoogleLoginRequest {
            credential: credential.to_string(),
        };
        self.sign_in("/auth/google", &body).await
    }

    /// A 401 here means bad credentials, so the request never takes the
    /// refresh path.
    async fn sign_in<B: Serialize>(&self, path: &str, body: &B) -> Result<User, ApiError> {
        let request = ApiRequest::post(path).json(body)?.without_refresh();
        let payload: AuthPayload = self.client.request(request).await?;

        if payload.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Sign-in response has no access token".to_string(),
            ));
        }

        let session = self.client.session();
        if let Err(e) = session.store_tokens(&payload.token_pair()) {
            warn!(error = %e, "Failed to persist session tokens");
        }
        session.emit(SessionEvent::LoggedIn);
        info!(user = %payload.user.email, role = %payload.user.role, "Signed in");
        Ok(payload.user)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let response: UserResponse = self.client.get("/auth/me").await?;
        Ok(response.user)
    }

    /// Revoke the session server-side. Local tokens are cleared whatever the
    /// server answers.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let session = self.client.session();

        let result = if session.is_authenticated() {
            let body = LogoutRequest {
                refresh_token: session.refresh_token(),
            };
            let request = ApiRequest::post("/auth/logout").json(&body)?.without_refresh();
            match self.client.request::<Value>(request).await {
                Ok(_) => Ok(()),
                // Token already dead server-side
                Err(ApiError::Unauthorized(_)) => Ok(()),
                Err(e) => Err(e),
            }
        } else {
            debug!("No active session, skipping server logout");
            Ok(())
        };

        if let Err(e) = session.clear() {
            warn!(error = %e, "Failed to clear session tokens");
        }
        session.emit(SessionEvent::LoggedOut);
        result
    }
}
