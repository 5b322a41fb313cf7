//! Account API client

use openapi_client::models::{RegisterRequest, TokenRequest, TokenResponse, UserOut};

use crate::authn::credential::Credential;
use crate::errors::StudioError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Create an account
    pub async fn register(&self, email: &str, password: &str) -> Result<UserOut, StudioError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/register", None, &body).await
    }

    /// Exchange email and password for a bearer credential
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, StudioError> {
        let form = TokenRequest {
            username: email.to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse = self.post_form("/auth/token", None, &form).await?;
        Ok(Credential::new(response.access_token))
    }
}
