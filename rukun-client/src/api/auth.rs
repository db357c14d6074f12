use crate::http::{CachePolicy, HttpClient};
use crate::realtime::{ConnectionState, WsManager};
use rukun_core::{
    ApiResponse, ApiResult, ForgotPasswordRequest, LoginRequest, LoginResponse,
    ResetPasswordRequest, User,
};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug)]
pub struct AuthApi<'a> {
    http: &'a HttpClient,
    ws: &'a WsManager,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(http: &'a HttpClient, ws: &'a WsManager) -> Self {
        Self { http, ws }
    }

    /// Sign in. On success the session is stored and the realtime socket
    /// (re)connects; a rejected login leaves the store untouched.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        let response: LoginResponse = self.http.post("/auth/login", Some(credentials)).await?;
        if self.store_session(&response) {
            self.ws.connect();
        }
        Ok(response)
    }

    /// Sign out. Local state is cleared even when the server call fails.
    pub async fn logout(&self) -> ApiResult<ApiResponse<()>> {
        let result = self.http.post::<ApiResponse<()>, ()>("/auth/logout", None).await;
        self.http.auth().clear_auth();
        self.ws.disconnect();
        self.http.clear_cache();
        info!("Signed out");
        result
    }

    pub async fn verify_token(&self) -> ApiResult<ApiResponse<User>> {
        self.http.get("/auth/verify", CachePolicy::NoCache).await
    }

    /// Exchange the current token for a fresh one and store it. A socket
    /// that is not disconnected reopens with the new token.
    pub async fn refresh_token(&self) -> ApiResult<LoginResponse> {
        let response: LoginResponse = self.http.post::<_, ()>("/auth/refresh", None).await?;
        if self.store_session(&response) && self.ws.state() != ConnectionState::Disconnected {
            self.ws.connect();
        }
        Ok(response)
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<ApiResponse<()>> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.http.post("/auth/forgot-password", Some(&body)).await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ApiResult<ApiResponse<()>> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
        };
        self.http.post("/auth/reset-password", Some(&body)).await
    }

    fn store_session(&self, response: &LoginResponse) -> bool {
        match response.session() {
            Some((token, user)) => {
                self.http.auth().set_auth(token, user.clone());
                info!(user_id = %user.id, "Signed in");
                true
            }
            None => {
                if response.success {
                    warn!("Login succeeded without a token or user");
                }
                false
            }
        }
    }
}
