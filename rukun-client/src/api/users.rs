use crate::http::{CachePolicy, HttpClient};
use crate::transport::MultipartForm;
use rukun_core::{
    ApiResponse, ApiResult, Attachment, AvatarUpload, ChangePasswordRequest, SwitchHouseRequest,
    User, UserPatch,
};

const NAMESPACE: &str = "/users";

#[derive(Clone, Copy, Debug)]
pub struct UsersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_profile(&self) -> ApiResult<ApiResponse<User>> {
        self.http.get("/users/profile", CachePolicy::Default).await
    }

    /// Update the signed-in user's profile and mirror the result into the
    /// session.
    pub async fn update_profile(&self, patch: &UserPatch) -> ApiResult<ApiResponse<User>> {
        let response: ApiResponse<User> = self.http.put("/users/profile", Some(patch)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        self.sync_session(&response);
        Ok(response)
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> ApiResult<ApiResponse<()>> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.http.put("/users/password", Some(&body)).await
    }

    pub async fn switch_house(&self, house_id: &str) -> ApiResult<ApiResponse<User>> {
        let body = SwitchHouseRequest {
            house_id: house_id.to_string(),
        };
        let response: ApiResponse<User> = self.http.post("/users/switch-house", Some(&body)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        self.sync_session(&response);
        Ok(response)
    }

    pub async fn upload_avatar(&self, file: Attachment) -> ApiResult<ApiResponse<AvatarUpload>> {
        let form = MultipartForm::new().file("avatar", file);
        let response = self.http.upload("/users/avatar", form).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    fn sync_session(&self, response: &ApiResponse<User>) {
        if let (true, Some(user)) = (response.success, &response.data) {
            self.http.auth().update_user(&UserPatch::from(user.clone()));
        }
    }
}
