use crate::entities::account_entity as accounts;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<accounts::Model>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.pool)
            .await?;
        Ok(account)
    }

    fn issue_tokens(&self, account: accounts::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(account.user_id, &account.email)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(account.user_id, &account.email)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: AccountResponse::from(account),
        })
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        if request.full_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Full name must not be empty".to_string(),
            ));
        }

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let account = accounts::ActiveModel {
            user_id: Set(Uuid::new_v4()),
            full_name: Set(request.full_name),
            email: Set(email),
            password_hash: Set(password_hash),
            phone: Set(request.phone),
            address: Set(request.address),
            city: Set(request.city),
            country: Set(request.country),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Account created for user {}", account.user_id);
        self.issue_tokens(account)
    }

    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);

        let account = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &account.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid email or password".to_string(),
            ));
        }

        self.issue_tokens(account)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let account = accounts::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        self.issue_tokens(account)
    }

    /// Generate a short-lived reset token. Delivery of the reset link is an
    /// external concern; the token is logged for the notification pipeline.
    pub async fn send_password_reset(&self, email: &str) -> AppResult<ForgotPasswordResponse> {
        let email = normalize_email(email);

        let account = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let reset_token = self
            .jwt_service
            .generate_reset_token(account.user_id, &account.email)?;

        log::info!("Password reset requested for user {}", account.user_id);

        Ok(ForgotPasswordResponse {
            reset_token,
            expires_in: self.jwt_service.get_reset_token_expires_in(),
        })
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()> {
        let claims = self.jwt_service.verify_reset_token(&request.token)?;
        let user_id = claims.user_id()?;

        validate_password(&request.new_password)?;

        let account = accounts::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let mut model = account.into_active_model();
        model.password_hash = Set(hash_password(&request.new_password)?);
        model.updated_at = Set(Some(Utc::now()));
        model.update(&self.pool).await?;

        log::info!("Password reset completed for user {user_id}");
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        validate_password(&request.new_password)?;

        let account = accounts::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        if !verify_password(&request.current_password, &account.password_hash)? {
            return Err(AppError::AuthError(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut model = account.into_active_model();
        model.password_hash = Set(hash_password(&request.new_password)?);
        model.updated_at = Set(Some(Utc::now()));
        model.update(&self.pool).await?;

        Ok(())
    }
}
