use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{self, ROLE_USER},
        verification_token, User, UserModel, VerificationToken, VerificationTokenModel,
    },
    services::email::EmailService,
    utils::otp::{display_name_from_email, generate_otp_code},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr, TransactionTrait,
};

pub struct AuthService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, AuthConfig::from_env())
    }

    pub fn with_config(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Issue a fresh passcode for `email` and deliver it.
    /// Any earlier passcode for the same address stops working.
    pub async fn issue_otp(&self, email: &str, email_service: &EmailService) -> AppResult<String> {
        let email = normalize_email(email);
        let now = chrono::Utc::now().naive_utc();
        let token = self.create_verification_token(&email, now).await?;

        email_service
            .send_otp_email(&email, &token.token, self.config.otp_ttl.num_minutes())
            .await
            .map_err(|e| {
                tracing::error!("Failed to send OTP to {email}: {e:?}");
                AppError::ServerError(
                    "Failed to send verification code. Please try again.".to_string(),
                )
            })?;

        Ok(token.token)
    }

    /// Replace whatever token `email` had with a new one expiring `otp_ttl` after `now`.
    pub async fn create_verification_token(
        &self,
        email: &str,
        now: chrono::NaiveDateTime,
    ) -> AppResult<VerificationTokenModel> {
        let txn = self.db.begin().await?;

        VerificationToken::delete_many()
            .filter(verification_token::Column::Email.eq(email))
            .exec(&txn)
            .await?;

        let token = verification_token::ActiveModel {
            email: Set(email.to_string()),
            token: Set(generate_otp_code()),
            expires: Set(now + self.config.otp_ttl),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::debug!("Issued verification token for {email}");
        Ok(token)
    }

    /// Check a submitted passcode and return the (possibly new) user.
    pub async fn authorize(&self, email: &str, code: &str) -> AppResult<UserModel> {
        self.authorize_at(email, code, chrono::Utc::now().naive_utc())
            .await
    }

    /// `authorize` against an explicit clock. Every failure, storage errors
    /// included, comes back as `AppError::Unauthorized`.
    pub async fn authorize_at(
        &self,
        email: &str,
        code: &str,
        now: chrono::NaiveDateTime,
    ) -> AppResult<UserModel> {
        let email = normalize_email(email);

        self.consume_token(&email, code, now)
            .await
            .map_err(|e| match e {
                AppError::Unauthorized => e,
                other => {
                    tracing::error!("OTP verification for {email} failed: {other:?}");
                    AppError::Unauthorized
                }
            })
    }

    async fn consume_token(
        &self,
        email: &str,
        code: &str,
        now: chrono::NaiveDateTime,
    ) -> AppResult<UserModel> {
        let token = VerificationToken::find()
            .filter(verification_token::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                tracing::debug!("No verification token for {email}");
                AppError::Unauthorized
            })?;

        if token.is_expired_at(now) {
            tracing::debug!("Verification token for {email} expired at {}", token.expires);
            return Err(AppError::Unauthorized);
        }

        if token.token != code {
            tracing::debug!("Verification code mismatch for {email}");
            return Err(AppError::Unauthorized);
        }

        let user = self.find_or_create_user(email, now).await?;

        // A concurrent request may have consumed the same token first.
        let deleted = VerificationToken::delete_by_id(token.id)
            .exec(&self.db)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Look a user up by email, creating the account on first sign-in.
    pub async fn find_or_create_user(
        &self,
        email: &str,
        now: chrono::NaiveDateTime,
    ) -> AppResult<UserModel> {
        if let Some(user) = self.find_by_email(email).await? {
            return Ok(user);
        }

        let new_user = user::ActiveModel {
            email: Set(email.to_string()),
            name: Set(display_name_from_email(email)),
            image: Set(None),
            role: Set(ROLE_USER.to_string()),
            email_verified: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match new_user.insert(&self.db).await {
            Ok(user) => {
                tracing::info!("Provisioned user {} for {}", user.id, email);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => self
                .find_by_email(email)
                .await?
                .ok_or(AppError::Unauthorized),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserModel>> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
