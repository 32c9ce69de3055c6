use crate::{
    access::{Actor, Identity},
    error::{AppError, AppResult},
    models::{session, user, Session, User, UserModel},
    state::AppState,
    utils::{CredentialStore, TokenCodec},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Registration, login and logout, plus turning a presented token back into an actor.
pub struct SessionService {
    db: DatabaseConnection,
    credentials: CredentialStore,
    tokens: TokenCodec,
}

impl SessionService {
    pub fn new(db: DatabaseConnection, credentials: CredentialStore, tokens: TokenCodec) -> Self {
        Self {
            db,
            credentials,
            tokens,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.credentials.clone(),
            state.tokens.clone(),
        )
    }

    /// Register a new, non-admin user. Nobody is logged in as a side effect.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<UserModel> {
        // Check if username or email already exists
        if self.user_exists(username, email).await? {
            return Err(AppError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = self.credentials.hash(password)?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            username: sea_orm::ActiveValue::Set(username.to_string()),
            email: sea_orm::ActiveValue::Set(email.to_string()),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            is_admin: sea_orm::ActiveValue::Set(false),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        // A concurrent registration can still win the race; the unique index turns
        // that into a Conflict as well.
        let user = new_user.insert(&self.db).await.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("Username or email already exists".to_string())
            }
            other => other,
        })?;

        tracing::info!(user_id = user.id, "Registered new user");
        Ok(user)
    }

    /// Log in by username or email.
    /// Returns (user_model, session_token)
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<(UserModel, String)> {
        let Some(user) = self.find_by_username_or_email(identifier).await? else {
            self.credentials.verify_decoy(password);
            return Err(AppError::Unauthorized);
        };

        if !self.credentials.verify(password, &user.password_hash) {
            tracing::debug!(user_id = user.id, "Password verification failed");
            return Err(AppError::Unauthorized);
        }

        self.prune_expired_sessions(user.id).await?;
        let token = self.open_session(user.id).await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok((user, token))
    }

    /// End the session behind `token`, if there is one. Always succeeds.
    pub async fn logout(&self, token: Option<&str>) -> AppResult<()> {
        let Some(claims) = token.and_then(|t| self.tokens.decode(t).ok()) else {
            return Ok(());
        };

        let result = Session::delete_by_id(claims.sid).exec(&self.db).await?;
        if result.rows_affected > 0 {
            tracing::info!(user_id = %claims.sub, "User logged out");
        }
        Ok(())
    }

    /// Map a presented token to the actor it identifies. Anything short of a valid
    /// signature, a live session row and an existing user is anonymous.
    pub async fn resolve(&self, token: &str) -> AppResult<Actor> {
        let claims = match self.tokens.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Ignoring session token: {e}");
                return Ok(Actor::Anonymous);
            }
        };

        let Ok(user_id) = claims.sub.parse::<i32>() else {
            return Ok(Actor::Anonymous);
        };

        let Some(session) = Session::find_by_id(claims.sid).one(&self.db).await? else {
            return Ok(Actor::Anonymous);
        };

        if session.user_id != user_id {
            return Ok(Actor::Anonymous);
        }

        if session.expires_at <= chrono::Utc::now().naive_utc() {
            Session::delete_by_id(session.id).exec(&self.db).await?;
            return Ok(Actor::Anonymous);
        }

        let Some(user) = User::find_by_id(user_id).one(&self.db).await? else {
            return Ok(Actor::Anonymous);
        };

        Ok(Actor::User(Identity {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }))
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Check if user exists by username or email
    async fn user_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(
                sea_orm::Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> AppResult<Option<UserModel>> {
        let by_username = User::find()
            .filter(user::Column::Username.eq(identifier))
            .one(&self.db)
            .await?;
        if by_username.is_some() {
            return Ok(by_username);
        }

        let by_email = User::find()
            .filter(user::Column::Email.eq(identifier))
            .one(&self.db)
            .await?;
        Ok(by_email)
    }

    async fn open_session(&self, user_id: i32) -> AppResult<String> {
        let now = chrono::Utc::now().naive_utc();
        let expires_at = now + chrono::Duration::seconds(self.tokens.ttl_seconds() as i64);
        let session_id = uuid::Uuid::new_v4().to_string();

        let model = session::ActiveModel {
            id: sea_orm::ActiveValue::Set(session_id.clone()),
            user_id: sea_orm::ActiveValue::Set(user_id),
            created_at: sea_orm::ActiveValue::Set(now),
            expires_at: sea_orm::ActiveValue::Set(expires_at),
        };
        model.insert(&self.db).await?;

        let token = self.tokens.encode(user_id, &session_id)?;
        Ok(token)
    }

    async fn prune_expired_sessions(&self, user_id: i32) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        Session::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
