use argon2::password_hash::{ SaltString, rand_core::OsRng };
use argon2::{ Argon2, PasswordHash, PasswordHasher, PasswordVerifier };
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::db::entity::user;
use crate::error::{ AppError, Result };

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new account. The email must not already be registered.
    pub async fn register(
        &self,
        email: String,
        password: String,
        name: Option<String>
    ) -> Result<user::Model> {
        let existing = user::Entity
            ::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db).await?;

        if existing.is_some() {
            return Err(AppError::EmailTaken);
        }

        let password_hash = hash_password(&password)?;
        let now = Utc::now();

        let account = user::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            name: ActiveValue::Set(name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account)
    }

    /// Verify credentials and return the account.
    /// A missing user and a bad password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<user::Model> {
        let account = user::Entity
            ::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db).await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(account)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>> {
        let account = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(account)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e|
        AppError::Internal(format!("Invalid password hash: {}", e))
    )?;

    let argon2 = Argon2::default();
    Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
}
