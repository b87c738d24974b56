use anyhow::{anyhow, Result};
use chrono::Utc;
use contracts::system::users::{CreateUserDto, User};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::system::auth::password;

/// Create a new user, returns its id
pub async fn create(conn: &DatabaseConnection, dto: CreateUserDto) -> Result<String> {
    let username = dto.username.trim();
    if username.is_empty() {
        return Err(anyhow!("Username cannot be empty"));
    }
    if repository::get_by_username(conn, username).await?.is_some() {
        return Err(anyhow!("Username already exists"));
    }

    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        full_name: dto.full_name,
        is_active: true,
        is_admin: dto.is_admin,
        created_at: Utc::now().to_rfc3339(),
        last_login_at: None,
    };
    repository::create_with_password(conn, &user, &password_hash).await?;

    Ok(user.id)
}

pub async fn get_by_id(conn: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    repository::get_by_id(conn, id).await
}

/// Verify user credentials (for login).
///
/// `Ok(None)` for an unknown user, an inactive user or a wrong password.
pub async fn verify_credentials(conn: &DatabaseConnection, username: &str, password: &str) -> Result<Option<User>> {
    let Some(user) = repository::get_by_username(conn, username).await? else {
        return Ok(None);
    };

    if !user.is_active {
        tracing::warn!("Login attempt for inactive user '{}'", username);
        return Ok(None);
    }

    let password_hash = repository::get_password_hash(conn, &user.id)
        .await?
        .ok_or_else(|| anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        return Ok(None);
    }

    if let Err(e) = repository::update_last_login(conn, &user.id).await {
        tracing::warn!("Failed to update last login for '{}': {}", username, e);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;

    fn dto(username: &str, password: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.to_string(),
            password: password.to_string(),
            full_name: Some("Marta Gómez".to_string()),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_login() {
        let conn = memory_connection().await;
        let id = create(&conn, dto("marta", "roble123")).await.unwrap();

        let user = verify_credentials(&conn, "marta", "roble123").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_active);

        let reloaded = get_by_id(&conn, &id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let conn = memory_connection().await;
        create(&conn, dto("marta", "roble123")).await.unwrap();

        assert!(verify_credentials(&conn, "marta", "pino").await.unwrap().is_none());
        assert!(verify_credentials(&conn, "juan", "roble123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let conn = memory_connection().await;
        create(&conn, dto("marta", "roble123")).await.unwrap();
        assert!(create(&conn, dto("marta", "otra1234")).await.is_err());
        assert_eq!(repository::count_users(&conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let conn = memory_connection().await;
        assert!(create(&conn, dto("marta", "abc")).await.is_err());
        assert!(create(&conn, dto("   ", "abcdef")).await.is_err());
    }
}
