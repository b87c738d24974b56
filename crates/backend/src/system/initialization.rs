use anyhow::Result;
use contracts::system::users::CreateUserDto;
use sea_orm::DatabaseConnection;

use crate::system::users::{repository, service};

/// Ensure admin user exists (create if table is empty)
pub async fn ensure_admin_user_exists(conn: &DatabaseConnection) -> Result<bool> {
    if repository::count_users(conn).await? > 0 {
        return Ok(false);
    }

    tracing::info!("No users found. Creating default admin user...");

    let admin_dto = CreateUserDto {
        username: "admin".to_string(),
        password: "admin".to_string(),
        full_name: Some("Administrator".to_string()),
        is_admin: true,
    };
    let admin_id = service::create(conn, admin_dto).await?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default admin user created!");
    tracing::warn!("  Username: admin");
    tracing::warn!("  Password: admin");
    tracing::warn!("  User ID: {}", admin_id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(true)
}
