//! User repository
//!
//! Lookup by email and the admin-role repair.

use sqlx::PgPool;
use tracing::{debug, info};

use crate::models::{Role, User};
use crate::Result;

/// Outcome of inspecting (and possibly repairing) an admin account
#[derive(Debug, Clone)]
pub enum AdminCheck {
    /// No user has this email; nothing was changed
    NotFound,
    AlreadyAdmin(User),
    /// Role was wrong and has been set to admin
    Promoted { before: User, after: User },
    /// Role is wrong but fixing was not requested
    NeedsPromotion(User),
}

pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Set the role and return the updated row.
    ///
    /// Returns `None` when the id no longer exists.
    pub async fn set_role(&self, id: i32, role: Role) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, role, created_at
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Inspect the account for `email` and, when `fix` is set, promote it to admin.
    pub async fn check_admin(&self, email: &str, fix: bool) -> Result<AdminCheck> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!(email, "no user with this email");
            return Ok(AdminCheck::NotFound);
        };

        if user.is_admin() {
            return Ok(AdminCheck::AlreadyAdmin(user));
        }
        if !fix {
            return Ok(AdminCheck::NeedsPromotion(user));
        }

        info!(user_id = user.id, from = %user.role, "promoting user to admin");
        match self.set_role(user.id, Role::Admin).await? {
            Some(after) => Ok(AdminCheck::Promoted {
                before: user,
                after,
            }),
            // Deleted between the lookup and the update
            None => Ok(AdminCheck::NotFound),
        }
    }
}
