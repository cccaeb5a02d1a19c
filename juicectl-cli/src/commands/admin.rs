//! admin-check - Inspect the administrator account and repair its role

use anyhow::{Context, Result};
use clap::Args;
use juicectl_core::models::User;
use juicectl_core::repos::{AdminCheck, UserRepo};
use juicectl_core::{with_database, Error, JuiceConfig};

use crate::ui;

#[derive(Args, Debug)]
pub struct AdminCheckArgs {
    /// Email of the administrator account (default: [admin] email in juicectl.toml)
    #[arg(long)]
    pub email: Option<String>,

    /// Report only; do not change the role
    #[arg(long)]
    pub no_fix: bool,
}

pub async fn run_admin_check(args: AdminCheckArgs, config: &JuiceConfig) -> Result<()> {
    let email = args
        .email
        .or_else(|| config.admin.email.clone())
        .ok_or_else(|| Error::config("admin email not set (pass --email or set [admin] email)"))?;

    let fix = !args.no_fix;
    let outcome = with_database(&config.database, |db| async move {
        UserRepo::new(db.pool()).check_admin(&email, fix).await
    })
    .await
    .context("admin check failed")?;

    println!("{}", render(&outcome));
    Ok(())
}

fn identity(user: &User) -> String {
    format!(
        "  id:    {}\n  name:  {}\n  email: {}\n  role:  {}",
        user.id, user.name, user.email, user.role
    )
}

fn render(outcome: &AdminCheck) -> String {
    match outcome {
        AdminCheck::NotFound => format!("{} Admin user NOT FOUND", ui::FAIL),
        AdminCheck::AlreadyAdmin(user) => {
            format!("{} Admin user found\n{}", ui::OK, identity(user))
        }
        AdminCheck::NeedsPromotion(user) => format!(
            "{} User found but role is '{}', not 'admin' (run without --no-fix to repair)\n{}",
            ui::WARN,
            user.role,
            identity(user)
        ),
        AdminCheck::Promoted { before, after } => format!(
            "{} User found with role '{}'\n{}\n{} Role updated to '{}'",
            ui::WARN,
            before.role,
            identity(before),
            ui::OK,
            after.role
        ),
    }
}
