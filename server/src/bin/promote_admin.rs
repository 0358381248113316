//! Grant the admin role to an existing account.
//!
//! Usage: `promote-admin <email>`
//!
//! Admins cannot be created through signup, so the first one is promoted
//! here, directly against the database.

use anyhow::{bail, Context, Result};
use parti_common::Role;

use parti_server::db;

#[tokio::main]
async fn main() -> Result<()> {
    let Some(email) = std::env::args().nth(1) else {
        bail!("Usage: promote-admin <email>");
    };

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = db::create_pool(&database_url, 1).await?;
    db::run_migrations(&pool).await?;

    match db::set_role_by_email(&pool, &email, Role::Admin).await? {
        Some(profile) => {
            println!("{email} is now admin (profile {})", profile.id);
            Ok(())
        }
        None => bail!("No account with email {email}"),
    }
}
