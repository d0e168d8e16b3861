use tracing::info;

use crate::{repository::UserRepository, service::auth::hash_password, Result};

/// Fixed development accounts inserted at first boot.
const DEFAULT_USERS: &[(&str, &str)] = &[
    ("test", "test1234"),
    ("demo", "demo1234"),
    ("guest", "guestpass"),
    ("sample", "sample1234"),
];

/// Insert each default user if and only if no row exists for that
/// username. Existing accounts, including ones with changed passwords,
/// are left alone.
pub async fn seed_default_users(users: &UserRepository) -> Result<()> {
    for (username, password) in DEFAULT_USERS {
        if users.username_exists(username).await? {
            continue;
        }
        let (hash, salt) = hash_password(password).await?;
        users.upsert(username, &hash, &salt).await?;
        info!("Created default user '{username}'");
    }
    Ok(())
}
