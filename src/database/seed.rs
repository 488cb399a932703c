use tracing::info;

use super::models::{NewUser, User};
use super::store::{StoreError, TeaStore};
use crate::auth::{AuthError, Credentials};
use crate::schemas::TeaCreate;

/// Starter catalogue: (name, rating, in_stock)
pub const SEED_TEAS: &[(&str, i32, bool)] = &[
    ("chai", 4, true),
    ("earl grey", 3, false),
    ("matcha", 3, true),
    ("green tea", 5, true),
    ("black tea", 4, true),
    ("oolong", 4, false),
    ("hibiscus", 4, true),
    ("peppermint", 5, true),
    ("jasmine", 3, true),
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Owner account for the seeded teas
#[derive(Debug, Clone)]
pub struct SeedOwner {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SeedReport {
    pub owner: User,
    pub created: usize,
    pub skipped: usize,
}

/// Create the seed owner (or reuse it) and insert any seed tea that is not
/// already present.
pub async fn seed(
    store: &dyn TeaStore,
    credentials: &Credentials,
    owner: &SeedOwner,
) -> Result<SeedReport, SeedError> {
    let owner = match store.find_user_by_username(&owner.username).await? {
        Some(existing) => existing,
        None => {
            store
                .create_user(NewUser {
                    username: owner.username.clone(),
                    email: owner.email.clone(),
                    password_hash: credentials.hash_password(&owner.password)?,
                })
                .await?
        }
    };

    let mut created = 0;
    let mut skipped = 0;
    for (name, rating, in_stock) in SEED_TEAS {
        let tea = TeaCreate {
            name: (*name).to_string(),
            in_stock: *in_stock,
            rating: *rating,
        };
        match store.create_tea(owner.id, tea).await {
            Ok(_) => created += 1,
            Err(StoreError::Conflict(_)) => skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeded {} teas for '{}' ({} already present)", created, owner.username, skipped);
    Ok(SeedReport { owner, created, skipped })
}
