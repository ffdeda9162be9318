//! Startup seeding for the in-memory stores

use anyhow::Result;
use roster_auth::hash_password;
use roster_store::{AccountStore, NewAccount, NewEmployeeRecord, RecordStore, Role};
use tracing::info;

/// Create the default admin account when no accounts exist yet
pub async fn seed_admin(accounts: &dyn AccountStore) -> Result<()> {
    if !accounts.is_empty().await? {
        return Ok(());
    }

    let password_hash = hash_password("admin123")?;
    accounts
        .create(NewAccount {
            username: "admin".to_string(),
            email: "admin@roster.local".to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    info!("Default admin account created (username: admin, password: admin123)");
    Ok(())
}

/// Seed the demo fixture: two user accounts and five employee records
pub async fn seed_demo(accounts: &dyn AccountStore, records: &dyn RecordStore) -> Result<()> {
    let user1 = accounts
        .create(NewAccount {
            username: "user1".to_string(),
            email: "user1@roster.local".to_string(),
            password_hash: hash_password("user123")?,
            role: Role::User,
        })
        .await?;
    let user2 = accounts
        .create(NewAccount {
            username: "user2".to_string(),
            email: "user2@roster.local".to_string(),
            password_hash: hash_password("user123")?,
            role: Role::User,
        })
        .await?;

    let fixture = [
        ("Mario", "Rossi", "mario.rossi@email.com", "1985-03-15", "Roma", "Milano", "attestato_mario.pdf", &user1.id),
        ("Giulia", "Bianchi", "giulia.bianchi@email.com", "1990-07-22", "Napoli", "Torino", "attestato_giulia.pdf", &user1.id),
        ("Luca", "Verdi", "luca.verdi@email.com", "1988-11-08", "Firenze", "Bologna", "attestato_luca.pdf", &user2.id),
        ("Anna", "Neri", "anna.neri@email.com", "1992-01-30", "Venezia", "Genova", "attestato_anna.pdf", &user2.id),
        ("Paolo", "Blu", "paolo.blu@email.com", "1987-05-12", "Palermo", "Catania", "attestato_paolo.pdf", &user1.id),
    ];

    for (first, last, email, born, place, residence, certificate, owner) in fixture {
        records
            .create(NewEmployeeRecord {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
                owner_account_id: owner.clone(),
                date_of_birth: born.parse()?,
                place_of_birth: place.to_string(),
                residence: residence.to_string(),
                certificate_file_name: Some(certificate.to_string()),
            })
            .await?;
    }

    info!("Seeded {} demo accounts and {} demo records", 2, fixture.len());
    Ok(())
}
