//! Teacher and student accounts.
//!
//! Seeded accounts are verified and active so they can log in right away.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::fr_fr::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use scolaris_models::roles::system_roles;

use super::models::{SeededGroupe, UserSeed};
use super::{SEED_EMAIL_DOMAIN, SeedError, insert_returning_ids};

/// Lowercase ASCII letters only, for the local part of an email address.
fn email_part(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn generate_user(
    role_id: Uuid,
    role_prefix: &str,
    index: usize,
    groupe: Option<SeededGroupe>,
    password_hash: &str,
) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    // the index keeps addresses unique when fake names repeat
    let email = format!(
        "{}.{}+{}{}@{}",
        email_part(&first_name),
        email_part(&last_name),
        role_prefix,
        index,
        SEED_EMAIL_DOMAIN
    );

    UserSeed {
        first_name,
        last_name,
        email,
        password_hash: password_hash.to_string(),
        role_id,
        groupe_id: groupe.map(|g| g.id),
        filiere_id: groupe.map(|g| g.filiere_id),
    }
}

pub fn generate_teachers(count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| generate_user(system_roles::TEACHER, "teacher", i, None, password_hash))
        .collect()
}

pub fn generate_students(
    groupes: &[SeededGroupe],
    per_groupe: usize,
    password_hash: &str,
) -> Vec<UserSeed> {
    groupes
        .par_iter()
        .enumerate()
        .flat_map_iter(|(groupe_idx, &groupe)| {
            (0..per_groupe).map(move |i| {
                generate_user(
                    system_roles::STUDENT,
                    "student",
                    groupe_idx * per_groupe + i,
                    Some(groupe),
                    password_hash,
                )
            })
        })
        .collect()
}

async fn insert_users(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<usize, SeedError> {
    let ids = insert_returning_ids(
        tx,
        "INSERT INTO users (first_name, last_name, email, password, role_id, groupe_id, filiere_id, email_verified) ",
        users,
        |mut b, u| {
            b.push_bind(u.first_name.clone())
                .push_bind(u.last_name.clone())
                .push_bind(u.email.clone())
                .push_bind(u.password_hash.clone())
                .push_bind(u.role_id)
                .push_bind(u.groupe_id)
                .push_bind(u.filiere_id)
                .push("TRUE");
        },
    )
    .await?;
    Ok(ids.len())
}

pub async fn seed_teachers(
    tx: &mut Transaction<'_, Postgres>,
    count: usize,
    password_hash: &str,
) -> Result<usize, SeedError> {
    let start_time = Instant::now();
    println!("👩‍🏫 Seeding {} teachers...", count);

    let teachers = generate_teachers(count, password_hash);
    let inserted = insert_users(tx, &teachers).await?;

    println!("   ✓ Inserted {} teachers in {:?}", inserted, start_time.elapsed());
    Ok(inserted)
}

pub async fn seed_students(
    tx: &mut Transaction<'_, Postgres>,
    groupes: &[SeededGroupe],
    per_groupe: usize,
    password_hash: &str,
) -> Result<usize, SeedError> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding {} students ({} per groupe)...",
        groupes.len() * per_groupe,
        per_groupe
    );

    let students = generate_students(groupes, per_groupe, password_hash);
    let inserted = insert_users(tx, &students).await?;

    println!("   ✓ Inserted {} students in {:?}", inserted, start_time.elapsed());
    Ok(inserted)
}

/// Only addresses on the seed domain are removed; accounts made with
/// `create-admin` or by tests never use it.
pub async fn clear_users(tx: &mut Transaction<'_, Postgres>) -> Result<u64, SeedError> {
    let deleted = sqlx::query("DELETE FROM users WHERE email LIKE '%@' || $1")
        .bind(SEED_EMAIL_DOMAIN)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_part_strips_accents_and_spaces() {
        assert_eq!(email_part("Héloïse"), "hlose");
        assert_eq!(email_part("De La Tour"), "delatour");
    }

    #[test]
    fn test_students_inherit_groupe_filiere() {
        let groupe = SeededGroupe {
            id: Uuid::new_v4(),
            filiere_id: Uuid::new_v4(),
        };
        let students = generate_students(&[groupe], 3, "hash");

        assert_eq!(students.len(), 3);
        assert!(students.iter().all(|s| s.groupe_id == Some(groupe.id)));
        assert!(students.iter().all(|s| s.filiere_id == Some(groupe.filiere_id)));
        assert!(students.iter().all(|s| s.role_id == system_roles::STUDENT));
        assert!(students[2].email.contains("+student2@"));
        assert!(students[0].email.ends_with(SEED_EMAIL_DOMAIN));
    }

    #[test]
    fn test_teachers_have_no_groupe() {
        let teachers = generate_teachers(2, "hash");

        assert!(teachers.iter().all(|t| t.groupe_id.is_none()));
        assert!(teachers.iter().all(|t| t.role_id == system_roles::TEACHER));
    }
}
