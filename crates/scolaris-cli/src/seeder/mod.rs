//! Development data generation.
//!
//! Rows are generated in parallel with rayon, then written with multi-row
//! INSERTs inside a single transaction so a failed run leaves nothing behind.
//! Seeded rows carry markers ([`SEED_MARKER`], [`SEED_ROOM_PREFIX`],
//! [`SEED_EMAIL_DOMAIN`]) so `clear-seed` can find them again.

pub mod academic;
pub mod models;
pub mod rooms;
pub mod users;

use std::time::Instant;

use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use scolaris_core::hash_password;

pub use models::SeedConfig;

pub type SeedError = Box<dyn std::error::Error>;

pub const SEED_MARKER: &str = "[seed]";
pub const SEED_ROOM_PREFIX: &str = "SEED-";
pub const SEED_EMAIL_DOMAIN: &str = "seed.scolaris.dev";

const BATCH_SIZE: usize = 1000;

/// Inserts `rows` in chunks of [`BATCH_SIZE`] and returns the new ids in
/// input order. `head` is the statement before `VALUES`, e.g.
/// `INSERT INTO rooms (room_number, capacity) `.
pub(crate) async fn insert_returning_ids<T, F>(
    tx: &mut Transaction<'_, Postgres>,
    head: &str,
    rows: &[T],
    mut push_row: F,
) -> Result<Vec<Uuid>, SeedError>
where
    F: FnMut(Separated<'_, 'static, Postgres, &'static str>, &T),
{
    let mut ids = Vec::with_capacity(rows.len());

    for chunk in rows.chunks(BATCH_SIZE) {
        let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(head);
        builder.push_values(chunk, |b, row| push_row(b, row));
        builder.push(" RETURNING id");

        let chunk_ids: Vec<Uuid> = builder.build_query_scalar().fetch_all(&mut **tx).await?;
        ids.extend(chunk_ids);
    }

    Ok(ids)
}

async fn already_seeded(db: &PgPool) -> Result<bool, SeedError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM filieres WHERE description LIKE '%' || $1)",
    )
    .bind(SEED_MARKER)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), SeedError> {
    if already_seeded(db).await? {
        return Err("Seed data already present, run clear-seed first".into());
    }

    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} filieres, {} groupes, {} teachers and {} students...",
        config.filieres,
        config.total_groupes(),
        config.teachers,
        config.total_students()
    );

    // one hash shared by every seeded account
    let password_hash = hash_password(&config.password).map_err(|e| e.to_string())?;

    let mut tx = db.begin().await?;

    let filiere_ids = academic::seed_filieres(&mut tx, config.filieres).await?;
    let niveaux = academic::seed_niveaux(
        &mut tx,
        &filiere_ids,
        config.niveaux_per_filiere,
        &config.academic_year,
    )
    .await?;
    let groupes = academic::seed_groupes(&mut tx, &niveaux, config.groupes_per_niveau).await?;
    let module_count = academic::seed_modules(&mut tx, &niveaux, config.modules_per_niveau).await?;
    let room_count = rooms::seed_rooms(&mut tx, config.rooms).await?;
    let teacher_count = users::seed_teachers(&mut tx, config.teachers, &password_hash).await?;
    let student_count =
        users::seed_students(&mut tx, &groupes, config.students_per_groupe, &password_hash).await?;

    tx.commit().await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Filieres: {}", filiere_ids.len());
    println!("   Niveaux:  {}", niveaux.len());
    println!("   Groupes:  {}", groupes.len());
    println!("   Modules:  {}", module_count);
    println!("   Rooms:    {}", room_count);
    println!("   Teachers: {}", teacher_count);
    println!("   Students: {}", student_count);
    println!("   Password: {}", config.password);

    Ok(())
}

/// Removes everything `seed_all` created. Rows referencing seeded data
/// follow their foreign key rules.
pub async fn clear_all(db: &PgPool) -> Result<(), SeedError> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;
    let users = users::clear_users(&mut tx).await?;
    let rooms = rooms::clear_rooms(&mut tx).await?;
    let filieres = academic::clear_filieres(&mut tx).await?;
    tx.commit().await?;

    println!(
        "   ✓ Deleted {} users, {} rooms and {} filieres in {:?}",
        users,
        rooms,
        filieres,
        start_time.elapsed()
    );

    Ok(())
}
