//! Classrooms, labs and amphitheatres.

use std::time::Instant;

use rayon::prelude::*;
use sqlx::{Postgres, Transaction};

use super::models::RoomSeed;
use super::{SEED_ROOM_PREFIX, SeedError, insert_returning_ids};

/// (room type, capacity, facility); rooms cycle through these.
const ROOM_KINDS: [(&str, i32, &str); 3] = [
    ("Salle de cours", 40, "Projecteur, tableau blanc"),
    ("Laboratoire", 24, "Postes informatiques"),
    ("Amphitheatre", 150, "Sonorisation, projecteur"),
];

pub fn generate_rooms(count: usize) -> Vec<RoomSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let (room_type, capacity, facility) = ROOM_KINDS[i % ROOM_KINDS.len()];
            let bloc = (b'A' + (i / 100 % 26) as u8) as char;
            RoomSeed {
                room_number: format!("{}{}{:02}", SEED_ROOM_PREFIX, bloc, i % 100 + 1),
                capacity,
                room_type: room_type.to_string(),
                facility: facility.to_string(),
            }
        })
        .collect()
}

pub async fn seed_rooms(tx: &mut Transaction<'_, Postgres>, count: usize) -> Result<usize, SeedError> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} rooms...", count);

    let rooms = generate_rooms(count);
    let ids = insert_returning_ids(
        tx,
        "INSERT INTO rooms (room_number, capacity, room_type, facility) ",
        &rooms,
        |mut b, r| {
            b.push_bind(r.room_number.clone())
                .push_bind(r.capacity)
                .push_bind(r.room_type.clone())
                .push_bind(r.facility.clone());
        },
    )
    .await?;

    println!("   ✓ Inserted {} rooms in {:?}", ids.len(), start_time.elapsed());
    Ok(ids.len())
}

pub async fn clear_rooms(tx: &mut Transaction<'_, Postgres>) -> Result<u64, SeedError> {
    let deleted = sqlx::query("DELETE FROM rooms WHERE room_number LIKE $1 || '%'")
        .bind(SEED_ROOM_PREFIX)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    Ok(deleted)
}
