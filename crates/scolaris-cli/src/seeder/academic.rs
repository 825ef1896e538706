//! Filieres, niveaux, groupes and modules.

use std::time::Instant;

use rayon::prelude::*;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::models::{
    FiliereSeed, GroupeSeed, ModuleSeed, NiveauSeed, SeededGroupe, SeededNiveau,
};
use super::{SEED_MARKER, SeedError, insert_returning_ids};

const FILIERE_NAMES: [&str; 8] = [
    "Genie Informatique",
    "Genie Civil",
    "Genie Electrique",
    "Genie Industriel",
    "Finance et Comptabilite",
    "Marketing Digital",
    "Reseaux et Telecoms",
    "Data Science",
];

const MODULE_SUBJECTS: [&str; 10] = [
    "Mathematiques",
    "Algorithmique",
    "Programmation",
    "Bases de donnees",
    "Reseaux",
    "Anglais",
    "Communication",
    "Gestion de projet",
    "Statistiques",
    "Systemes d'exploitation",
];

/// Credits a niveau requires, spread over its modules.
const CREDITS_PER_NIVEAU: i32 = 60;

fn nth_name(names: &[&str], i: usize) -> String {
    match names.get(i) {
        Some(name) => (*name).to_string(),
        None => format!("{} {}", names[i % names.len()], i / names.len() + 1),
    }
}

pub fn generate_filieres(count: usize) -> Vec<FiliereSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let name = nth_name(&FILIERE_NAMES, i);
            FiliereSeed {
                description: format!("Filiere {} {}", name, SEED_MARKER),
                name,
            }
        })
        .collect()
}

pub fn generate_niveaux(
    filiere_ids: &[Uuid],
    per_filiere: usize,
    academic_year: &str,
) -> Vec<NiveauSeed> {
    filiere_ids
        .par_iter()
        .flat_map_iter(|&filiere_id| {
            (0..per_filiere).map(move |i| NiveauSeed {
                name: format!("{}A", i + 1),
                filiere_id,
                academic_year: academic_year.to_string(),
                credits_required: CREDITS_PER_NIVEAU,
            })
        })
        .collect()
}

pub fn generate_groupes(niveaux: &[SeededNiveau], per_niveau: usize) -> Vec<GroupeSeed> {
    niveaux
        .par_iter()
        .flat_map_iter(|niveau| {
            (0..per_niveau).map(move |i| GroupeSeed {
                groupe_name: format!("G{}", i + 1),
                niveau_id: niveau.id,
            })
        })
        .collect()
}

/// Module titles are unique across the school, so each one carries the
/// position of its niveau.
pub fn generate_modules(niveaux: &[SeededNiveau], per_niveau: usize) -> Vec<ModuleSeed> {
    let credits = CREDITS_PER_NIVEAU / per_niveau.max(1) as i32;

    niveaux
        .par_iter()
        .enumerate()
        .flat_map_iter(|(niveau_idx, niveau)| {
            (0..per_niveau).map(move |i| ModuleSeed {
                title: format!("{} N{}", nth_name(&MODULE_SUBJECTS, i), niveau_idx + 1),
                credits: credits.max(1),
                credit_required: credits.max(1) / 2,
                niveau_id: niveau.id,
                filiere_id: niveau.filiere_id,
            })
        })
        .collect()
}

pub async fn seed_filieres(
    tx: &mut Transaction<'_, Postgres>,
    count: usize,
) -> Result<Vec<Uuid>, SeedError> {
    let start_time = Instant::now();
    println!("📚 Seeding {} filieres...", count);

    let filieres = generate_filieres(count);
    let ids = insert_returning_ids(
        tx,
        "INSERT INTO filieres (name, description) ",
        &filieres,
        |mut b, f| {
            b.push_bind(f.name.clone()).push_bind(f.description.clone());
        },
    )
    .await?;

    println!("   ✓ Inserted {} filieres in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

pub async fn seed_niveaux(
    tx: &mut Transaction<'_, Postgres>,
    filiere_ids: &[Uuid],
    per_filiere: usize,
    academic_year: &str,
) -> Result<Vec<SeededNiveau>, SeedError> {
    let niveaux = generate_niveaux(filiere_ids, per_filiere, academic_year);
    let ids = insert_returning_ids(
        tx,
        "INSERT INTO niveaux (name, filiere_id, academic_year, credits_required) ",
        &niveaux,
        |mut b, n| {
            b.push_bind(n.name.clone())
                .push_bind(n.filiere_id)
                .push_bind(n.academic_year.clone())
                .push_bind(n.credits_required);
        },
    )
    .await?;

    println!("   ✓ Inserted {} niveaux", ids.len());
    Ok(ids
        .into_iter()
        .zip(&niveaux)
        .map(|(id, n)| SeededNiveau {
            id,
            filiere_id: n.filiere_id,
        })
        .collect())
}

pub async fn seed_groupes(
    tx: &mut Transaction<'_, Postgres>,
    niveaux: &[SeededNiveau],
    per_niveau: usize,
) -> Result<Vec<SeededGroupe>, SeedError> {
    let groupes = generate_groupes(niveaux, per_niveau);
    let ids = insert_returning_ids(
        tx,
        "INSERT INTO groupes (groupe_name, niveau_id) ",
        &groupes,
        |mut b, g| {
            b.push_bind(g.groupe_name.clone()).push_bind(g.niveau_id);
        },
    )
    .await?;

    println!("   ✓ Inserted {} groupes", ids.len());

    // generation preserves niveau order, per_niveau groupes each
    let filiere_of = |i: usize| niveaux[i / per_niveau.max(1)].filiere_id;
    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(i, id)| SeededGroupe {
            id,
            filiere_id: filiere_of(i),
        })
        .collect())
}

pub async fn seed_modules(
    tx: &mut Transaction<'_, Postgres>,
    niveaux: &[SeededNiveau],
    per_niveau: usize,
) -> Result<usize, SeedError> {
    let modules = generate_modules(niveaux, per_niveau);
    let ids = insert_returning_ids(
        tx,
        "INSERT INTO modules (title, credits, credit_required, niveau_id, filiere_id) ",
        &modules,
        |mut b, m| {
            b.push_bind(m.title.clone())
                .push_bind(m.credits)
                .push_bind(m.credit_required)
                .push_bind(m.niveau_id)
                .push_bind(m.filiere_id);
        },
    )
    .await?;

    println!("   ✓ Inserted {} modules", ids.len());
    Ok(ids.len())
}

/// Niveaux, groupes and modules cascade from their filiere.
pub async fn clear_filieres(tx: &mut Transaction<'_, Postgres>) -> Result<u64, SeedError> {
    let deleted = sqlx::query("DELETE FROM filieres WHERE description LIKE '%' || $1")
        .bind(SEED_MARKER)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filiere_names_stay_unique_past_the_list() {
        let filieres = generate_filieres(FILIERE_NAMES.len() + 2);
        let mut names: Vec<_> = filieres.iter().map(|f| f.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FILIERE_NAMES.len() + 2);
        assert!(filieres.iter().all(|f| f.description.ends_with(SEED_MARKER)));
    }

    #[test]
    fn test_module_credits_fit_the_niveau() {
        let niveaux = [SeededNiveau {
            id: Uuid::new_v4(),
            filiere_id: Uuid::new_v4(),
        }];
        let modules = generate_modules(&niveaux, 6);

        assert_eq!(modules.len(), 6);
        assert_eq!(modules.iter().map(|m| m.credits).sum::<i32>(), 60);
        assert!(modules.iter().all(|m| m.credit_required <= m.credits));
    }

    #[test]
    fn test_groupes_follow_niveau_order() {
        let niveaux: Vec<_> = (0..3)
            .map(|_| SeededNiveau {
                id: Uuid::new_v4(),
                filiere_id: Uuid::new_v4(),
            })
            .collect();
        let groupes = generate_groupes(&niveaux, 2);

        assert_eq!(groupes.len(), 6);
        assert_eq!(groupes[2].niveau_id, niveaux[1].id);
        assert_eq!(groupes[3].groupe_name, "G2");
    }
}
