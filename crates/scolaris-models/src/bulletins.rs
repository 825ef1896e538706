//! Student report cards (bulletins).
//!
//! Grades are grouped by module. For each module:
//!
//! - `moyenne` is the mean of the module's grades (out of 20)
//! - `moyenne_module = moyenne / (20 / credits)`, i.e. the mean scaled to the
//!   module's credits
//! - the module is `Validé` when `moyenne_module >= credit_required`,
//!   otherwise `Rattrapage`
//!
//! `moyenne_generale` is the mean of the `moyenne_module` values and the
//! student is `Admis` when it is strictly above [`ADMISSION_THRESHOLD`].
//! Comparisons use unrounded values; only the response is rounded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::grades::{MAX_GRADE, round2};
use crate::users::UserSummary;

pub const ADMISSION_THRESHOLD: f64 = 30.0;

/// One grade joined with its module, as loaded for a bulletin.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BulletinGradeRow {
    pub module_id: Uuid,
    pub module_title: String,
    pub credits: i32,
    pub credit_required: i32,
    pub grade: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ModuleState {
    #[serde(rename = "Validé")]
    Valide,
    #[serde(rename = "Rattrapage")]
    Rattrapage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Decision {
    Admis,
    Redoublement,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ModuleResult {
    pub module: String,
    pub moyenne: f64,
    pub moyenne_module: f64,
    pub etat: ModuleState,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Bulletin {
    pub etudiant: UserSummary,
    pub resultats_modules: Vec<ModuleResult>,
    pub moyenne_generale: f64,
    pub decision: Decision,
}

/// Results computed from a student's grades, before the student is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletinResults {
    pub resultats_modules: Vec<ModuleResult>,
    pub moyenne_generale: f64,
    pub decision: Decision,
}

impl BulletinResults {
    pub fn into_bulletin(self, etudiant: UserSummary) -> Bulletin {
        Bulletin {
            etudiant,
            resultats_modules: self.resultats_modules,
            moyenne_generale: self.moyenne_generale,
            decision: self.decision,
        }
    }
}

struct ModuleAccumulator<'a> {
    title: &'a str,
    credits: i32,
    credit_required: i32,
    sum: f64,
    count: usize,
}

/// Computes module results and the final decision. Returns `None` when there
/// are no grades. Modules are ordered by title.
pub fn compute_bulletin(rows: &[BulletinGradeRow]) -> Option<BulletinResults> {
    if rows.is_empty() {
        return None;
    }

    let mut modules: BTreeMap<Uuid, ModuleAccumulator<'_>> = BTreeMap::new();
    for row in rows {
        let acc = modules.entry(row.module_id).or_insert(ModuleAccumulator {
            title: &row.module_title,
            credits: row.credits,
            credit_required: row.credit_required,
            sum: 0.0,
            count: 0,
        });
        acc.sum += row.grade;
        acc.count += 1;
    }

    let mut raw: Vec<(&str, f64, f64, ModuleState)> = modules
        .values()
        .map(|acc| {
            let moyenne = acc.sum / acc.count as f64;
            let moyenne_module = moyenne / (MAX_GRADE / f64::from(acc.credits));
            let etat = if moyenne_module >= f64::from(acc.credit_required) {
                ModuleState::Valide
            } else {
                ModuleState::Rattrapage
            };
            (acc.title, moyenne, moyenne_module, etat)
        })
        .collect();
    raw.sort_by(|a, b| a.0.cmp(b.0));

    let moyenne_generale = raw.iter().map(|r| r.2).sum::<f64>() / raw.len() as f64;
    let decision = if moyenne_generale > ADMISSION_THRESHOLD {
        Decision::Admis
    } else {
        Decision::Redoublement
    };

    Some(BulletinResults {
        resultats_modules: raw
            .into_iter()
            .map(|(title, moyenne, moyenne_module, etat)| ModuleResult {
                module: title.to_string(),
                moyenne: round2(moyenne),
                moyenne_module: round2(moyenne_module),
                etat,
            })
            .collect(),
        moyenne_generale: round2(moyenne_generale),
        decision,
    })
}
