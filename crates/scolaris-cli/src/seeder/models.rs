//! Seed rows and the configuration that sizes them.

use uuid::Uuid;

pub struct FiliereSeed {
    pub name: String,
    pub description: String,
}

pub struct NiveauSeed {
    pub name: String,
    pub filiere_id: Uuid,
    pub academic_year: String,
    pub credits_required: i32,
}

pub struct GroupeSeed {
    pub groupe_name: String,
    pub niveau_id: Uuid,
}

pub struct ModuleSeed {
    pub title: String,
    pub credits: i32,
    pub credit_required: i32,
    pub niveau_id: Uuid,
    pub filiere_id: Uuid,
}

pub struct RoomSeed {
    pub room_number: String,
    pub capacity: i32,
    pub room_type: String,
    pub facility: String,
}

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Uuid,
    pub groupe_id: Option<Uuid>,
    pub filiere_id: Option<Uuid>,
}

/// A niveau with the filiere it belongs to.
#[derive(Clone, Copy, Debug)]
pub struct SeededNiveau {
    pub id: Uuid,
    pub filiere_id: Uuid,
}

/// A groupe with the filiere of its niveau, which students inherit.
#[derive(Clone, Copy, Debug)]
pub struct SeededGroupe {
    pub id: Uuid,
    pub filiere_id: Uuid,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub filieres: usize,
    pub niveaux_per_filiere: usize,
    pub groupes_per_niveau: usize,
    pub modules_per_niveau: usize,
    pub rooms: usize,
    pub teachers: usize,
    pub students_per_groupe: usize,
    pub academic_year: String,
    /// Password given to every generated account.
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            filieres: 3,
            niveaux_per_filiere: 3,
            groupes_per_niveau: 2,
            modules_per_niveau: 6,
            rooms: 20,
            teachers: 15,
            students_per_groupe: 25,
            academic_year: "2025-2026".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn with_groupes_per_niveau(mut self, groupes: usize) -> Self {
        self.groupes_per_niveau = groupes;
        self
    }

    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers;
        self
    }

    pub fn with_students_per_groupe(mut self, students: usize) -> Self {
        self.students_per_groupe = students;
        self
    }

    pub fn total_groupes(&self) -> usize {
        self.filieres * self.niveaux_per_filiere * self.groupes_per_niveau
    }

    pub fn total_students(&self) -> usize {
        self.total_groupes() * self.students_per_groupe
    }
}
