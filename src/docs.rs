use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use scolaris_core::{PaginationMeta, PaginationParams};
use scolaris_models::absences::{
    Absence, AbsenceCounts, AbsenceCountsResponse, AbsenceStatus, AbsenceWithStudent,
    BulkAbsenceDto, PaginatedAbsencesResponse, StudentStatusDto, UpdateAbsenceDto,
};
use scolaris_models::attendance_lists::{
    AttendanceList, CreateAttendanceListDto, PaginatedAttendanceListsResponse,
    UpdateAttendanceListDto,
};
use scolaris_models::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenPairResponse,
    TwoFactorRequiredResponse,
};
use scolaris_models::bulletins::{Bulletin, Decision, ModuleResult, ModuleState};
use scolaris_models::course_modules::{
    CourseModule, CreateModuleDto, ModuleScheduleResponse, PaginatedModulesResponse,
    UpdateModuleDto,
};
use scolaris_models::events::{CreateEventDto, Event, PaginatedEventsResponse, UpdateEventDto};
use scolaris_models::filieres::{
    CreateFiliereDto, Filiere, PaginatedFilieresResponse, UpdateFiliereDto,
};
use scolaris_models::grades::{
    CreateGradeDto, Grade, PaginatedGradesResponse, StudentAverageResponse, UpdateGradeDto,
};
use scolaris_models::groupes::{
    CreateGroupeDto, Groupe, GroupeMembersResponse, PaginatedGroupesResponse, UpdateGroupeDto,
};
use scolaris_models::niveaux::{CreateNiveauDto, Niveau, PaginatedNiveauxResponse, UpdateNiveauDto};
use scolaris_models::opportunities::{
    CreateOpportunityDto, Opportunity, OpportunityType, PaginatedOpportunitiesResponse,
    UpdateOpportunityDto,
};
use scolaris_models::permissions::{
    CreatePermissionSetDto, PermissionTokenDto, RolePermissionSet, UpdatePermissionSetDto,
};
use scolaris_models::roles::{
    CreateRoleDto, PaginatedRolesResponse, Role, RoleWithPermissions, UpdateRoleDto,
};
use scolaris_models::rooms::{
    CreateRoomDto, PaginatedRoomsResponse, Room, RoomAvailabilityResponse, UpdateRoomDto,
};
use scolaris_models::sessions::{
    AttendanceSheetResponse, CreateSessionDto, PaginatedSessionsResponse, Session, SessionType,
    UpdateSessionDto,
};
use scolaris_models::two_factor::{
    DisableTwoFactorRequest, GenerateTwoFactorResponse, TwoFactorStatusResponse,
    VerifyTwoFactorLoginRequest, VerifyTwoFactorSetupRequest,
};
use scolaris_models::uploads::{
    Document, PaginatedDocumentsResponse, PaginatedResourcesResponse, Resource, UploadForm,
};
use scolaris_models::users::{PaginatedUsersResponse, UpdateUserDto, User, UserSummary};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::health::controller::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::verify_email,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::profile,
        crate::modules::auth::controller::logout,
        crate::modules::two_factor::controller::generate,
        crate::modules::two_factor::controller::verify_setup,
        crate::modules::two_factor::controller::disable,
        crate::modules::two_factor::controller::status,
        crate::modules::two_factor::controller::verify_login,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role_by_id,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::permissions::controller::list_permission_sets,
        crate::modules::permissions::controller::get_role_permission_sets,
        crate::modules::permissions::controller::get_permission_set,
        crate::modules::permissions::controller::create_permission_set,
        crate::modules::permissions::controller::update_permission_set,
        crate::modules::permissions::controller::delete_permission_set,
        crate::modules::permissions::controller::add_permission,
        crate::modules::permissions::controller::remove_permission,
        crate::modules::filieres::controller::create_filiere,
        crate::modules::filieres::controller::list_filieres,
        crate::modules::filieres::controller::get_filiere,
        crate::modules::filieres::controller::update_filiere,
        crate::modules::filieres::controller::delete_filiere,
        crate::modules::filieres::controller::get_filiere_modules,
        crate::modules::niveaux::controller::create_niveau,
        crate::modules::niveaux::controller::list_niveaux,
        crate::modules::niveaux::controller::get_niveau,
        crate::modules::niveaux::controller::update_niveau,
        crate::modules::niveaux::controller::delete_niveau,
        crate::modules::niveaux::controller::get_niveau_modules,
        crate::modules::groupes::controller::create_groupe,
        crate::modules::groupes::controller::list_groupes,
        crate::modules::groupes::controller::get_groupe,
        crate::modules::groupes::controller::update_groupe,
        crate::modules::groupes::controller::delete_groupe,
        crate::modules::groupes::controller::get_groupe_users,
        crate::modules::course_modules::controller::create_module,
        crate::modules::course_modules::controller::list_modules,
        crate::modules::course_modules::controller::get_module,
        crate::modules::course_modules::controller::update_module,
        crate::modules::course_modules::controller::delete_module,
        crate::modules::course_modules::controller::get_module_schedule,
        crate::modules::rooms::controller::create_room,
        crate::modules::rooms::controller::list_rooms,
        crate::modules::rooms::controller::get_room,
        crate::modules::rooms::controller::update_room,
        crate::modules::rooms::controller::delete_room,
        crate::modules::rooms::controller::get_room_availability,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::list_events,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
        crate::modules::attendance_lists::controller::create_attendance_list,
        crate::modules::attendance_lists::controller::list_attendance_lists,
        crate::modules::attendance_lists::controller::get_attendance_list,
        crate::modules::attendance_lists::controller::update_attendance_list,
        crate::modules::attendance_lists::controller::delete_attendance_list,
        crate::modules::sessions::controller::create_session,
        crate::modules::sessions::controller::list_sessions,
        crate::modules::sessions::controller::get_session,
        crate::modules::sessions::controller::update_session,
        crate::modules::sessions::controller::delete_session,
        crate::modules::sessions::controller::get_attendance_sheet,
        crate::modules::grades::controller::create_grade,
        crate::modules::grades::controller::list_grades,
        crate::modules::grades::controller::get_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::delete_grade,
        crate::modules::grades::controller::get_student_grades,
        crate::modules::grades::controller::get_student_average,
        crate::modules::grades::controller::get_module_grades,
        crate::modules::bulletins::controller::get_bulletin,
        crate::modules::absences::controller::list_absences,
        crate::modules::absences::controller::get_groupe_students,
        crate::modules::absences::controller::bulk_create_absences,
        crate::modules::absences::controller::get_absence,
        crate::modules::absences::controller::update_absence,
        crate::modules::absences::controller::get_student_counts,
        crate::modules::absences::controller::delete_absence,
        crate::modules::documents::controller::upload_document,
        crate::modules::documents::controller::list_documents,
        crate::modules::documents::controller::get_document,
        crate::modules::documents::controller::update_document,
        crate::modules::documents::controller::delete_document,
        crate::modules::resources::controller::upload_resource,
        crate::modules::resources::controller::list_resources,
        crate::modules::resources::controller::get_resource,
        crate::modules::resources::controller::update_resource,
        crate::modules::resources::controller::delete_resource,
        crate::modules::opportunities::controller::create_opportunity,
        crate::modules::opportunities::controller::list_opportunities,
        crate::modules::opportunities::controller::get_opportunity,
        crate::modules::opportunities::controller::update_opportunity,
        crate::modules::opportunities::controller::delete_opportunity,
        crate::modules::health::controller::health,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            PaginationMeta,
            PaginationParams,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            TwoFactorRequiredResponse,
            RefreshTokenRequest,
            TokenPairResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ProfileResponse,
            GenerateTwoFactorResponse,
            VerifyTwoFactorSetupRequest,
            DisableTwoFactorRequest,
            TwoFactorStatusResponse,
            VerifyTwoFactorLoginRequest,
            User,
            UserSummary,
            UpdateUserDto,
            PaginatedUsersResponse,
            Role,
            RoleWithPermissions,
            CreateRoleDto,
            UpdateRoleDto,
            PaginatedRolesResponse,
            RolePermissionSet,
            CreatePermissionSetDto,
            UpdatePermissionSetDto,
            PermissionTokenDto,
            Filiere,
            CreateFiliereDto,
            UpdateFiliereDto,
            PaginatedFilieresResponse,
            Niveau,
            CreateNiveauDto,
            UpdateNiveauDto,
            PaginatedNiveauxResponse,
            Groupe,
            CreateGroupeDto,
            UpdateGroupeDto,
            PaginatedGroupesResponse,
            GroupeMembersResponse,
            CourseModule,
            CreateModuleDto,
            UpdateModuleDto,
            PaginatedModulesResponse,
            ModuleScheduleResponse,
            Room,
            CreateRoomDto,
            UpdateRoomDto,
            PaginatedRoomsResponse,
            RoomAvailabilityResponse,
            Event,
            CreateEventDto,
            UpdateEventDto,
            PaginatedEventsResponse,
            AttendanceList,
            CreateAttendanceListDto,
            UpdateAttendanceListDto,
            PaginatedAttendanceListsResponse,
            Session,
            SessionType,
            CreateSessionDto,
            UpdateSessionDto,
            PaginatedSessionsResponse,
            AttendanceSheetResponse,
            Grade,
            CreateGradeDto,
            UpdateGradeDto,
            PaginatedGradesResponse,
            StudentAverageResponse,
            Bulletin,
            ModuleResult,
            ModuleState,
            Decision,
            Absence,
            AbsenceStatus,
            AbsenceWithStudent,
            StudentStatusDto,
            BulkAbsenceDto,
            UpdateAbsenceDto,
            PaginatedAbsencesResponse,
            AbsenceCounts,
            AbsenceCountsResponse,
            Document,
            Resource,
            UploadForm,
            PaginatedDocumentsResponse,
            PaginatedResourcesResponse,
            Opportunity,
            OpportunityType,
            CreateOpportunityDto,
            UpdateOpportunityDto,
            PaginatedOpportunitiesResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Registration, login, tokens and password reset"),
        (name = "Two-Factor Authentication", description = "TOTP enrollment and second-step login"),
        (name = "Users", description = "User management"),
        (name = "Roles", description = "Role management"),
        (name = "Permissions", description = "Permission sets attached to roles"),
        (name = "Filieres", description = "Fields of study"),
        (name = "Niveaux", description = "Year levels of a filiere"),
        (name = "Groupes", description = "Class groups of a niveau"),
        (name = "Modules", description = "Course modules and their schedule"),
        (name = "Rooms", description = "Rooms and availability"),
        (name = "Events", description = "School events"),
        (name = "Attendance Lists", description = "Attendance lists of a groupe"),
        (name = "Sessions", description = "Course sessions and conflict detection"),
        (name = "Grades", description = "Grades and averages"),
        (name = "Bulletins", description = "Student report cards"),
        (name = "Absences", description = "Roll calls and absence counts"),
        (name = "Documents", description = "Uploaded administrative documents"),
        (name = "Resources", description = "Uploaded teaching resources"),
        (name = "Opportunities", description = "Internships and job offers")
    ),
    info(
        title = "Scolaris API",
        version = "0.1.0",
        description = "School management REST API built with Rust, Axum and PostgreSQL, with JWT authentication and permission-based access control.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
