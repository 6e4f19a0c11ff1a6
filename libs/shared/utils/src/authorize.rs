use shared_models::auth::Identity;

/// Actions restricted to specific roles. Every role check in the
/// application goes through this one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddDoctor,
    EditDoctor,
    DeleteMedicalRecord,
    ManageSystemSettings,
}

pub fn role_allows(action: Action, role: &str) -> bool {
    match action {
        Action::AddDoctor | Action::EditDoctor => matches!(role, "admin" | "manager"),
        Action::DeleteMedicalRecord => matches!(role, "admin" | "doctor"),
        Action::ManageSystemSettings => role == "admin",
    }
}

pub fn permits(action: Action, identity: &Identity) -> bool {
    role_allows(action, &identity.role)
}
