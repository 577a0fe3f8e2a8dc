/// Authorization policy for user resources
///
/// Pure decisions over the acting identity and the target account id. No
/// lookups happen here, so a denial never depends on whether the target
/// exists; handlers must call `authorize` before touching persistence.

use crate::error::AppError;
use crate::models::{Identity, Role};

/// Operation requested on a user resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    ReadUser { target_id: i32 },
    /// `role_change` is the role field of the update body, if present
    UpdateUser { target_id: i32, role_change: Option<Role> },
    DeleteUser { target_id: i32 },
    /// Creating an account with the given role
    CreateUser { role: Role },
}

fn owns_or_admin(actor: &Identity, target_id: i32) -> bool {
    actor.id == target_id || actor.is_admin()
}

/// Decide whether `actor` may perform `operation`
///
/// # Errors
/// `AppError::Forbidden` with a human-readable reason
pub fn authorize(actor: &Identity, operation: Operation) -> Result<(), AppError> {
    let denial = match operation {
        Operation::ListUsers if !actor.is_admin() => Some("Admin access required"),
        Operation::ListUsers => None,

        Operation::ReadUser { target_id } if !owns_or_admin(actor, target_id) => {
            Some("You can only access your own information")
        }
        Operation::ReadUser { .. } => None,

        Operation::UpdateUser { target_id, .. } if !owns_or_admin(actor, target_id) => {
            Some("You can only update your own information")
        }
        Operation::UpdateUser { role_change: Some(_), .. } if !actor.is_admin() => {
            Some("Only administrators can change user roles")
        }
        Operation::UpdateUser { .. } => None,

        Operation::DeleteUser { target_id } if !owns_or_admin(actor, target_id) => {
            Some("You can only delete your own account or admin can delete any account")
        }
        Operation::DeleteUser { target_id } if actor.is_admin() && actor.id == target_id => {
            Some("Administrators cannot delete their own accounts")
        }
        Operation::DeleteUser { .. } => None,

        Operation::CreateUser { role: Role::Admin } if !actor.is_admin() => {
            Some("Only administrators can create administrator accounts")
        }
        Operation::CreateUser { .. } => None,
    };

    match denial {
        Some(reason) => {
            tracing::warn!(
                actor_id = actor.id,
                actor_email = %actor.email,
                operation = ?operation,
                reason,
                "authorization denied"
            );
            Err(AppError::forbidden(reason))
        }
        None => Ok(()),
    }
}
