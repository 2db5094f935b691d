// src/middleware/roles.rs
//
// Cada handler declara quem pode chamá-lo com uma destas listas.

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::Role};

pub const SUPERADMIN_ONLY: &[Role] = &[Role::Superadmin];
pub const ADMINS: &[Role] = &[Role::Superadmin, Role::Admin];
pub const ALL_ROLES: &[Role] = &[Role::Superadmin, Role::Admin, Role::Tenant, Role::Landlord];

pub fn ensure_role(user: &AuthenticatedUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.0.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not have permission to perform this action.".into()))
    }
}

/// Escritas que apontam para um cliente fora do escopo do chamador.
pub fn ensure_client(user: &AuthenticatedUser, client_id: i32) -> Result<(), AppError> {
    if user.0.client_scope().allows(client_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You cannot manage records of another client.".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::claims_for;

    #[test]
    fn roles_outside_the_list_are_forbidden() {
        let tenant = AuthenticatedUser(claims_for(1, Role::Tenant));
        let admin = AuthenticatedUser(claims_for(2, Role::Admin));

        assert!(ensure_role(&tenant, ALL_ROLES).is_ok());
        assert!(matches!(ensure_role(&tenant, ADMINS), Err(AppError::Forbidden(_))));
        assert!(ensure_role(&admin, ADMINS).is_ok());
        assert!(matches!(ensure_role(&admin, SUPERADMIN_ONLY), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn writes_are_limited_to_the_callers_client() {
        let mut scoped = claims_for(3, Role::Admin);
        scoped.client = Some(7);
        let scoped = AuthenticatedUser(scoped);

        assert!(ensure_client(&scoped, 7).is_ok());
        assert!(matches!(ensure_client(&scoped, 8), Err(AppError::Forbidden(_))));
        assert!(ensure_client(&AuthenticatedUser(claims_for(4, Role::Superadmin)), 8).is_ok());
    }
}
