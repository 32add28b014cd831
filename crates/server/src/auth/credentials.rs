use super::{AuthError, ClaimSet};

/// Demo accounts: (username, password, role).
const DEMO_USERS: &[(&str, &str, &str)] = &[("admin", "admin", "admin")];

/// Check a username/password pair against the demo accounts.
pub fn authenticate(username: &str, password: &str) -> Result<ClaimSet, AuthError> {
    DEMO_USERS
        .iter()
        .find(|(user, pass, _)| *user == username && *pass == password)
        .map(|(user, _, role)| ClaimSet::new(*user, *role))
        .ok_or(AuthError::BadCredentials)
}
