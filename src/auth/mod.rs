mod middleware;
mod provider;

pub use middleware::{AuthState, auth_guard};
pub use provider::{AuthError, AuthProvider, AuthenticatedUser, BackendAuthProvider};

#[cfg(test)]
pub use provider::MockAuthProvider;
