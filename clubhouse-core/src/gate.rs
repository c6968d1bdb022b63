use crate::errors::GateRejection;
use crate::principal::{Principal, Role};
use crate::session::SessionProvider;

/// Layered admission control for club endpoints.
///
/// Checks run in a fixed order: session, then approval, then role. A
/// request failing an earlier layer never reaches a later one, so a
/// missing token is always `Unauthenticated` even on admin routes, and an
/// unapproved member is told `PendingApproval` before any role verdict.
///
/// Administrators bypass the approval layer; they are the ones who grant
/// approval and must not lock themselves out.
pub struct AccessGate<S> {
    sessions: S,
}

impl<S: SessionProvider> AccessGate<S> {
    pub fn new(sessions: S) -> Self {
        Self { sessions }
    }

    /// Session layer: resolve a token to its principal.
    ///
    /// Absent and invalid tokens are indistinguishable to the caller.
    pub async fn resolve_session(&self, token: Option<&str>) -> Option<Principal> {
        self.sessions.validate_session(token?).await
    }

    /// Session layer with a rejection instead of `None`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, GateRejection> {
        self.resolve_session(token)
            .await
            .ok_or(GateRejection::Unauthenticated)
    }

    /// Approval layer: unapproved members are held at the door.
    pub fn enforce_approval(&self, principal: &Principal) -> Result<(), GateRejection> {
        if principal.is_admin() || principal.approved() {
            Ok(())
        } else {
            Err(GateRejection::PendingApproval)
        }
    }

    /// Role layer: `Admin` demands the admin tier, `Member` admits anyone
    /// who made it this far.
    pub fn enforce_role(&self, principal: &Principal, required: Role) -> Result<(), GateRejection> {
        match required {
            Role::Member => Ok(()),
            Role::Admin if principal.is_admin() => Ok(()),
            Role::Admin => Err(GateRejection::Forbidden),
        }
    }

    /// Run the full chain and hand back the admitted principal.
    pub async fn admit(
        &self,
        token: Option<&str>,
        required: Role,
    ) -> Result<Principal, GateRejection> {
        let principal = self.authenticate(token).await?;
        self.enforce_approval(&principal)?;
        self.enforce_role(&principal, required)?;
        Ok(principal)
    }
}
