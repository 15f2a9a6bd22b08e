use crate::session::{SessionContext, UserIdentity};

/// Result of checking a session for a logged-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Admitted(UserIdentity),
    /// No usable identity; the caller must go to this location instead.
    Redirect(String),
}

/// Admit the identity stored in `context`, or send the caller to `login_path`.
///
/// A missing session, a missing identity, and an identity of the wrong shape
/// are all treated the same way.
pub fn gate(context: Option<&SessionContext>, login_path: &str) -> GateOutcome {
    match context.and_then(SessionContext::identity) {
        Some(identity) => GateOutcome::Admitted(identity),
        None => GateOutcome::Redirect(login_path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LOGIN_KEY;

    #[test]
    fn missing_session_redirects() {
        assert_eq!(
            gate(None, "/login"),
            GateOutcome::Redirect("/login".to_string())
        );
    }

    #[test]
    fn session_without_identity_redirects() {
        let ctx = SessionContext::new();
        assert_eq!(
            gate(Some(&ctx), "/login"),
            GateOutcome::Redirect("/login".to_string())
        );
    }

    #[test]
    fn stored_identity_is_admitted() {
        let mut ctx = SessionContext::new();
        let identity = UserIdentity::reader(1, "Ada");
        ctx.insert(LOGIN_KEY, &identity).unwrap();
        assert_eq!(gate(Some(&ctx), "/login"), GateOutcome::Admitted(identity));
    }
}
