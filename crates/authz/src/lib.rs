//! Session handling and the login gate guarding reader-facing routes.

pub mod extract;
pub mod gate;
pub mod session;

pub use extract::{LoginRequired, SessionUser, Sessions};
pub use gate::{gate, GateOutcome};
pub use session::{
    MemorySessionStore, Role, SessionContext, SessionId, SessionStore, UserIdentity,
    DEFAULT_IDLE_TIMEOUT, LOGIN_KEY,
};
