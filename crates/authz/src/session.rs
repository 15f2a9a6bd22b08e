use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use libris_kernel::UserId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session attribute under which the logged-in identity is stored.
pub const LOGIN_KEY: &str = "isLogin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Reader,
    Admin,
}

/// Identity placed in the session by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

impl UserIdentity {
    pub fn reader(user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            role: Role::Reader,
        }
    }

    pub fn admin(user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            role: Role::Admin,
            ..Self::reader(user_id, name)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Per-session attribute bag.
///
/// Values are stored untyped; [`SessionContext::get`] hands back `None` both
/// when the key is absent and when the stored value has a different shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    attributes: HashMap<String, serde_json::Value>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Store a raw value without any shape check.
    pub fn insert_raw(&mut self, key: &str, value: serde_json::Value) {
        self.attributes.insert(key.to_string(), value);
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.attributes.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(typed) => Some(typed),
            Err(err) => {
                tracing::debug!(key, error = %err, "session attribute has unexpected shape");
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.attributes.remove(key)
    }

    /// Identity stored under [`LOGIN_KEY`], if any.
    pub fn identity(&self) -> Option<UserIdentity> {
        self.get(LOGIN_KEY)
    }
}

/// Backing storage for sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &SessionId) -> anyhow::Result<Option<SessionContext>>;

    async fn save(&self, id: SessionId, context: SessionContext) -> anyhow::Result<()>;

    async fn remove(&self, id: &SessionId) -> anyhow::Result<()>;
}

/// Idle lifetime used by [`MemorySessionStore::new`].
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1800);

#[derive(Debug)]
struct Entry {
    context: SessionContext,
    last_seen: Instant,
}

/// Process-local session store.
///
/// Sessions idle for longer than the configured timeout read as absent and
/// are dropped; every save also sweeps expired entries.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Entry>>,
    idle_timeout: Duration,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) > self.idle_timeout
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> anyhow::Result<Option<SessionContext>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(entry) if !self.is_expired(entry, now) => {
                entry.last_seen = now;
                return Ok(Some(entry.context.clone()));
            }
            Some(_) => {
                sessions.remove(id);
                tracing::debug!(session = %id, "session expired after idle timeout");
            }
            None => {}
        }
        Ok(None)
    }

    async fn save(&self, id: SessionId, context: SessionContext) -> anyhow::Result<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "dropped idle sessions");
        }
        sessions.insert(
            id,
            Entry {
                context,
                last_seen: now,
            },
        );
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> anyhow::Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_get_round_trips_identity() {
        let mut ctx = SessionContext::new();
        let identity = UserIdentity::reader(7, "Ada");
        ctx.insert(LOGIN_KEY, &identity).unwrap();
        assert_eq!(ctx.identity(), Some(identity));
    }

    #[test]
    fn wrong_shape_reads_as_absent() {
        let mut ctx = SessionContext::new();
        ctx.insert_raw(LOGIN_KEY, json!("yes"));
        assert_eq!(ctx.identity(), None);

        ctx.insert_raw(LOGIN_KEY, json!({"name": "no id"}));
        assert_eq!(ctx.identity(), None);
    }

    #[test]
    fn role_defaults_to_reader() {
        let mut ctx = SessionContext::new();
        ctx.insert_raw(LOGIN_KEY, json!({"user_id": 3, "name": "Lin"}));
        let identity = ctx.identity().unwrap();
        assert!(!identity.is_admin());
    }

    #[test]
    fn session_id_parses_its_own_display() {
        let id = SessionId::generate();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[tokio::test]
    async fn memory_store_saves_and_removes() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();

        store.save(id, SessionContext::new()).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_some());
        assert_eq!(store.len().await, 1);

        store.remove(&id).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn idle_sessions_expire_on_load() {
        let store = MemorySessionStore::with_idle_timeout(Duration::from_millis(20));
        let id = SessionId::generate();
        store.save(id, SessionContext::new()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.load(&id).await.unwrap().is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn saving_sweeps_expired_sessions() {
        let store = MemorySessionStore::with_idle_timeout(Duration::from_millis(20));
        for _ in 0..3 {
            store
                .save(SessionId::generate(), SessionContext::new())
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(60)).await;

        let fresh = SessionId::generate();
        store.save(fresh, SessionContext::new()).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.load(&fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn activity_keeps_a_session_alive() {
        let store = MemorySessionStore::with_idle_timeout(Duration::from_millis(200));
        let id = SessionId::generate();
        store.save(id, SessionContext::new()).await.unwrap();

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(80)).await;
            assert!(store.load(&id).await.unwrap().is_some());
        }
    }
}
