use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use redis::{Connection, Script};
use secrecy::ExposeSecret;
use tessera_core::{
    IdentityId, SingleUseToken, TokenKind, TokenLedger, TokenLedgerError, TokenValue,
};
use tokio::sync::RwLock;
use uuid::Uuid;

// Key prefixes keep ledger records apart from anything else in the instance.
const TOKEN_KEY_PREFIX: &str = "single_use_token:";
const OWNER_INDEX_KEY_PREFIX: &str = "single_use_token_index:";

// KEYS[1] = token hash, ARGV[1] = now in epoch millis.
// Returns the hash fields of the now-consumed token, or nil.
const CONSUME_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return nil
end
if redis.call('HEXISTS', KEYS[1], 'consumed_at') == 1 then
    return nil
end
local expires_at = tonumber(redis.call('HGET', KEYS[1], 'expires_at'))
if expires_at == nil or expires_at <= tonumber(ARGV[1]) then
    return nil
end
redis.call('HSET', KEYS[1], 'consumed_at', ARGV[1])
return redis.call('HGETALL', KEYS[1])
"#;

// KEYS[1] = owner/kind index set, ARGV[1] = token key prefix.
const DELETE_INDEXED_SCRIPT: &str = r#"
local values = redis.call('SMEMBERS', KEYS[1])
local removed = 0
for _, value in ipairs(values) do
    removed = removed + redis.call('DEL', ARGV[1] .. value)
end
redis.call('DEL', KEYS[1])
return removed
"#;

/// Token ledger on Redis. Each token is a hash that expires with the token;
/// consumption and bulk deletion run as Lua scripts, which Redis executes
/// atomically.
#[derive(Clone)]
pub struct RedisTokenLedger {
    conn: Arc<RwLock<Connection>>,
}

impl RedisTokenLedger {
    pub fn new(conn: Arc<RwLock<Connection>>) -> Self {
        Self { conn }
    }
}

/// Open a synchronous connection to `redis://{host_name}/`.
pub fn connect_redis(host_name: &str) -> redis::RedisResult<Connection> {
    redis::Client::open(format!("redis://{host_name}/"))?.get_connection()
}

fn token_key(value: &str) -> String {
    format!("{TOKEN_KEY_PREFIX}{value}")
}

fn index_key(owner_id: IdentityId, kind: TokenKind) -> String {
    format!("{OWNER_INDEX_KEY_PREFIX}{owner_id}:{kind}")
}

fn unexpected(e: impl ToString) -> TokenLedgerError {
    TokenLedgerError::UnexpectedError(e.to_string())
}

fn parse_token(fields: HashMap<String, String>) -> Result<SingleUseToken, TokenLedgerError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| unexpected(format!("token record is missing {name}")))
    };
    let timestamp = |name: &str| -> Result<DateTime<Utc>, TokenLedgerError> {
        let millis: i64 = field(name)?.parse().map_err(unexpected)?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| unexpected(format!("{name} is out of range")))
    };

    Ok(SingleUseToken {
        id: field("id")?.parse::<Uuid>().map_err(unexpected)?,
        owner_id: IdentityId::from(field("owner_id")?.parse::<Uuid>().map_err(unexpected)?),
        kind: field("kind")?.parse::<TokenKind>().map_err(unexpected)?,
        value: TokenValue::new(field("value")?.clone()),
        expires_at: timestamp("expires_at")?,
        consumed_at: Some(timestamp("consumed_at")?),
        created_at: timestamp("created_at")?,
    })
}

#[async_trait::async_trait]
impl TokenLedger for RedisTokenLedger {
    #[tracing::instrument(name = "Creating single-use token in Redis", skip(self))]
    async fn create(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
        ttl: TimeDelta,
    ) -> Result<TokenValue, TokenLedgerError> {
        let token = SingleUseToken::issue(owner_id, kind, ttl, Utc::now());
        let key = token_key(token.value.expose_secret());
        let index = index_key(owner_id, kind);

        let fields = [
            ("id", token.id.to_string()),
            ("owner_id", owner_id.to_string()),
            ("kind", kind.as_str().to_owned()),
            ("value", token.value.expose_secret().clone()),
            ("expires_at", token.expires_at.timestamp_millis().to_string()),
            ("created_at", token.created_at.timestamp_millis().to_string()),
        ];
        // Keep the index around at least as long as its newest token.
        let index_ttl = ttl.num_seconds().max(1);

        let mut conn = self.conn.write().await;
        redis::pipe()
            .atomic()
            .hset_multiple(&key, &fields)
            .ignore()
            .pexpire_at(&key, token.expires_at.timestamp_millis())
            .ignore()
            .sadd(&index, token.value.expose_secret())
            .ignore()
            .expire(&index, index_ttl)
            .ignore()
            .query::<()>(&mut *conn)
            .map_err(unexpected)?;

        Ok(token.value)
    }

    #[tracing::instrument(name = "Consuming single-use token in Redis", skip_all)]
    async fn consume(&self, value: &TokenValue) -> Result<SingleUseToken, TokenLedgerError> {
        let now = Utc::now().timestamp_millis();

        let mut conn = self.conn.write().await;
        let fields: Option<HashMap<String, String>> = Script::new(CONSUME_SCRIPT)
            .key(token_key(value.expose_secret()))
            .arg(now)
            .invoke(&mut *conn)
            .map_err(unexpected)?;

        match fields {
            Some(fields) if !fields.is_empty() => parse_token(fields),
            _ => Err(TokenLedgerError::NotFound),
        }
    }

    #[tracing::instrument(name = "Deleting superseded tokens in Redis", skip(self))]
    async fn delete_by_owner_and_type(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
    ) -> Result<u64, TokenLedgerError> {
        let mut conn = self.conn.write().await;
        Script::new(DELETE_INDEXED_SCRIPT)
            .key(index_key(owner_id, kind))
            .arg(TOKEN_KEY_PREFIX)
            .invoke(&mut *conn)
            .map_err(unexpected)
    }
}
