use std::{sync::Mutex, time::Duration};

use redis::{Client, Commands, Connection};

use crate::{Namespace, Store, TollgateError};

/// [`Store`] backed by a Redis server, using the synchronous client.
///
/// The connection is created lazily on first use and reused for every
/// subsequent call. Namespaces map onto Redis database indexes: a `SELECT`
/// is issued whenever the requested namespace differs from the one the
/// connection currently has selected. After a command error the cached
/// connection is dropped, so the next call reconnects lazily; the failed
/// call itself still surfaces its error, there is no retry.
///
/// Calls are serialized on the one connection. A blocking pop therefore
/// blocks every other store call from the same process, which matches the
/// single-threaded-per-process model the coordination algorithms assume.
pub struct RedisStore {
    client: Client,
    state: Mutex<ConnectionState>,
}

#[derive(Default)]
struct ConnectionState {
    connection: Option<Connection>,
    selected: Option<u32>,
}

impl RedisStore {
    /// Create a store from a connection URL, e.g. `redis://127.0.0.1:6379/`.
    pub fn open(url: &str) -> Result<Self, TollgateError> {
        Ok(Self::new(Client::open(url)?))
    }

    /// Create a store from an existing [`redis::Client`].
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Mutex::new(ConnectionState::default()),
        }
    }

    fn with_connection<T>(
        &self,
        namespace: Namespace,
        run: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T, TollgateError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut connection = match state.connection.take() {
            Some(connection) => connection,
            None => {
                state.selected = None;
                self.client.get_connection()?
            }
        };

        let result = (|| {
            if state.selected != Some(*namespace) {
                redis::cmd("SELECT").arg(*namespace).query::<()>(&mut connection)?;
                state.selected = Some(*namespace);
            }
            run(&mut connection)
        })();

        match result {
            Ok(value) => {
                state.connection = Some(connection);
                Ok(value)
            }
            Err(err) => {
                // The connection is in an unknown state after a failed
                // command; the next call reconnects lazily.
                state.selected = None;
                Err(err.into())
            }
        }
    }
}

impl Store for RedisStore {
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, TollgateError> {
        self.with_connection(namespace, |connection| connection.get(key))
    }

    fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<(), TollgateError> {
        self.with_connection(namespace, |connection| connection.set(key, value))
    }

    fn get_and_replace(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, TollgateError> {
        self.with_connection(namespace, |connection| connection.getset(key, value))
    }

    fn increment(&self, namespace: Namespace, key: &str) -> Result<i64, TollgateError> {
        self.with_connection(namespace, |connection| connection.incr(key, 1i64))
    }

    fn delete(&self, namespace: Namespace, keys: &[&str]) -> Result<(), TollgateError> {
        self.with_connection(namespace, |connection| {
            let mut cmd = redis::cmd("DEL");
            for key in keys {
                cmd.arg(*key);
            }
            cmd.query::<i64>(connection)?;
            Ok(())
        })
    }

    fn list_push_left(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> Result<(), TollgateError> {
        self.with_connection(namespace, |connection| connection.lpush(key, value))
    }

    fn blocking_list_pop_left(
        &self,
        namespace: Namespace,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<String>, TollgateError> {
        self.with_connection(namespace, |connection| {
            let reply: Option<(String, String)> = connection.blpop(key, timeout.as_secs_f64())?;
            Ok(reply.map(|(_, value)| value))
        })
    }
}
