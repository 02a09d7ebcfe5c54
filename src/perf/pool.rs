//! Keyed connection pool over a pluggable connection factory

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{DevsetupError, Result};

/// Creates and tears down connections for a pool
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Connection: Send + Sync;

    /// Open a new connection for `key`
    async fn create(&self, key: &str) -> Result<Self::Connection>;

    /// Close a connection no longer held by anyone
    async fn close(&self, _connection: Self::Connection) -> Result<()> {
        Ok(())
    }
}

/// Pool holding at most one shared connection per key.
///
/// All mutation goes through one async mutex, so a key is never connected
/// twice concurrently.
pub struct ConnectionPool<F: ConnectionFactory> {
    factory: F,
    max_size: usize,
    connections: Mutex<HashMap<String, Arc<F::Connection>>>,
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    pub fn new(factory: F, max_size: usize) -> Self {
        Self {
            factory,
            max_size,
            connections: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get the connection for `key`, creating it on first use
    pub async fn get(&self, key: &str) -> Result<Arc<F::Connection>> {
        let mut connections = self.connections.lock().await;
        if let Some(conn) = connections.get(key) {
            return Ok(Arc::clone(conn));
        }
        if connections.len() >= self.max_size {
            return Err(DevsetupError::Pool(format!(
                "Pool is full ({} connections), cannot open '{}'",
                self.max_size, key
            )));
        }

        tracing::debug!(key, "Opening pooled connection");
        let conn = Arc::new(self.factory.create(key).await?);
        connections.insert(key.to_string(), Arc::clone(&conn));
        Ok(conn)
    }

    /// Drop the connection for `key`; returns whether one existed.
    ///
    /// The factory only sees the connection if no caller still holds it.
    pub async fn close(&self, key: &str) -> Result<bool> {
        let removed = self.connections.lock().await.remove(key);
        match removed {
            Some(conn) => {
                self.shutdown(key, conn).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close every connection, returning how many were removed
    pub async fn close_all(&self) -> Result<usize> {
        let drained: Vec<(String, Arc<F::Connection>)> = self.connections.lock().await.drain().collect();
        let count = drained.len();
        for (key, conn) in drained {
            self.shutdown(&key, conn).await?;
        }
        Ok(count)
    }

    async fn shutdown(&self, key: &str, conn: Arc<F::Connection>) -> Result<()> {
        match Arc::try_unwrap(conn) {
            Ok(conn) => self.factory.close(conn).await,
            Err(_) => {
                tracing::debug!(key, "Connection still in use, leaving close to last holder");
                Ok(())
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}
