// SPDX-License-Identifier: GPL-3.0-only

//! Registry of connected layout clients. Each namespace is owned by at
//! most one connection; outputs bind to namespaces, not connections, so a
//! reconnecting generator picks its outputs back up.

use deltawm_protocol::LAYOUT_PROTOCOL_VERSION;

pub type ConnId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutClient {
    pub conn: ConnId,
    pub namespace: String,
    pub version: u32,
}

#[derive(Debug, Default)]
pub struct LayoutManager {
    clients: Vec<LayoutClient>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("namespace {0} is already in use")]
    NamespaceInUse(String),
    #[error("unsupported layout protocol version {0}")]
    UnsupportedVersion(u32),
}

impl LayoutManager {
    pub fn register(
        &mut self,
        conn: ConnId,
        namespace: &str,
        version: u32,
    ) -> Result<(), LayoutError> {
        if version == 0 || version > LAYOUT_PROTOCOL_VERSION {
            return Err(LayoutError::UnsupportedVersion(version));
        }
        if self.clients.iter().any(|c| c.namespace == namespace) {
            return Err(LayoutError::NamespaceInUse(namespace.to_owned()));
        }
        self.clients.push(LayoutClient {
            conn,
            namespace: namespace.to_owned(),
            version,
        });
        Ok(())
    }

    /// Remove a connection's registration, returning the namespace it
    /// held.
    pub fn disconnect(&mut self, conn: ConnId) -> Option<String> {
        let at = self.clients.iter().position(|c| c.conn == conn)?;
        Some(self.clients.remove(at).namespace)
    }

    pub fn binding_for(&self, namespace: &str) -> Option<&LayoutClient> {
        self.clients.iter().find(|c| c.namespace == namespace)
    }

    pub fn by_conn(&self, conn: ConnId) -> Option<&LayoutClient> {
        self.clients.iter().find(|c| c.conn == conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_exclusivity() {
        let mut manager = LayoutManager::default();
        manager.register(1, "rivertile", 3).unwrap();
        assert_eq!(
            manager.register(2, "rivertile", 3),
            Err(LayoutError::NamespaceInUse("rivertile".into()))
        );
        assert_eq!(manager.disconnect(1), Some("rivertile".into()));
        manager.register(2, "rivertile", 2).unwrap();
        assert_eq!(manager.binding_for("rivertile").unwrap().conn, 2);
    }

    #[test]
    fn version_bounds() {
        let mut manager = LayoutManager::default();
        assert_eq!(manager.register(1, "x", 0), Err(LayoutError::UnsupportedVersion(0)));
        assert_eq!(manager.register(1, "x", 9), Err(LayoutError::UnsupportedVersion(9)));
    }
}
