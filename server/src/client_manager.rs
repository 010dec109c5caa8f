//! Role slots for the current round
//!
//! Clients are identified by nothing but their transport address. The
//! manager holds at most one Cman address, at most one Ghost address, and any
//! number of watchers, and an address can hold only one of those at a time.

use log::info;
use shared::{ErrorCode, Role};
use std::net::SocketAddr;

#[derive(Debug, Default)]
pub struct ClientManager {
    cman: Option<SocketAddr>,
    ghost: Option<SocketAddr>,
    /// Kept in join order so broadcasts go out in a stable order
    watchers: Vec<SocketAddr>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The role `addr` currently holds, if it joined.
    pub fn role_of(&self, addr: SocketAddr) -> Option<Role> {
        if self.cman == Some(addr) {
            Some(Role::Cman)
        } else if self.ghost == Some(addr) {
            Some(Role::Ghost)
        } else if self.watchers.contains(&addr) {
            Some(Role::Spectator)
        } else {
            None
        }
    }

    /// Assigns `role` to `addr`. An address that already holds any role is
    /// rejected, as is a player role whose slot is occupied.
    pub fn join(&mut self, addr: SocketAddr, role: Role) -> Result<(), ErrorCode> {
        if self.role_of(addr).is_some() {
            return Err(ErrorCode::AlreadyJoined);
        }

        match role {
            Role::Spectator => self.watchers.push(addr),
            Role::Cman if self.cman.is_none() => self.cman = Some(addr),
            Role::Cman => return Err(ErrorCode::CmanTaken),
            Role::Ghost if self.ghost.is_none() => self.ghost = Some(addr),
            Role::Ghost => return Err(ErrorCode::GhostTaken),
        }

        info!("{} joined as {}", addr, role);
        Ok(())
    }

    /// Releases whatever `addr` holds. Returns the role it had.
    pub fn remove(&mut self, addr: SocketAddr) -> Option<Role> {
        let role = self.role_of(addr)?;
        match role {
            Role::Cman => self.cman = None,
            Role::Ghost => self.ghost = None,
            Role::Spectator => self.watchers.retain(|watcher| *watcher != addr),
        }
        info!("{} left the {} slot", addr, role);
        Some(role)
    }

    pub fn both_players_joined(&self) -> bool {
        self.cman.is_some() && self.ghost.is_some()
    }

    pub fn cman(&self) -> Option<SocketAddr> {
        self.cman
    }

    pub fn ghost(&self) -> Option<SocketAddr> {
        self.ghost
    }

    pub fn watchers(&self) -> &[SocketAddr] {
        &self.watchers
    }

    /// Every joined address with its role: Cman, then Ghost, then watchers.
    pub fn recipients(&self) -> Vec<(SocketAddr, Role)> {
        let players = [(self.cman, Role::Cman), (self.ghost, Role::Ghost)];
        players
            .into_iter()
            .filter_map(|(addr, role)| addr.map(|addr| (addr, role)))
            .chain(self.watchers.iter().map(|addr| (*addr, Role::Spectator)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cman.is_some() as usize + self.ghost.is_some() as usize + self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.cman = None;
        self.ghost = None;
        self.watchers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port)
    }

    #[test]
    fn test_client_manager_creation() {
        let manager = ClientManager::new();
        assert!(manager.is_empty());
        assert!(!manager.both_players_joined());
        assert!(manager.recipients().is_empty());
    }

    #[test]
    fn test_join_each_role() {
        let mut manager = ClientManager::new();
        assert_eq!(manager.join(addr(1), Role::Cman), Ok(()));
        assert_eq!(manager.join(addr(2), Role::Ghost), Ok(()));
        assert_eq!(manager.join(addr(3), Role::Spectator), Ok(()));
        assert_eq!(manager.join(addr(4), Role::Spectator), Ok(()));

        assert!(manager.both_players_joined());
        assert_eq!(manager.len(), 4);
        assert_eq!(manager.role_of(addr(1)), Some(Role::Cman));
        assert_eq!(manager.role_of(addr(2)), Some(Role::Ghost));
        assert_eq!(manager.role_of(addr(4)), Some(Role::Spectator));
        assert_eq!(manager.role_of(addr(5)), None);
    }

    #[test]
    fn test_occupied_slots_are_rejected() {
        let mut manager = ClientManager::new();
        manager.join(addr(1), Role::Cman).unwrap();
        manager.join(addr(2), Role::Ghost).unwrap();

        assert_eq!(manager.join(addr(3), Role::Cman), Err(ErrorCode::CmanTaken));
        assert_eq!(manager.join(addr(3), Role::Ghost), Err(ErrorCode::GhostTaken));
        assert_eq!(manager.cman(), Some(addr(1)));
        assert_eq!(manager.ghost(), Some(addr(2)));
    }

    #[test]
    fn test_rejoin_is_rejected_for_any_role() {
        let mut manager = ClientManager::new();
        manager.join(addr(1), Role::Spectator).unwrap();

        for role in [Role::Spectator, Role::Cman, Role::Ghost] {
            assert_eq!(manager.join(addr(1), role), Err(ErrorCode::AlreadyJoined));
        }
        assert_eq!(manager.watchers(), &[addr(1)]);
        assert_eq!(manager.cman(), None);
    }

    #[test]
    fn test_remove_frees_only_own_slot() {
        let mut manager = ClientManager::new();
        manager.join(addr(1), Role::Cman).unwrap();
        manager.join(addr(2), Role::Ghost).unwrap();
        manager.join(addr(3), Role::Spectator).unwrap();

        assert_eq!(manager.remove(addr(3)), Some(Role::Spectator));
        assert_eq!(manager.ghost(), Some(addr(2)));
        assert_eq!(manager.remove(addr(1)), Some(Role::Cman));
        assert_eq!(manager.cman(), None);
        assert_eq!(manager.remove(addr(9)), None);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_recipients_order() {
        let mut manager = ClientManager::new();
        manager.join(addr(3), Role::Spectator).unwrap();
        manager.join(addr(2), Role::Ghost).unwrap();
        manager.join(addr(1), Role::Cman).unwrap();

        assert_eq!(
            manager.recipients(),
            vec![
                (addr(1), Role::Cman),
                (addr(2), Role::Ghost),
                (addr(3), Role::Spectator)
            ]
        );

        manager.clear();
        assert!(manager.is_empty());
    }
}
