//! Access control seam.

use ballast_core::AccountId;

/// Authorization collaborator for broker operations.
pub trait AccessPolicy: Send + Sync {
    /// Whether `caller` may open trades through the broker.
    fn may_open_trades(&self, caller: &AccountId) -> bool;

    /// Whether `caller` holds the administrative role.
    fn is_admin(&self, caller: &AccountId) -> bool;
}

/// Fixed role assignment: the primary backing manager, two basket-reward
/// traders, and one administrator.
///
/// Exactly these three basket-management roles may open trades; nobody
/// else, including the administrator.
#[derive(Debug, Clone)]
pub struct StaticRoles {
    backing_manager: AccountId,
    reward_traders: [AccountId; 2],
    admin: AccountId,
}

impl StaticRoles {
    pub fn new(
        backing_manager: AccountId,
        reward_traders: [AccountId; 2],
        admin: AccountId,
    ) -> Self {
        Self {
            backing_manager,
            reward_traders,
            admin,
        }
    }
}

impl AccessPolicy for StaticRoles {
    fn may_open_trades(&self, caller: &AccountId) -> bool {
        caller == &self.backing_manager || self.reward_traders.contains(caller)
    }

    fn is_admin(&self, caller: &AccountId) -> bool {
        caller == &self.admin
    }
}
