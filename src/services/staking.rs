use crate::types::{
    DelegationsResponse, Pagination, RewardsResponse, UnbondingDelegationsResponse,
};

/// Staking endpoints are served as empty sets: the backing chain has no
/// Cosmos-style staking module, but wallets still probe these routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StakingService;

impl StakingService {
    pub fn delegations(&self, _delegator_addr: &str) -> DelegationsResponse {
        DelegationsResponse {
            delegation_responses: Vec::new(),
            pagination: Pagination::empty(),
        }
    }

    pub fn unbonding_delegations(&self, _delegator_addr: &str) -> UnbondingDelegationsResponse {
        UnbondingDelegationsResponse {
            unbonding_responses: Vec::new(),
            pagination: Pagination::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionService;

impl DistributionService {
    pub fn rewards(&self, _delegator_address: &str) -> RewardsResponse {
        RewardsResponse {
            rewards: Vec::new(),
            total: Vec::new(),
        }
    }
}
