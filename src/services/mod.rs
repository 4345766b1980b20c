pub mod abci;
pub mod account;
pub mod balance;
pub mod status;
pub mod staking;
pub mod tx;

pub use abci::AbciService;
pub use account::AccountService;
pub use balance::BalanceService;
pub use staking::{DistributionService, StakingService};
pub use status::{NodeInfoService, StatusService};
pub use tx::TxService;
