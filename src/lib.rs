pub mod config;
pub mod constants;
pub mod eligibility;
pub mod logger;
pub mod retry;
pub mod runner;
pub mod signer;
pub mod utils;
pub mod writer;
