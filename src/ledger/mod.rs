pub mod balance;
pub mod policy;
pub mod workflow;

/// Tuning knobs for balance materialization and commit retries, lifted out
/// of `Config` so the ledger never reads the environment itself.
#[derive(Debug, Clone, Copy)]
pub struct LedgerSettings {
    /// How many prior years the carry-forward computation may walk back.
    /// 1 matches annual-reset semantics; 0 disables carry-forward entirely.
    pub carry_forward_lookback: u32,
    /// Attempts before a contended balance commit surfaces ConflictError.
    pub balance_commit_retries: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            carry_forward_lookback: 1,
            balance_commit_retries: 3,
        }
    }
}
