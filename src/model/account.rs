/// Read-only view of the trader's funds, as last reported by the profile endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountSnapshot {
    /// Cash balance in account currency.
    pub balance: f64,
    /// Non-cash buying power.
    pub credit: f64,
    pub access: bool,
}

impl AccountSnapshot {
    pub fn new(balance: f64, credit: f64) -> Self {
        Self {
            balance,
            credit,
            access: true,
        }
    }

    /// Largest margin (and manually entered quantity) the ticket will accept.
    pub fn solvency_ceiling(&self) -> f64 {
        self.balance + self.credit
    }
}
