use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// +1 for buys, -1 for sells.
    pub fn sign(self) -> i64 {
        match self {
            Action::Buy => 1,
            Action::Sell => -1,
        }
    }

    /// Apply the action's sign to an unsigned share count.
    ///
    /// `None` when the count does not fit in an `i64`.
    pub fn signed(self, quantity: u64) -> Option<i64> {
        i64::try_from(quantity).ok().map(|q| self.sign() * q)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BOT"),
            Action::Sell => write!(f, "SLD"),
        }
    }
}
