use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Subscription tier governing entitlement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Monthly,
    Yearly,
}

impl Plan {
    /// Paid plans bypass the free-usage meter entirely.
    pub fn is_paid(&self) -> bool {
        matches!(self, Plan::Monthly | Plan::Yearly)
    }
}
