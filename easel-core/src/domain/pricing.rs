//! Credit policy: grants, costs, sentinel balances, purchase plans

use serde::Serialize;

/// Credits granted to every fresh signup
pub const SIGNUP_GRANT: i64 = 25;

/// Credits granted by the weekly top-up
pub const WEEKLY_TOPUP: i64 = 25;

/// Rolling top-up window: seven days in milliseconds
pub const WEEKLY_TOPUP_INTERVAL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Fixed balance carried by administrator accounts. Costs are zeroed for
/// administrators, so this never moves.
pub const ADMIN_CREDITS: i64 = 9999;

/// The chargeable generation operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Image,
    Thumbnail,
    Chat,
    Animation,
}

impl GenerationKind {
    /// Base cost in credits
    pub fn cost(self) -> i64 {
        match self {
            GenerationKind::Image => 5,
            GenerationKind::Thumbnail => 10,
            GenerationKind::Chat => 1,
            GenerationKind::Animation => 5,
        }
    }

    /// Cost charged to a given account (administrators pay nothing)
    pub fn cost_for(self, is_admin: bool) -> i64 {
        if is_admin {
            0
        } else {
            self.cost()
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GenerationKind::Image => "image",
            GenerationKind::Thumbnail => "thumbnail",
            GenerationKind::Chat => "chat message",
            GenerationKind::Animation => "animation",
        }
    }
}

/// A manual top-up plan: credits bought for a fixed price, fulfilled by an
/// administrator grant after payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPlan {
    pub credits: i64,
    /// Price in whole rupees
    pub price: i64,
    pub plan_id: &'static str,
}

/// The purchasable credit plans, smallest first
pub const CREDIT_PLANS: [CreditPlan; 3] = [
    CreditPlan {
        credits: 200,
        price: 199,
        plan_id: "plan_1",
    },
    CreditPlan {
        credits: 500,
        price: 499,
        plan_id: "plan_2",
    },
    CreditPlan {
        credits: 1500,
        price: 999,
        plan_id: "plan_3",
    },
];
