use serde::Serialize;

/// What a pack grants once paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Grant {
    Credits { credits: i32 },
    Subscription { plan: &'static str, days: i32 },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pack {
    pub id: &'static str,
    pub name: &'static str,
    /// Smallest currency unit (paise).
    pub amount: i64,
    pub currency: &'static str,
    pub grant: Grant,
}

impl Pack {
    pub fn credits_to_add(&self) -> i32 {
        match self.grant {
            Grant::Credits { credits } => credits,
            Grant::Subscription { .. } => 0,
        }
    }
}

pub const PRO_PLAN: &str = "pro";
pub const SUBSCRIPTION_DAYS: i32 = 30;

pub static PACKS: [Pack; 3] = [
    Pack {
        id: "starter",
        name: "Starter",
        amount: 9_900,
        currency: "INR",
        grant: Grant::Credits { credits: 10 },
    },
    Pack {
        id: "growth",
        name: "Growth",
        amount: 24_900,
        currency: "INR",
        grant: Grant::Credits { credits: 30 },
    },
    Pack {
        id: "pro_monthly",
        name: "Pro (30 days)",
        amount: 49_900,
        currency: "INR",
        grant: Grant::Subscription {
            plan: PRO_PLAN,
            days: SUBSCRIPTION_DAYS,
        },
    },
];

pub fn find_pack(id: &str) -> Option<&'static Pack> {
    PACKS.iter().find(|pack| pack.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_catalog() {
        let starter = find_pack("starter").unwrap();
        assert_eq!(starter.amount, 9_900);
        assert_eq!(starter.credits_to_add(), 10);

        let growth = find_pack("growth").unwrap();
        assert_eq!(growth.credits_to_add(), 30);

        let pro = find_pack("pro_monthly").unwrap();
        assert_eq!(pro.credits_to_add(), 0);
        assert_eq!(
            pro.grant,
            Grant::Subscription {
                plan: "pro",
                days: 30
            }
        );
        assert!(find_pack("enterprise").is_none());
    }

    #[test]
    fn test_grant_serializes_with_kind_tag() {
        let json = serde_json::to_value(find_pack("starter").unwrap()).unwrap();
        assert_eq!(json["grant"]["kind"], "credits");
        assert_eq!(json["grant"]["credits"], 10);
    }
}
