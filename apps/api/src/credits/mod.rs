// Credits: per-user usage counters gating paid features, plus the plan check
// that lets active subscribers skip deduction.

pub mod handlers;
pub mod ledger;
