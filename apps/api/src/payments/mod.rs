// Payments: credit packs and the pro subscription, sold through a pluggable
// payment gateway (Razorpay by default) and confirmed by signature check.

pub mod gateway;
pub mod handlers;
pub mod packs;
pub mod signature;
