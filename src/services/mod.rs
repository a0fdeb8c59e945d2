pub mod carts;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod users;
pub mod vip;
