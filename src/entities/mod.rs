pub mod cart;
pub mod cart_item;
pub mod order;
pub mod product;
pub mod promotion;
pub mod user_profile;

pub use cart::Entity as Cart;
pub use cart_item::Entity as CartItem;
pub use order::Entity as Order;
pub use product::Entity as Product;
pub use promotion::Entity as Promotion;
pub use user_profile::Entity as UserProfile;

pub type CartModel = cart::Model;
pub type CartItemModel = cart_item::Model;
pub type OrderModel = order::Model;
pub type ProductModel = product::Model;
pub type PromotionModel = promotion::Model;
pub type UserProfileModel = user_profile::Model;
