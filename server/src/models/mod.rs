// server/src/models/mod.rs

//! Data structures mirroring the database tables.

pub mod address;
pub mod delivery_partner;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod payment_transaction;
pub mod restaurant;
pub mod user;

pub use address::Address;
pub use delivery_partner::DeliveryPartner;
pub use menu_item::MenuItem;
pub use order::{Order, OrderStatus, PaymentStatus};
pub use order_item::OrderItem;
pub use payment_transaction::PaymentTransaction;
pub use restaurant::{ApprovalStatus, Restaurant};
pub use user::{Role, User};
