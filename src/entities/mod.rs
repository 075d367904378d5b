//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod admin;
pub mod collection_log;
pub mod composting_process;
pub mod customer;
pub mod pickup_request;
pub mod user;

// Re-export specific types to avoid conflicts
pub use admin::{Column as AdminColumn, Entity as Admin, Model as AdminModel};
pub use collection_log::{
    Column as CollectionLogColumn, Entity as CollectionLog, Model as CollectionLogModel,
};
pub use composting_process::{
    Column as CompostingProcessColumn, Entity as CompostingProcess,
    Model as CompostingProcessModel,
};
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use pickup_request::{
    Column as PickupRequestColumn, Entity as PickupRequest, Model as PickupRequestModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
