pub mod catalog;
pub mod storage;

pub use catalog::{
    Color, CutOutStatus, CutType, Fabric, IdentityField, IdentityFields, Position, ProductModel,
    derive_key,
};
