pub mod cut_out_store;
pub mod cut_out_update;
pub mod preview;

pub use cut_out_store::{CutOutStore, CutOutWrite, SeaOrmCutOutStore, StoreError};
pub use cut_out_update::{CutOutUpdate, UpdateError};
