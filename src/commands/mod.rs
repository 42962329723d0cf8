pub mod calk;
pub mod inspect;
pub mod load;
pub mod status;
