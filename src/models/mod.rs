//! Domain models

pub mod book;
pub mod category;
pub mod enums;
pub mod loan;
pub mod user;
