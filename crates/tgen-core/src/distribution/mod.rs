//! Каталог параметрических распределений

pub mod family;
mod special;

pub use family::{Family, Support};
