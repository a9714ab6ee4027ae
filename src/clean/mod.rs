//! Normalizers: each takes a table and returns a new one with one family of
//! columns typed and validated.

pub mod gratuit;
pub mod location;
pub mod numeric;
pub mod temporal;
pub mod text;
pub mod utils;

pub use gratuit::{clean_gratuit, Gratuity};
pub use location::clean_location;
pub use numeric::clean_numeric;
pub use temporal::clean_temporal;
pub use text::clean_text;
