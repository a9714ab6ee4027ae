//! Derived columns computed from the normalized base columns.

pub mod department;
pub mod power;
pub mod year;

pub use department::{add_department_code, department_code};
pub use power::{add_power_category, PowerCategory};
pub use year::add_commissioning_year;
