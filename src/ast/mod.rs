pub mod condition;
pub mod data_type;
pub mod expression;
pub mod trace;
pub mod value;

pub use condition::*;
pub use data_type::*;
pub use expression::*;
pub use trace::*;
pub use value::*;
