mod pair;
mod value;

pub use pair::Pair;
pub use value::Value;
