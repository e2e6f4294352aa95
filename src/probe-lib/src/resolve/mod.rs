pub mod lookup;
pub mod variables;

pub use lookup::{find_flow, find_request};
pub use variables::{resolve, substitute, Substitution, Substitutor, VariableTable};
