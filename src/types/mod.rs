pub mod errors;
pub mod ids;
pub mod node;
pub mod plan;
pub mod report;

pub use errors::*;
pub use ids::*;
pub use node::*;
pub use plan::*;
pub use report::*;
