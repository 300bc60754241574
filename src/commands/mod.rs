pub mod apply;
pub mod declarative_apply;
pub mod plan;
pub mod sync;

pub use apply::cmd_apply;
pub use declarative_apply::cmd_declarative_apply;
pub use plan::cmd_plan;
pub use sync::cmd_sync;
