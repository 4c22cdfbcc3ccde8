pub mod archive;
pub mod executor;
pub mod lock;
pub mod repository;

pub use archive::*;
pub use executor::*;
pub use lock::file::FileLockManager;
pub use lock::*;
pub use repository::*;
