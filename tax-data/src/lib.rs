pub mod loader;

pub use loader::{PendingRecordLoader, PendingRecordLoaderError, PendingRecordRow};
