pub mod manager;
pub mod record;
pub mod store;

pub use manager::{is_valid_index_name, StorageManager};
pub use record::{timestamp, IndexRecord};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
