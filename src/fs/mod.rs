pub mod locking;

pub use locking::{atomic_write, backup_path, locked_read, write_with_backup, IndexLock};
