pub mod backend;
pub mod notify;
pub mod repository;

pub use backend::{FormBackend, HttpBackend, MemoryBackend};
pub use notify::{Notice, NoticeKind, NoticeLog, Notifier};
pub use repository::{LocalStorageRepository, MemoryRepository, TemplateRepository};
