// src/service/mod.rs
pub mod attachment_service;
pub mod comment_service;
pub mod field_translator;
pub mod filter_engine;
pub mod modal_coordinator;
pub mod relation_resolver;
pub mod storage_service;
pub mod subtask_service;
pub mod task_operations;
pub mod task_stats;
pub mod task_store;

pub use field_translator::FieldTranslator;
pub use filter_engine::{FilterEngine, FilterState, FilterUpdate, TimeView};
pub use modal_coordinator::{ModalCoordinator, ModalState};
pub use relation_resolver::{RelationResolver, RelationSelection};
pub use task_operations::TaskOperations;
pub use task_stats::TaskStats;
pub use task_store::{ReloadScheduler, TaskStore};
