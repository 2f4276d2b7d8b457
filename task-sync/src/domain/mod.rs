// src/domain/mod.rs
pub mod related_entity;
pub mod session;
pub mod subtask_model;
pub mod task_attachment_model;
pub mod task_comment_model;
pub mod task_command;
pub mod task_domain;
pub mod task_model;
pub mod task_priority;
pub mod task_status;

pub use related_entity::{EntityPreview, RelatedEntity, RelatedEntityType, RelatedMeeting};
pub use session::SessionContext;
pub use task_command::TaskCommand;
pub use task_domain::TaskDomain;
pub use task_model::{Assignee, Task, TaskDraft, TaskId};
pub use task_priority::TaskPriority;
pub use task_status::TaskStatus;
