pub mod task;
pub mod user;

pub use task::{CreateTaskInput, NewTask, Task, TaskFilter, TaskStatus, MAX_TASK_NAME_LEN};
pub use user::{User, UserCredentials};
