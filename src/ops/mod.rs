pub mod archive;
pub mod task_ops;
pub mod view;
