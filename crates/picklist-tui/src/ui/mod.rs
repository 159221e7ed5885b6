pub(crate) mod modal;
pub(crate) mod task_table;
pub(crate) mod text;
pub(crate) mod worker;
