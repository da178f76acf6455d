//! Memory Layer - In-Memory State Management
//!
//! 实现 JobQueue，管理任务注册表和分发队列的内存状态

mod job_queue;

pub use job_queue::InMemoryJobQueue;
