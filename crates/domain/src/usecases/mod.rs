//! Application use cases / business logic

pub mod generate;
pub mod import;
pub mod publish;
pub mod scan;
pub mod scheduler;

pub use generate::{ArticleLength, GenerateArticle, GenerateArticleError, GenerateRequest};
pub use import::{ImportArticles, ImportArticlesError};
pub use publish::{AutoCommitConfig, PublishConfig, PublishWorkflow, PublishWorkflowError};
pub use scan::{PUBLISH_CHECK_JOB, ScanPendingArticles};
pub use scheduler::{
    JobStatus, ScheduleTrigger, ScheduledJob, Scheduler, SchedulerError, SchedulerStatus,
    StartOutcome,
};
