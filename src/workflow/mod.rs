pub mod article_flow;
pub mod session;

pub use article_flow::{ApiKeys, ArticleFlow, TopicOutcome};
pub use session::{Session, Stage};
