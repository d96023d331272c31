pub mod pesticide;
pub mod research;
pub mod source;
pub mod topic;

pub use pesticide::{PesticideRecord, PesticideRow, PesticideTable, PUMP_VOLUME_LITRES};
pub use research::ResearchBrief;
pub use source::SourceText;
pub use topic::{parse_topic_lines, ExtractedTopic};
