pub mod article_saver;
pub mod document_exporter;
pub mod dose_normalizer;
pub mod prompt_builder;
pub mod text_extractor;

pub use article_saver::ArticleSaver;
pub use document_exporter::{build_docx, ExportedArticle, DOCX_CONTENT_TYPE};
pub use dose_normalizer::{parse_label_claims, pump_dose};
pub use text_extractor::{extract_file, extract_files, extract_text, PagedDocument, PdfDocument};
