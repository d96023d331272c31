//! 文章保存服务
//!
//! 把导出的 docx 写到输出目录（相当于网页中的"下载"）。
//! 文件名固定，重复导出会覆盖上一次的文件。

use std::path::PathBuf;

use tracing::debug;

use crate::error::{AppResult, FileError};
use crate::services::document_exporter::ExportedArticle;

/// 文章保存服务
pub struct ArticleSaver {
    output_dir: PathBuf,
}

impl ArticleSaver {
    /// 使用指定目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: dir.into(),
        }
    }

    /// 写入文件，返回完整路径
    pub async fn save(&self, article: &ExportedArticle) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| FileError::CreateDirFailed {
                path: self.output_dir.display().to_string(),
                source,
            })?;

        let path = self.output_dir.join(&article.file_name);
        debug!("写入 {} ({} 字节)", path.display(), article.bytes.len());

        tokio::fs::write(&path, &article.bytes)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::document_exporter::DOCX_CONTENT_TYPE;

    #[tokio::test]
    async fn test_save_overwrites_same_name() {
        let dir = std::env::temp_dir().join(format!("agri_saver_{}", std::process::id()));
        let saver = ArticleSaver::with_dir(&dir);

        let mut article = ExportedArticle {
            file_name: "Sandesh_Agri_Article.docx".to_string(),
            content_type: DOCX_CONTENT_TYPE,
            bytes: vec![1, 2, 3],
        };
        let first = saver.save(&article).await.unwrap();

        article.bytes = vec![4, 5];
        let second = saver.save(&article).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(tokio::fs::read(&second).await.unwrap(), vec![4, 5]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
