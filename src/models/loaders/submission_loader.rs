use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, FileError};
use crate::models::image::{EncodedImage, ImagePair};
use crate::models::task_type::TaskType;

/// 提交清单（TOML）
///
/// ```toml
/// task_type = "combined"
///
/// [[tasks]]
/// prompt = "p6_prompt.jpg"
/// answer = "p6_answer.jpg"
///
/// [[tasks]]
/// prompt = "p7_prompt.jpg"
/// answer = "data:image/png;base64,iVBORw0KGgo="
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionManifest {
    pub task_type: TaskType,
    #[serde(default)]
    pub tasks: Vec<ManifestTask>,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

/// 清单中的一道题
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestTask {
    /// 题目图片：文件路径或 data URL
    pub prompt: String,
    /// 作答图片：文件路径或 data URL
    pub answer: String,
}

/// 加载完成、图片已编码的提交
#[derive(Debug, Clone)]
pub struct Submission {
    pub task_type: TaskType,
    pub pairs: Vec<ImagePair>,
}

/// 从 TOML 文件加载提交清单
pub async fn load_submission_manifest(path: &Path) -> Result<SubmissionManifest> {
    if !path.exists() {
        return Err(AppError::from(FileError::NotFound {
            path: path.display().to_string(),
        })
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let mut manifest: SubmissionManifest =
        toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;

    manifest.file_path = Some(path.to_path_buf());

    Ok(manifest)
}

/// 加载清单并读取、编码其中所有图片
///
/// 相对路径以清单所在目录为基准
pub async fn load_submission(path: &Path) -> Result<Submission> {
    let manifest = load_submission_manifest(path).await?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    info!(
        "📄 已加载提交清单: 题型 {}，共 {} 道题",
        manifest.task_type,
        manifest.tasks.len()
    );

    let mut pairs = Vec::with_capacity(manifest.tasks.len());
    for (idx, task) in manifest.tasks.iter().enumerate() {
        let prompt_image = load_image(&task.prompt, base_dir)
            .await
            .with_context(|| format!("第 {} 题的题目图片加载失败", idx + 1))?;
        let answer_image = load_image(&task.answer, base_dir)
            .await
            .with_context(|| format!("第 {} 题的作答图片加载失败", idx + 1))?;
        pairs.push(ImagePair::new(prompt_image, answer_image));
    }

    Ok(Submission {
        task_type: manifest.task_type,
        pairs,
    })
}

/// 读取单张图片：data URL 直接解析，否则按文件路径读取
pub async fn load_image(source: &str, base_dir: &Path) -> Result<EncodedImage> {
    if source.trim_start().starts_with("data:") {
        return Ok(EncodedImage::from_data_url(source)?);
    }

    let path = base_dir.join(source);
    let bytes = fs::read(&path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    debug!("读取图片 {} ({} 字节)", path.display(), bytes.len());

    Ok(EncodedImage::from_bytes(
        &bytes,
        EncodedImage::mime_type_for_path(&path),
    ))
}
