//! 图片数据模型
//!
//! 图片以 base64 编码后原样发送给模型，本地不做任何内容校验。

use std::path::Path;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use crate::error::{ImageSlot, InputError};
use crate::utils::logging::truncate_text;

/// 原始实现统一按 JPEG 上传
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

fn data_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:(?P<mime>[\w.+-]+/[\w.+-]+);base64,(?P<data>.*)$")
            .expect("data URL 正则表达式无效")
    })
}

/// 已编码的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME 类型，例如 `image/jpeg`
    pub mime_type: String,
    /// base64 编码的图片内容
    pub data: String,
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// 从原始字节编码
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// 解析 `data:image/png;base64,...` 形式的 data URL
    pub fn from_data_url(url: &str) -> Result<Self, InputError> {
        let caps = data_url_regex()
            .captures(url.trim())
            .ok_or_else(|| InputError::InvalidDataUrl {
                preview: truncate_text(url, 32),
            })?;

        Ok(Self::new(&caps["mime"], &caps["data"]))
    }

    /// 根据文件扩展名推断 MIME 类型
    pub fn mime_type_for_path(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("heic") => "image/heic",
            Some("gif") => "image/gif",
            _ => DEFAULT_MIME_TYPE,
        }
    }

    /// 转换为请求中使用的 data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }
}

/// 一道题的图片组：题目图片 + 作答图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub prompt_image: EncodedImage,
    pub answer_image: EncodedImage,
}

impl ImagePair {
    pub fn new(prompt_image: EncodedImage, answer_image: EncodedImage) -> Self {
        Self {
            prompt_image,
            answer_image,
        }
    }

    /// 校验两张图片都非空
    ///
    /// `task_number` 从 1 开始，仅用于错误提示
    pub fn ensure_non_empty(&self, task_number: usize) -> Result<(), InputError> {
        if self.prompt_image.is_empty() {
            return Err(InputError::EmptyImage {
                task_number,
                slot: ImageSlot::Prompt,
            });
        }
        if self.answer_image.is_empty() {
            return Err(InputError::EmptyImage {
                task_number,
                slot: ImageSlot::Answer,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_url_splits_mime_and_payload() {
        let image = EncodedImage::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "iVBORw0KGgo=");
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_from_data_url_rejects_plain_text() {
        let err = EncodedImage::from_data_url("hello world").unwrap_err();
        assert!(matches!(err, InputError::InvalidDataUrl { .. }));
    }

    #[test]
    fn test_from_bytes_encodes_base64() {
        let image = EncodedImage::from_bytes(b"abc", "image/jpeg");
        assert_eq!(image.data, "YWJj");
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(EncodedImage::mime_type_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(EncodedImage::mime_type_for_path(Path::new("a.png")), "image/png");
        assert_eq!(EncodedImage::mime_type_for_path(Path::new("scan")), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_ensure_non_empty_reports_slot() {
        let pair = ImagePair::new(
            EncodedImage::new("image/jpeg", "YWJj"),
            EncodedImage::new("image/jpeg", "  "),
        );
        match pair.ensure_non_empty(2) {
            Err(InputError::EmptyImage { task_number, slot }) => {
                assert_eq!(task_number, 2);
                assert_eq!(slot, ImageSlot::Answer);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
