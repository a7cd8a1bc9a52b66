//! 上传图片的命名、路径解析与响应头工具

use chrono::Utc;
use std::path::{Path, PathBuf};

pub const STORED_FILENAME_PREFIX: &str = "coffee_";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 生成存储文件名：`coffee_<毫秒时间戳>.<原扩展名>`
///
/// 同一毫秒内上传的同扩展名文件会得到相同的名字，后写入者覆盖前者。
pub fn stored_filename(original_filename: &str) -> String {
    stored_filename_at(original_filename, Utc::now().timestamp_millis())
}

pub fn stored_filename_at(original_filename: &str, timestamp_millis: i64) -> String {
    match extension_of(original_filename) {
        Some(ext) => format!("{STORED_FILENAME_PREFIX}{timestamp_millis}.{ext}"),
        None => format!("{STORED_FILENAME_PREFIX}{timestamp_millis}"),
    }
}

/// 原始文件名去掉最后一个扩展名后的部分
pub fn original_stem(original_filename: &str) -> String {
    let name = base_name(original_filename);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

fn extension_of(filename: &str) -> Option<String> {
    let name = base_name(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_string())
}

/// 将文件名解析到上传目录下；含路径分隔符或 `..` 的名字返回 `None`
pub fn resolve_in(upload_dir: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty()
        || filename.contains(['/', '\\'])
        || filename == "."
        || filename.contains("..")
    {
        return None;
    }
    Some(upload_dir.join(filename))
}

/// 按扩展名推断 Content-Type
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// `attachment; filename*="<url 编码文件名>"`
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename*=\"{}\"",
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_filename_keeps_extension() {
        assert_eq!(
            stored_filename_at("latte.JPG", 1_700_000_000_123),
            "coffee_1700000000123.JPG"
        );
        assert_eq!(
            stored_filename_at("my.cafe.photo.png", 5),
            "coffee_5.png"
        );
        assert_eq!(stored_filename_at("receipt", 5), "coffee_5");
        assert_eq!(stored_filename_at(".hidden", 5), "coffee_5");
        assert!(stored_filename("a.png").starts_with(STORED_FILENAME_PREFIX));
    }

    #[test]
    fn test_original_stem() {
        assert_eq!(original_stem("latte.jpg"), "latte");
        assert_eq!(original_stem("my.cafe.photo.png"), "my.cafe.photo");
        assert_eq!(original_stem("receipt"), "receipt");
        assert_eq!(original_stem("C:\\photos\\mocha.png"), "mocha");
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            resolve_in(dir, "coffee_1.png"),
            Some(PathBuf::from("/srv/uploads/coffee_1.png"))
        );
        assert_eq!(resolve_in(dir, "../etc/passwd"), None);
        assert_eq!(resolve_in(dir, "a/b.png"), None);
        assert_eq!(resolve_in(dir, ".."), None);
        assert_eq!(resolve_in(dir, ""), None);
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(content_type_for("coffee_1.png"), "image/png");
        assert_eq!(content_type_for("coffee_1.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("coffee_1.webp"), "image/webp");
        assert_eq!(content_type_for("coffee_1"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("coffee_1.unknown"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_content_disposition_encodes_name() {
        assert_eq!(
            content_disposition("coffee_1.png"),
            "attachment; filename*=\"coffee_1.png\""
        );
        assert_eq!(
            content_disposition("라떼 1.png"),
            "attachment; filename*=\"%EB%9D%BC%EB%96%BC%201.png\""
        );
    }
}
