// task-sync/src/domain/task_attachment_model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// タスク添付ファイル（メタデータ行）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAttachment {
    pub id: i64,
    pub task_id: i64,
    pub file_name: String,
    pub file_url: String,
    /// ストレージ上のオブジェクトキー
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// 添付ファイル行の新規作成データ
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaskAttachment {
    pub task_id: i64,
    pub file_name: String,
    pub file_url: String,
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    pub uploaded_by: i64,
}

/// アップロードするファイル
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// 添付ファイルの種類（一覧表示のアイコン選択用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Image,
    Pdf,
    Document,
    Spreadsheet,
    Presentation,
    Archive,
    Video,
    Audio,
    Other,
}

impl FileKind {
    /// MIMEタイプとファイル拡張子から種類を判定
    pub fn detect(mime_type: Option<&str>, file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let parsed = mime_type.and_then(|m| m.parse::<mime::Mime>().ok());
        let subtype = parsed
            .as_ref()
            .map(|m| m.subtype().as_str().to_lowercase())
            .unwrap_or_default();
        let top = parsed.as_ref().map(|m| m.type_());

        if top == Some(mime::IMAGE)
            || matches!(
                extension.as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp"
            )
        {
            return Self::Image;
        }
        if parsed.as_ref().map(|m| m.essence_str()) == Some(mime::APPLICATION_PDF.essence_str())
            || extension == "pdf"
        {
            return Self::Pdf;
        }
        if subtype.contains("word") || matches!(extension.as_str(), "doc" | "docx") {
            return Self::Document;
        }
        if subtype.contains("sheet")
            || subtype.contains("excel")
            || matches!(extension.as_str(), "xls" | "xlsx")
        {
            return Self::Spreadsheet;
        }
        if subtype.contains("presentation") || matches!(extension.as_str(), "ppt" | "pptx") {
            return Self::Presentation;
        }
        if matches!(extension.as_str(), "zip" | "rar" | "7z" | "tar" | "gz") {
            return Self::Archive;
        }
        if top == Some(mime::VIDEO)
            || matches!(extension.as_str(), "mp4" | "avi" | "mov" | "wmv" | "flv")
        {
            return Self::Video;
        }
        if top == Some(mime::AUDIO) || matches!(extension.as_str(), "mp3" | "wav" | "flac" | "aac")
        {
            return Self::Audio;
        }
        Self::Other
    }
}

/// ファイルサイズを人間向けに整形（1024単位、小数点以下2桁まで）
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}
