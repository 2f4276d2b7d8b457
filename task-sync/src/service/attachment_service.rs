// task-sync/src/service/attachment_service.rs

use crate::domain::task_attachment_model::{FileUpload, NewTaskAttachment, TaskAttachment};
use crate::domain::SessionContext;
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::attachment_repository::AttachmentRepository;
use crate::service::storage_service::{file_extension, sanitize_filename, StorageService};
use crate::utils::error_helper::{not_found_error, validation_error};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct AttachmentService {
    attachment_repo: Arc<dyn AttachmentRepository>,
    storage: Arc<dyn StorageService>,
}

impl AttachmentService {
    pub fn new(
        attachment_repo: Arc<dyn AttachmentRepository>,
        storage: Arc<dyn StorageService>,
    ) -> Self {
        Self {
            attachment_repo,
            storage,
        }
    }

    /// タスクの添付ファイル一覧
    pub async fn list(&self, task_id: i64) -> AppResult<Vec<TaskAttachment>> {
        self.attachment_repo.list_by_task(task_id).await
    }

    /// ファイルをアップロード
    pub async fn upload(
        &self,
        session: &SessionContext,
        task_id: i64,
        file: FileUpload,
    ) -> AppResult<TaskAttachment> {
        let uploaded_by = session.employee_id.ok_or_else(|| {
            validation_error(
                "uploaded_by",
                "A signed-in employee is required to upload attachments",
            )
        })?;

        // ファイル名のサニタイゼーション
        let sanitized_filename = sanitize_filename(&file.file_name);
        if sanitized_filename.is_empty() {
            return Err(AppError::BadRequest("Invalid file name".to_string()));
        }
        if file.data.is_empty() {
            return Err(validation_error("file", "File is empty"));
        }

        let storage_path = storage_path(task_id, &file.file_name);
        let file_size = file.data.len() as u64;
        let mime_type = (!file.mime_type.is_empty()).then(|| file.mime_type.clone());

        // ストレージにアップロード
        let file_url = self
            .storage
            .upload(&storage_path, file.data, &file.mime_type)
            .await?;

        // メタデータを保存
        let attachment = self
            .attachment_repo
            .create(NewTaskAttachment {
                task_id,
                file_name: sanitized_filename,
                file_url,
                file_path: storage_path.clone(),
                file_size,
                mime_type,
                uploaded_by,
            })
            .await;
        let attachment = match attachment {
            Ok(attachment) => attachment,
            Err(e) => {
                // メタデータの保存に失敗したらアップロード済みのファイルを削除する
                if let Err(cleanup) = self.storage.delete(&storage_path).await {
                    log_with_context!(
                        tracing::Level::WARN,
                        "Failed to remove stored file after metadata insert failed",
                        "task_id" => task_id,
                        "file_path" => &storage_path,
                        "error" => cleanup.to_string()
                    );
                }
                return Err(e);
            }
        };

        log_with_context!(
            tracing::Level::INFO,
            "Attachment uploaded",
            "task_id" => task_id,
            "attachment_id" => attachment.id,
            "file_size" => file_size,
            "uploaded_by" => uploaded_by
        );

        Ok(attachment)
    }

    /// 添付ファイルを削除
    ///
    /// メタデータ行を先に削除する。ストレージ側の削除に失敗しても成功として扱う。
    pub async fn delete(&self, attachment_id: i64) -> AppResult<()> {
        let attachment = self
            .attachment_repo
            .find_by_id(attachment_id)
            .await?
            .ok_or_else(|| {
                not_found_error(
                    "Attachment",
                    &attachment_id.to_string(),
                    "attachment_service::delete",
                )
            })?;

        self.attachment_repo.delete(attachment_id).await?;

        if let Err(e) = self.storage.delete(&attachment.file_path).await {
            log_with_context!(
                tracing::Level::WARN,
                "Stored file left behind after attachment delete",
                "attachment_id" => attachment_id,
                "file_path" => &attachment.file_path,
                "error" => e.to_string()
            );
        }

        Ok(())
    }

    /// タスクの添付ファイルをまとめて削除する（タスク削除の前段）
    ///
    /// メタデータ行を先に削除する。一覧の取得失敗とストレージ側の削除失敗は
    /// ログに残して続行し、行の削除失敗はエラーとして返す。
    pub async fn delete_for_task(&self, task_id: i64) -> AppResult<usize> {
        let attachments = match self.attachment_repo.list_by_task(task_id).await {
            Ok(attachments) => attachments,
            Err(e) => {
                log_with_context!(
                    tracing::Level::WARN,
                    "Failed to list attachments before task delete",
                    "task_id" => task_id,
                    "error" => e.to_string()
                );
                return Ok(0);
            }
        };
        if attachments.is_empty() {
            return Ok(0);
        }

        self.attachment_repo.delete_by_task(task_id).await?;

        for attachment in &attachments {
            if let Err(e) = self.storage.delete(&attachment.file_path).await {
                log_with_context!(
                    tracing::Level::WARN,
                    "Stored file left behind after task delete",
                    "task_id" => task_id,
                    "file_path" => &attachment.file_path,
                    "error" => e.to_string()
                );
            }
        }

        log_with_context!(
            tracing::Level::DEBUG,
            "Task attachments deleted",
            "task_id" => task_id,
            "count" => attachments.len()
        );
        Ok(attachments.len())
    }
}

/// `{task_id}/{timestamp}_{random}.{ext}`
fn storage_path(task_id: i64, file_name: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let stem = format!("{}_{}", Utc::now().timestamp_millis(), &random[..8]);
    match file_extension(file_name) {
        Some(ext) => format!("{}/{}.{}", task_id, stem, ext),
        None => format!("{}/{}", task_id, stem),
    }
}
