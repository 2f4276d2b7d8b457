// task-sync/src/service/relation_resolver.rs
//
// 関連エンティティ（学生・リード・社員）の候補リストとプレビューの解決
// 候補リストは種別ごとにTTL付きでキャッシュする

use crate::config::SyncConfig;
use crate::domain::{EntityPreview, RelatedEntity, RelatedEntityType, Task, TaskDomain};
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::relation_directory::{EntityOption, RelationDirectory};
use crate::utils::error_helper::{bad_request_error, validation_error};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct CachedOptions {
    options: Vec<EntityOption>,
    cached_at: DateTime<Utc>,
}

/// 関連エンティティ解決サービス
#[derive(Clone)]
pub struct RelationResolver {
    directory: Arc<dyn RelationDirectory>,
    cache: Arc<RwLock<HashMap<RelatedEntityType, CachedOptions>>>,
    cache_ttl: chrono::Duration,
}

impl RelationResolver {
    pub fn new(directory: Arc<dyn RelationDirectory>, config: &SyncConfig) -> Self {
        Self {
            directory,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl: config.relation_cache_ttl,
        }
    }

    /// 指定種別の候補リストを取得（キャッシュ付き）
    ///
    /// 種別 `None` は常に空。他の種別のリストは返さない。
    pub async fn options_for(&self, kind: RelatedEntityType) -> AppResult<Vec<EntityOption>> {
        if kind == RelatedEntityType::None {
            return Ok(Vec::new());
        }

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&kind) {
                let age = Utc::now() - cached.cached_at;
                if age < self.cache_ttl {
                    log_with_context!(
                        tracing::Level::DEBUG,
                        "Cache hit for relation options",
                        "kind" => kind,
                        "cache_age_seconds" => age.num_seconds()
                    );
                    return Ok(cached.options.clone());
                }
            }
        }

        let options = match kind {
            RelatedEntityType::Student => self.directory.list_students().await?,
            RelatedEntityType::Lead => self.directory.list_leads().await?,
            RelatedEntityType::Employee => self.directory.list_employees().await?,
            RelatedEntityType::None => Vec::new(),
        };

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                kind,
                CachedOptions {
                    options: options.clone(),
                    cached_at: Utc::now(),
                },
            );
        }

        log_with_context!(
            tracing::Level::DEBUG,
            "Relation options cached",
            "kind" => kind,
            "count" => options.len()
        );

        Ok(options)
    }

    /// 関連エンティティの表示用プレビュー（候補に存在しない場合は `None`）
    pub async fn preview_for(&self, entity: RelatedEntity) -> AppResult<Option<EntityPreview>> {
        let Some(id) = entity.id() else {
            return Ok(None);
        };
        let options = self.options_for(entity.kind()).await?;
        Ok(options
            .into_iter()
            .find(|option| option.id == id)
            .map(|option| preview_from_option(entity, option)))
    }

    /// プレビューを持たないタスクに現在の関連エンティティのプレビューを設定
    ///
    /// 候補リストの取得に失敗した種別は読み飛ばす。設定した件数を返す。
    pub async fn hydrate(&self, tasks: &mut [Task]) -> usize {
        let kinds: HashSet<RelatedEntityType> = tasks
            .iter()
            .filter(|task| task.preview().is_none() && !task.related().is_none())
            .map(|task| task.related_type())
            .collect();

        let mut lookup: HashMap<RelatedEntityType, Vec<EntityOption>> = HashMap::new();
        for kind in kinds {
            match self.options_for(kind).await {
                Ok(options) => {
                    lookup.insert(kind, options);
                }
                Err(e) => {
                    log_with_context!(
                        tracing::Level::WARN,
                        "Failed to load relation options for hydration",
                        "kind" => kind,
                        "error" => e.to_string()
                    );
                }
            }
        }

        let mut hydrated = 0;
        for task in tasks.iter_mut().filter(|task| task.preview().is_none()) {
            let entity = task.related();
            let (Some(id), Some(options)) = (entity.id(), lookup.get(&entity.kind())) else {
                continue;
            };
            if let Some(option) = options.iter().find(|option| option.id == id) {
                if task.set_preview(preview_from_option(entity, option.clone())) {
                    hydrated += 1;
                }
            }
        }
        hydrated
    }

    /// キャッシュを破棄
    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }
}

fn preview_from_option(entity: RelatedEntity, option: EntityOption) -> EntityPreview {
    EntityPreview {
        entity,
        name: option.name,
        status: option.status,
        avatar: option.avatar_url,
    }
}

/// 関連エンティティ編集中の状態
///
/// 種別が変わると選択中のIDは必ず破棄される。会議の紐付けは扱わない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelationSelection {
    entity_type: RelatedEntityType,
    entity_id: Option<i64>,
}

impl RelationSelection {
    pub fn from_entity(entity: RelatedEntity) -> Self {
        Self {
            entity_type: entity.kind(),
            entity_id: entity.id(),
        }
    }

    pub fn entity_type(&self) -> RelatedEntityType {
        self.entity_type
    }

    pub fn entity_id(&self) -> Option<i64> {
        self.entity_id
    }

    pub fn set_type(&mut self, entity_type: RelatedEntityType) {
        if self.entity_type != entity_type {
            self.entity_type = entity_type;
            self.entity_id = None;
        }
    }

    /// 業務領域の既定の種別に切り替える
    pub fn apply_domain(&mut self, domain: TaskDomain) {
        self.set_type(domain.default_related_type());
    }

    /// 現在の種別の候補リストに含まれるIDのみ選択できる
    pub fn select(&mut self, id: i64, options: &[EntityOption]) -> AppResult<()> {
        if self.entity_type == RelatedEntityType::None {
            return Err(bad_request_error(
                "Cannot select an entity when no relation type is chosen",
                "relation_selection::select",
            ));
        }
        if !options.iter().any(|option| option.id == id) {
            return Err(validation_error(
                "related_entity",
                &format!("{} {} is not an available option", self.entity_type, id),
            ));
        }
        self.entity_id = Some(id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entity_id = None;
    }

    pub fn to_entity(&self) -> AppResult<RelatedEntity> {
        match (self.entity_type, self.entity_id) {
            (RelatedEntityType::None, _) => Ok(RelatedEntity::None),
            (kind, Some(id)) => Ok(kind.with_id(id)),
            (kind, None) => Err(validation_error(
                "related_entity",
                &format!("Please select a {}", kind),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RelationDirectory for CountingDirectory {
        async fn list_students(&self) -> AppResult<Vec<EntityOption>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![EntityOption::new(5, "Li Wei"), EntityOption::new(6, "An Qi")])
        }

        async fn list_leads(&self) -> AppResult<Vec<EntityOption>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![EntityOption::new(42, "Zhao Min")])
        }

        async fn list_employees(&self) -> AppResult<Vec<EntityOption>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![EntityOption::new(3, "Chen")])
        }
    }

    fn resolver() -> (RelationResolver, Arc<CountingDirectory>) {
        let directory = Arc::new(CountingDirectory {
            calls: AtomicUsize::new(0),
        });
        (
            RelationResolver::new(directory.clone(), &SyncConfig::for_testing()),
            directory,
        )
    }

    #[tokio::test]
    async fn test_options_are_cached_per_type() {
        let (resolver, directory) = resolver();

        let leads = resolver.options_for(RelatedEntityType::Lead).await.unwrap();
        assert_eq!(leads.len(), 1);
        resolver.options_for(RelatedEntityType::Lead).await.unwrap();
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);

        assert!(resolver
            .options_for(RelatedEntityType::None)
            .await
            .unwrap()
            .is_empty());

        resolver.invalidate().await;
        resolver.options_for(RelatedEntityType::Lead).await.unwrap();
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hydrate_sets_matching_previews() {
        let (resolver, _) = resolver();
        let mut student_task = Task::new(TaskId::from_storage(1), "Essay review");
        student_task.set_related(RelatedEntity::Student(5));
        let mut unknown = Task::new(TaskId::from_storage(2), "Call");
        unknown.set_related(RelatedEntity::Employee(99));
        let plain = Task::new(TaskId::from_storage(3), "Plain");

        let mut tasks = vec![student_task, unknown, plain];
        assert_eq!(resolver.hydrate(&mut tasks).await, 1);
        assert_eq!(tasks[0].related_entity_name(), Some("Li Wei"));
        assert!(tasks[1].preview().is_none());
        assert!(tasks[2].preview().is_none());
    }

    #[tokio::test]
    async fn test_preview_for() {
        let (resolver, _) = resolver();
        let preview = resolver
            .preview_for(RelatedEntity::Lead(42))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(preview.name, "Zhao Min");
        assert_eq!(preview.entity, RelatedEntity::Lead(42));
        assert!(resolver
            .preview_for(RelatedEntity::None)
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_type_change_clears_selection() {
        let leads = vec![EntityOption::new(42, "Zhao Min")];
        let mut selection = RelationSelection::default();
        selection.set_type(RelatedEntityType::Lead);
        selection.select(42, &leads).unwrap();
        assert_eq!(selection.to_entity().unwrap(), RelatedEntity::Lead(42));

        selection.set_type(RelatedEntityType::Employee);
        assert_eq!(selection.entity_id(), None);
        assert!(selection.to_entity().is_err());
    }

    #[test]
    fn test_same_type_keeps_selection() {
        let mut selection = RelationSelection::from_entity(RelatedEntity::Student(5));
        selection.set_type(RelatedEntityType::Student);
        assert_eq!(selection.entity_id(), Some(5));
    }

    #[test]
    fn test_domain_default_type() {
        let mut selection = RelationSelection::from_entity(RelatedEntity::Student(5));
        selection.apply_domain(TaskDomain::StudentSuccess);
        assert_eq!(selection.entity_id(), Some(5));

        selection.apply_domain(TaskDomain::Marketing);
        assert_eq!(selection.entity_type(), RelatedEntityType::Lead);
        assert_eq!(selection.entity_id(), None);

        selection.apply_domain(TaskDomain::General);
        assert_eq!(selection.to_entity().unwrap(), RelatedEntity::None);
    }

    #[test]
    fn test_select_rejects_ids_outside_options() {
        let students = vec![EntityOption::new(5, "Li Wei")];
        let mut selection = RelationSelection::default();
        assert!(selection.select(5, &students).is_err());

        selection.set_type(RelatedEntityType::Student);
        assert!(selection.select(6, &students).is_err());
        assert_eq!(selection.entity_id(), None);
    }
}
