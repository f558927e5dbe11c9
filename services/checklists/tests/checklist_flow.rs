//! Scenario tests for the checklist store and service
//!
//! These run against an in-memory mock backend with failure injection
//! and a controllable fetch delay.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::error::{StoreError, StoreResult};
use common::identity;
use domain::{
    ChecklistCategory, ChecklistColor, ChecklistItem, ChecklistItemPatch, ChecklistPatch,
    ChecklistStatus, ChecklistTemplate, Difficulty, NewChecklist, NewChecklistItem, Priority,
    TemplateItem, UserChecklist,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use checklists::{ChecklistBackend, ChecklistService, ChecklistStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// In-memory checklist backend
#[derive(Default)]
struct MockBackend {
    checklists: Mutex<Vec<UserChecklist>>,
    templates: Mutex<Vec<ChecklistTemplate>>,
    fetch_delays: Mutex<HashMap<Uuid, Duration>>,
    fail_writes: AtomicBool,
    fail_checklist_writes: AtomicBool,
    template_fetches: AtomicUsize,
    checklist_fetches: AtomicUsize,
}

impl MockBackend {
    fn checked(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Backend("row rejected".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChecklistBackend for MockBackend {
    async fn fetch_owned_checklists(&self, user_id: Uuid) -> StoreResult<Vec<UserChecklist>> {
        self.checklist_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.fetch_delays.lock().await.get(&user_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let checklists = self.checklists.lock().await;
        Ok(checklists
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_templates(&self) -> StoreResult<Vec<ChecklistTemplate>> {
        self.template_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.templates.lock().await.clone())
    }

    async fn create_checklist(
        &self,
        user_id: Uuid,
        new: NewChecklist,
    ) -> StoreResult<UserChecklist> {
        self.checked()?;
        let now = Utc::now();
        let checklist = UserChecklist {
            id: Uuid::new_v4(),
            user_id,
            title: new.title,
            description: new.description,
            category: new.category,
            color: new.color,
            icon: new.icon,
            status: ChecklistStatus::Active,
            template_id: new.template_id,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        };
        self.checklists.lock().await.push(checklist.clone());
        Ok(checklist)
    }

    async fn update_checklist(&self, id: Uuid, patch: ChecklistPatch) -> StoreResult<()> {
        self.checked()?;
        if self.fail_checklist_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("row rejected".to_string()));
        }
        let mut checklists = self.checklists.lock().await;
        let checklist = checklists
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound("checklist", id))?;
        checklist.apply(&patch, Utc::now());
        Ok(())
    }

    async fn delete_checklist(&self, id: Uuid) -> StoreResult<()> {
        self.checked()?;
        self.checklists.lock().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn create_item(&self, new: NewChecklistItem) -> StoreResult<ChecklistItem> {
        self.checked()?;
        let now = Utc::now();
        let item = ChecklistItem {
            id: Uuid::new_v4(),
            checklist_id: new.checklist_id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            due_date: new.due_date,
            completed: false,
            completed_at: None,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        };
        let mut checklists = self.checklists.lock().await;
        if let Some(checklist) = checklists.iter_mut().find(|c| c.id == item.checklist_id) {
            checklist.items.push(item.clone());
        }
        Ok(item)
    }

    async fn create_items(&self, items: Vec<NewChecklistItem>) -> StoreResult<Vec<ChecklistItem>> {
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            created.push(self.create_item(item).await?);
        }
        Ok(created)
    }

    async fn update_item(&self, id: Uuid, patch: ChecklistItemPatch) -> StoreResult<()> {
        self.checked()?;
        let mut checklists = self.checklists.lock().await;
        for checklist in checklists.iter_mut() {
            if let Some(item) = checklist.items.iter_mut().find(|i| i.id == id) {
                item.apply(&patch, Utc::now());
                return Ok(());
            }
        }
        Err(StoreError::NotFound("item", id))
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<()> {
        self.checked()?;
        let mut checklists = self.checklists.lock().await;
        for checklist in checklists.iter_mut() {
            checklist.items.retain(|i| i.id != id);
        }
        Ok(())
    }
}

fn checklist_for(user_id: Uuid, title: &str, item_titles: &[(&str, bool)]) -> UserChecklist {
    let now = Utc::now();
    let id = Uuid::new_v4();
    UserChecklist {
        id,
        user_id,
        title: title.to_string(),
        description: None,
        category: ChecklistCategory::PreArrival,
        color: ChecklistColor::Blue,
        icon: None,
        status: ChecklistStatus::Active,
        template_id: None,
        sort_order: 0,
        created_at: now,
        updated_at: now,
        items: item_titles
            .iter()
            .enumerate()
            .map(|(i, (item_title, completed))| ChecklistItem {
                id: Uuid::new_v4(),
                checklist_id: id,
                title: item_title.to_string(),
                description: None,
                priority: Priority::Medium,
                due_date: None,
                completed: *completed,
                completed_at: completed.then_some(now),
                sort_order: i as i32,
                created_at: now,
                updated_at: now,
            })
            .collect(),
    }
}

struct Harness {
    backend: Arc<MockBackend>,
    service: Arc<ChecklistService<MockBackend>>,
    handle: identity::IdentityHandle,
}

fn harness() -> Harness {
    init_tracing();
    let backend = Arc::new(MockBackend::default());
    let (handle, watcher) = identity::channel();
    let service = Arc::new(ChecklistService::new(
        Arc::new(ChecklistStore::new()),
        Arc::clone(&backend),
        watcher,
    ));
    Harness {
        backend,
        service,
        handle,
    }
}

#[tokio::test]
async fn test_sign_in_populates_and_sign_out_clears() {
    let h = harness();
    let user = Uuid::new_v4();
    h.backend
        .checklists
        .lock()
        .await
        .push(checklist_for(user, "Pre-Arrival", &[("Get I-20", false)]));

    h.handle.sign_in(user);
    h.service.sync_identity().await;
    assert_eq!(h.service.store().checklists().await.len(), 1);
    assert!(!h.service.store().is_loading().await);

    h.handle.sign_out();
    h.service.sync_identity().await;
    assert!(h.service.store().checklists().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_fetch_is_discarded() {
    let h = harness();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    {
        let mut checklists = h.backend.checklists.lock().await;
        checklists.push(checklist_for(user_a, "Old session", &[]));
        checklists.push(checklist_for(user_b, "New session", &[]));
    }
    h.backend
        .fetch_delays
        .lock()
        .await
        .insert(user_a, Duration::from_secs(5));

    // Slow fetch for the first identity starts...
    h.handle.sign_in(user_a);
    let slow = {
        let service = Arc::clone(&h.service);
        tokio::spawn(async move { service.sync_identity().await })
    };
    tokio::task::yield_now().await;

    // ...then a second identity signs in and fetches quickly.
    h.handle.sign_in(user_b);
    h.service.sync_identity().await;
    slow.await.unwrap();

    let titles: Vec<String> = h
        .service
        .store()
        .checklists()
        .await
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["New session".to_string()]);
}

#[tokio::test]
async fn test_create_item_replaces_placeholder_with_canonical_row() {
    let h = harness();
    let user = Uuid::new_v4();
    let checklist = checklist_for(user, "First Week", &[]);
    let checklist_id = checklist.id;
    h.backend.checklists.lock().await.push(checklist);

    h.handle.sign_in(user);
    h.service.sync_identity().await;

    let created = h
        .service
        .create_item(NewChecklistItem {
            checklist_id,
            title: "Open a bank account".to_string(),
            description: None,
            priority: Priority::High,
            due_date: None,
            sort_order: 0,
        })
        .await
        .unwrap();

    let items = h.service.store().checklist(checklist_id).await.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, created.id);

    // The canonical id is the one the backend assigned.
    let remote = h.backend.checklists.lock().await;
    assert_eq!(remote[0].items[0].id, created.id);
}

#[tokio::test]
async fn test_rejected_update_rolls_back_and_surfaces_error() {
    let h = harness();
    let user = Uuid::new_v4();
    let checklist = checklist_for(user, "Docs", &[("Passport renewal", false)]);
    let item_id = checklist.items[0].id;
    h.backend.checklists.lock().await.push(checklist);

    h.handle.sign_in(user);
    h.service.sync_identity().await;
    let before = h.service.store().checklists().await;

    h.backend.fail_writes.store(true, Ordering::SeqCst);
    let result = h
        .service
        .update_item(
            item_id,
            ChecklistItemPatch {
                title: Some("Renamed".to_string()),
                ..ChecklistItemPatch::default()
            },
        )
        .await;

    assert!(matches!(result, Err(StoreError::Backend(_))));
    assert_eq!(h.service.store().checklists().await, before);
    assert!(h.service.store().error().await.is_some());
}

#[tokio::test]
async fn test_mutation_without_identity_fails_fast() {
    let h = harness();
    let result = h
        .service
        .create_item(NewChecklistItem {
            checklist_id: Uuid::new_v4(),
            title: "No user".to_string(),
            description: None,
            priority: Priority::Low,
            due_date: None,
            sort_order: 0,
        })
        .await;

    assert!(matches!(result, Err(StoreError::AuthRequired)));
    // Fail-fast means the backend never saw a call.
    assert!(h.backend.checklists.lock().await.is_empty());
}

#[tokio::test]
async fn test_template_catalog_is_fetched_once() {
    let h = harness();
    let user = Uuid::new_v4();
    h.backend.templates.lock().await.push(ChecklistTemplate {
        id: Uuid::new_v4(),
        title: "Pre-Arrival".to_string(),
        description: "Before the flight".to_string(),
        category: ChecklistCategory::PreArrival,
        color: ChecklistColor::Teal,
        icon: "plane".to_string(),
        difficulty: Difficulty::Easy,
        estimated_time: "2 weeks".to_string(),
        usage_count: 10,
        rating: 4.2,
        featured: true,
        created_at: Utc::now(),
        items: Vec::new(),
    });

    h.handle.sign_in(user);
    h.service.sync_identity().await;
    h.service.sync_identity().await;

    assert_eq!(h.backend.template_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(h.service.store().templates().await.len(), 1);
}

#[tokio::test]
async fn test_completing_last_item_transitions_checklist_status() {
    let h = harness();
    let user = Uuid::new_v4();
    let checklist = checklist_for(user, "Docs", &[("Get I-20", true), ("Get visa", false)]);
    let checklist_id = checklist.id;
    let open_item = checklist.items[1].id;
    h.backend.checklists.lock().await.push(checklist);

    h.handle.sign_in(user);
    h.service.sync_identity().await;

    h.service.set_item_completed(open_item, true).await.unwrap();
    let local = h.service.store().checklist(checklist_id).await.unwrap();
    assert_eq!(local.status, ChecklistStatus::Completed);

    // The status write reached the backend too.
    let remote = h.backend.checklists.lock().await[0].clone();
    assert_eq!(remote.status, ChecklistStatus::Completed);

    // Un-completing any item reverts the checklist to active.
    h.service
        .set_item_completed(open_item, false)
        .await
        .unwrap();
    let local = h.service.store().checklist(checklist_id).await.unwrap();
    assert_eq!(local.status, ChecklistStatus::Active);
}

#[tokio::test]
async fn test_failed_status_write_keeps_committed_item_change() {
    let h = harness();
    let user = Uuid::new_v4();
    let checklist = checklist_for(user, "Docs", &[("Get visa", false)]);
    let checklist_id = checklist.id;
    let item_id = checklist.items[0].id;
    h.backend.checklists.lock().await.push(checklist);

    h.handle.sign_in(user);
    h.service.sync_identity().await;

    // The item write succeeds; only the status follow-up is rejected.
    h.backend
        .fail_checklist_writes
        .store(true, Ordering::SeqCst);
    let result = h.service.set_item_completed(item_id, true).await;
    assert!(matches!(result, Err(StoreError::Backend(_))));

    // The committed item change stands on both sides; the status patch
    // alone was reverted, so local matches the server.
    let local = h.service.store().checklist(checklist_id).await.unwrap();
    assert!(local.items[0].completed);
    assert_eq!(local.status, ChecklistStatus::Active);

    let remote = h.backend.checklists.lock().await[0].clone();
    assert!(remote.items[0].completed);
    assert_eq!(remote.status, ChecklistStatus::Active);
    assert!(h.service.store().error().await.is_some());
}

#[tokio::test]
async fn test_adopt_template_seeds_checklist_with_items() {
    let h = harness();
    let user = Uuid::new_v4();
    let template_id = Uuid::new_v4();
    h.backend.templates.lock().await.push(ChecklistTemplate {
        id: template_id,
        title: "First Week".to_string(),
        description: "Hit the ground running".to_string(),
        category: ChecklistCategory::FirstWeek,
        color: ChecklistColor::Green,
        icon: "calendar".to_string(),
        difficulty: Difficulty::Medium,
        estimated_time: "1 week".to_string(),
        usage_count: 3,
        rating: 4.9,
        featured: false,
        created_at: Utc::now(),
        items: vec![
            TemplateItem {
                title: "Get a SIM card".to_string(),
                description: None,
                priority: Priority::High,
                sort_order: 0,
            },
            TemplateItem {
                title: "Campus tour".to_string(),
                description: None,
                priority: Priority::Low,
                sort_order: 1,
            },
        ],
    });

    h.handle.sign_in(user);
    h.service.sync_identity().await;

    let adopted = h.service.adopt_template(template_id).await.unwrap();
    assert_eq!(adopted.template_id, Some(template_id));
    assert_eq!(adopted.items.len(), 2);

    let stored = h.service.store().checklist(adopted.id).await.unwrap();
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.category, ChecklistCategory::FirstWeek);
}

#[tokio::test]
async fn test_failed_delete_restores_checklist() {
    let h = harness();
    let user = Uuid::new_v4();
    let checklist = checklist_for(user, "Housing", &[("Sign lease", false)]);
    let checklist_id = checklist.id;
    h.backend.checklists.lock().await.push(checklist);

    h.handle.sign_in(user);
    h.service.sync_identity().await;

    h.backend.fail_writes.store(true, Ordering::SeqCst);
    assert!(h.service.delete_checklist(checklist_id).await.is_err());
    assert!(h.service.store().checklist(checklist_id).await.is_some());
}

#[tokio::test]
async fn test_watch_reacts_to_identity_transitions() -> anyhow::Result<()> {
    let h = harness();
    let user = Uuid::new_v4();
    h.backend
        .checklists
        .lock()
        .await
        .push(checklist_for(user, "Finance", &[]));

    let watcher = {
        let service = Arc::clone(&h.service);
        tokio::spawn(async move { service.watch().await })
    };

    h.handle.sign_in(user);
    for _ in 0..100 {
        if !h.service.store().checklists().await.is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(h.service.store().checklists().await.len(), 1);

    // Dropping the auth handle terminates the loop.
    drop(h.handle);
    watcher.await?;
    Ok(())
}
