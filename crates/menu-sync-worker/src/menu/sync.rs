use super::translate::{local_to_remote, MenuTranslator, TranslatedMenu};
use super::EventService;
use crate::database::{Account, MaterialStore, MenuNode, MenuStore};
use crate::platform::{MenuKind, MenuPlatform};
use crate::utils::error::SyncError;
use std::sync::Arc;
use tracing::{debug, info};

/// Sequences the two sync operations. Callers serialize pull/push per
/// account: pull performs destructive teardown, and a concurrent operation
/// on the same account could observe a half-replaced tree.
pub struct MenuSyncService {
    menus: Arc<dyn MenuStore>,
    events: Arc<EventService>,
    translator: MenuTranslator,
    platform: Arc<dyn MenuPlatform>,
}

impl MenuSyncService {
    pub fn new(
        menus: Arc<dyn MenuStore>,
        events: Arc<EventService>,
        materials: Arc<dyn MaterialStore>,
        platform: Arc<dyn MenuPlatform>,
    ) -> Self {
        let translator = MenuTranslator::new(events.clone(), materials);
        Self {
            menus,
            events,
            translator,
            platform,
        }
    }

    /// Remote → local sync. The previous generation (menu rows and their
    /// owned events) is torn down before the fetch, so a failed fetch can
    /// only leave an empty local menu, never a mixed one; re-running pull
    /// recovers.
    pub async fn pull(&self, account: &Account) -> Result<Vec<MenuNode>, SyncError> {
        info!("Pulling menu for account {} ({})", account.id, account.name);

        self.destroy_old_menu(account.id).await?;

        let raw = self.platform.fetch_current(&account.credentials()).await?;

        let TranslatedMenu { buttons, events } =
            self.translator.remote_to_local(account.id, &raw).await?;

        self.menus.replace_tree(account.id, &buttons).await?;

        info!(
            "Pulled {} top-level buttons ({} events created) for account {}",
            buttons.len(),
            events.len(),
            account.id
        );

        Ok(buttons)
    }

    /// Local → remote sync; read-only with respect to local storage.
    pub async fn push(&self, account: &Account) -> Result<(), SyncError> {
        let tree = self.menus.load_tree(account.id).await?;
        self.push_tree(account, &tree).await
    }

    /// Publish an edited tree as-is, without touching the local store.
    pub async fn push_tree(&self, account: &Account, tree: &[MenuNode]) -> Result<(), SyncError> {
        info!(
            "Pushing {} top-level buttons for account {}",
            tree.len(),
            account.id
        );

        let payload = local_to_remote(tree)?;
        self.platform.replace(&account.credentials(), &payload).await
    }

    /// Walk the current local tree, destroy every owned click event, then
    /// drop the tree rows. Foreign keys are skipped by the registry.
    async fn destroy_old_menu(&self, account_id: i64) -> Result<(), SyncError> {
        let tree = self.menus.load_tree(account_id).await?;

        for node in &tree {
            match node {
                MenuNode::Group { children, .. } => {
                    for child in children {
                        self.destroy_button_event(child).await?;
                    }
                }
                button => self.destroy_button_event(button).await?,
            }
        }

        self.menus.delete_tree(account_id).await?;
        debug!("Destroyed previous menu generation for account {}", account_id);

        Ok(())
    }

    async fn destroy_button_event(&self, node: &MenuNode) -> Result<(), SyncError> {
        if let MenuNode::Button {
            kind: MenuKind::Click,
            key,
            ..
        } = node
        {
            self.events.destroy_by_key(key).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::event_repository::EventStore;
    use crate::database::menu_repository::MockMenuStore;
    use crate::database::{EventPayload, EventRecord};
    use crate::menu::testing::{InMemoryEventStore, InMemoryMaterialStore};
    use crate::platform::client::MockMenuPlatform;
    use crate::platform::{Credentials, MenuPayload, RawButton, RawSelfMenu};
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    fn account() -> Account {
        Account {
            id: 1,
            name: "main".to_string(),
            app_id: "wx123".to_string(),
            app_secret: "secret".to_string(),
        }
    }

    fn owned_click(name: &str, key: &str) -> MenuNode {
        MenuNode::Button {
            name: name.to_string(),
            kind: MenuKind::Click,
            key: key.to_string(),
        }
    }

    // Recording fakes: every store/adapter call appends to a shared log so
    // the tests can assert the teardown-fetch-persist ordering.

    struct RecordingMenuStore {
        log: CallLog,
        tree: Mutex<Vec<MenuNode>>,
    }

    #[async_trait]
    impl MenuStore for RecordingMenuStore {
        async fn load_tree(&self, _account_id: i64) -> AnyResult<Vec<MenuNode>> {
            self.log.lock().unwrap().push("load_tree");
            Ok(self.tree.lock().unwrap().clone())
        }

        async fn replace_tree(&self, _account_id: i64, tree: &[MenuNode]) -> AnyResult<()> {
            self.log.lock().unwrap().push("replace_tree");
            *self.tree.lock().unwrap() = tree.to_vec();
            Ok(())
        }

        async fn delete_tree(&self, _account_id: i64) -> AnyResult<()> {
            self.log.lock().unwrap().push("delete_tree");
            self.tree.lock().unwrap().clear();
            Ok(())
        }
    }

    struct RecordingEventStore {
        log: CallLog,
        inner: InMemoryEventStore,
    }

    #[async_trait]
    impl EventStore for RecordingEventStore {
        async fn insert(&self, record: &EventRecord) -> AnyResult<()> {
            self.log.lock().unwrap().push("insert_event");
            self.inner.insert(record).await
        }

        async fn find_by_key(&self, key: &str) -> AnyResult<Option<EventRecord>> {
            self.inner.find_by_key(key).await
        }

        async fn delete_by_key(&self, key: &str) -> AnyResult<u64> {
            self.log.lock().unwrap().push("destroy_event");
            self.inner.delete_by_key(key).await
        }
    }

    struct RecordingPlatform {
        log: CallLog,
        remote: RawSelfMenu,
        fail_fetch: bool,
    }

    #[async_trait]
    impl MenuPlatform for RecordingPlatform {
        async fn fetch_current(&self, _credentials: &Credentials) -> Result<RawSelfMenu, SyncError> {
            self.log.lock().unwrap().push("fetch_current");
            if self.fail_fetch {
                return Err(SyncError::Platform {
                    code: 40001,
                    message: "invalid credential".to_string(),
                });
            }
            Ok(self.remote.clone())
        }

        async fn replace(
            &self,
            _credentials: &Credentials,
            _payload: &MenuPayload,
        ) -> Result<(), SyncError> {
            self.log.lock().unwrap().push("replace_remote");
            Ok(())
        }
    }

    struct Harness {
        log: CallLog,
        store: Arc<RecordingMenuStore>,
        events: Arc<RecordingEventStore>,
        service: MenuSyncService,
    }

    fn harness(old_tree: Vec<MenuNode>, remote: RawSelfMenu, fail_fetch: bool) -> Harness {
        let log: CallLog = Arc::default();

        let store = Arc::new(RecordingMenuStore {
            log: log.clone(),
            tree: Mutex::new(old_tree),
        });
        let events = Arc::new(RecordingEventStore {
            log: log.clone(),
            inner: InMemoryEventStore::default(),
        });
        let platform = Arc::new(RecordingPlatform {
            log: log.clone(),
            remote,
            fail_fetch,
        });

        let service = MenuSyncService::new(
            store.clone(),
            Arc::new(EventService::new(events.clone())),
            Arc::new(InMemoryMaterialStore::default()),
            platform,
        );

        Harness {
            log,
            store,
            events,
            service,
        }
    }

    fn remote_with_view() -> RawSelfMenu {
        let mut remote = RawSelfMenu::default();
        remote.selfmenu_info.button = vec![RawButton {
            name: Some("Site".to_string()),
            kind: Some("view".to_string()),
            url: Some("https://x".to_string()),
            ..Default::default()
        }];
        remote
    }

    #[tokio::test]
    async fn test_pull_tears_down_before_fetching() {
        let old_tree = vec![
            owned_click("Old", "XN_EVENT_OLD"),
            MenuNode::Button {
                name: "Theirs".to_string(),
                kind: MenuKind::Click,
                key: "FOREIGN_KEY".to_string(),
            },
        ];
        let hx = harness(old_tree, remote_with_view(), false);

        // Seed the owned event so teardown has something to destroy
        hx.events
            .inner
            .insert(&EventRecord {
                key: "XN_EVENT_OLD".to_string(),
                account_id: 1,
                payload: EventPayload::Text("old".to_string()),
            })
            .await
            .unwrap();

        hx.service.pull(&account()).await.unwrap();

        // Foreign key never reaches the store, so exactly one destroy_event
        assert_eq!(
            *hx.log.lock().unwrap(),
            vec![
                "load_tree",
                "destroy_event",
                "delete_tree",
                "fetch_current",
                "replace_tree",
            ]
        );
    }

    #[tokio::test]
    async fn test_pull_replaces_local_tree_with_translation() {
        let hx = harness(Vec::new(), remote_with_view(), false);

        let pulled = hx.service.pull(&account()).await.unwrap();

        let expected = vec![MenuNode::Button {
            name: "Site".to_string(),
            kind: MenuKind::View,
            key: "https://x".to_string(),
        }];
        assert_eq!(pulled, expected);
        assert_eq!(*hx.store.tree.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_empty_tree_and_no_writes() {
        let hx = harness(vec![owned_click("Old", "XN_EVENT_OLD")], RawSelfMenu::default(), true);

        let err = hx.service.pull(&account()).await.unwrap_err();
        assert!(matches!(err, SyncError::Platform { code: 40001, .. }));

        // Teardown completed, nothing was persisted after the failure
        assert!(hx.store.tree.lock().unwrap().is_empty());
        assert!(!hx.log.lock().unwrap().contains(&"replace_tree"));
    }

    #[tokio::test]
    async fn test_push_is_read_only_locally() {
        let tree = vec![owned_click("Hello", "XN_EVENT_A")];

        let mut menus = MockMenuStore::new();
        let tree_for_mock = tree.clone();
        menus
            .expect_load_tree()
            .times(1)
            .returning(move |_| Ok(tree_for_mock.clone()));
        // No expectations for replace_tree/delete_tree: any local write panics

        let mut platform = MockMenuPlatform::new();
        platform
            .expect_replace()
            .times(1)
            .withf(|credentials, payload| {
                credentials.app_id == "wx123"
                    && payload.button.len() == 1
                    && payload.button[0].key.as_deref() == Some("XN_EVENT_A")
            })
            .returning(|_, _| Ok(()));

        let service = MenuSyncService::new(
            Arc::new(menus),
            Arc::new(EventService::new(Arc::new(InMemoryEventStore::default()))),
            Arc::new(InMemoryMaterialStore::default()),
            Arc::new(platform),
        );

        service.push(&account()).await.unwrap();
    }

    #[tokio::test]
    async fn test_push_tree_publishes_edited_tree_without_loading() {
        let mut platform = MockMenuPlatform::new();
        platform
            .expect_replace()
            .times(1)
            .withf(|_, payload| payload.button[0].url.as_deref() == Some("https://edited"))
            .returning(|_, _| Ok(()));

        // MenuStore mock without expectations: any call at all panics
        let service = MenuSyncService::new(
            Arc::new(MockMenuStore::new()),
            Arc::new(EventService::new(Arc::new(InMemoryEventStore::default()))),
            Arc::new(InMemoryMaterialStore::default()),
            Arc::new(platform),
        );

        let edited = vec![MenuNode::Button {
            name: "Site".to_string(),
            kind: MenuKind::View,
            key: "https://edited".to_string(),
        }];

        service.push_tree(&account(), &edited).await.unwrap();
    }
}
