pub mod event;
pub mod sync;
pub mod translate;

pub use event::{EventService, EVENT_KEY_PREFIX};
pub use sync::MenuSyncService;
pub use translate::{local_to_remote, MenuTranslator, TranslatedMenu};

#[cfg(test)]
pub(crate) mod testing;
