use inmo_core::control::HubSettings;
use inmo_core::registry::{CollectionRegistry, RegistryError};
use tracing::info;

use crate::config::InmoConfig;

/// Loads the collection registry and derives the shared hub settings.
///
/// The default summary collection has to resolve at startup so a bad file
/// fails the daemon instead of every summary call.
pub fn build_settings(config: &InmoConfig) -> Result<HubSettings, RegistryError> {
    let registry = CollectionRegistry::from_path(&config.collections_path)?;
    registry.resolve(&config.default_collection)?;
    info!(
        collections = registry.len(),
        path = %config.collections_path.display(),
        "loaded collection registry"
    );

    Ok(HubSettings::new(registry, config.hub_page_id.clone())
        .with_default_collection(config.default_collection.clone())
        .with_serialize_writes(config.serialize_writes))
}
