use barcode_bridge_settings::{
    BarcodePrintSettings, DEFAULT_PRICE_LIST, DEFAULT_PRINTER, seed_label_size,
};
use serde::Serialize;

use crate::store::{SettingsStore, StoreError};

/// What [`install_default_settings`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    /// Default settings and the built-in label size were written.
    Seeded,
    /// Settings already had label sizes; nothing was written.
    AlreadyConfigured,
}

/// Seed the settings singleton with the built-in label size.
///
/// Existing label sizes are never overwritten. Blank default printer and
/// price list are filled in; other stored values are kept. A singleton that
/// was never saved is treated as empty. Running this twice is harmless.
pub fn install_default_settings<S: SettingsStore + ?Sized>(
    store: &S,
) -> Result<InstallOutcome, StoreError> {
    let mut settings = match store.load_singleton_settings() {
        Ok(settings) => settings,
        Err(e) if e.is_not_found() => BarcodePrintSettings::default(),
        Err(e) => return Err(e),
    };

    if !settings.label_sizes.is_empty() {
        tracing::info!(
            label_sizes = settings.label_sizes.len(),
            "barcode print settings already configured"
        );
        return Ok(InstallOutcome::AlreadyConfigured);
    }

    if settings.printer().is_none() {
        settings.default_printer = Some(DEFAULT_PRINTER.to_owned());
    }
    if settings.price_list().is_none() {
        settings.default_price_list = Some(DEFAULT_PRICE_LIST.to_owned());
    }
    settings.label_sizes.push(seed_label_size());

    store.save_singleton_settings(&settings)?;
    tracing::info!("barcode print settings configured with default label size");
    Ok(InstallOutcome::Seeded)
}
