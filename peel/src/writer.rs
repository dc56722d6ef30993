//! # Asset persistence
//!
//! Two outputs per run: the duplicated document itself (boundary paths
//! attached), and optionally one standalone image per layer, rendered by
//! soloing each layer in turn.

use std::path::{Path, PathBuf};

use peel_core::name::normalize;
use peel_core::state::tree::AnyID;

use crate::host::{Host, HostResult, ImageOptions, SaveOptions};
use crate::session::Session;

/// File extension for standalone layer images.
const IMAGE_EXT: &str = "png";

/// Persist the session's document (with its paths) to `destination`.
/// Non-destructive by construction: a session only ever wraps a duplicate.
pub fn save_document_copy<H: Host>(
    session: &mut Session<'_, H>,
    destination: &Path,
    options: &SaveOptions,
) -> HostResult<()> {
    log::info!("saving document copy to {}", destination.display());
    session.save(destination, options)
}

/// Render every layer in the document to its own image file under a
/// directory named after `destination`'s file stem. File names are the
/// normalized layer names; importers downstream need them ready-made.
/// Returns the written paths in stacking order.
///
/// Every layer is re-shown at the end no matter which (if any) single
/// export failed - the caller gets the first error only after visibility
/// has been restored.
pub fn export_layers_as_images<H: Host>(
    session: &mut Session<'_, H>,
    destination: &Path,
) -> HostResult<Vec<PathBuf>> {
    let base = destination.with_extension("");
    std::fs::create_dir_all(&base)?;

    let layers: Vec<(AnyID, String)> = session
        .top_level()
        .into_iter()
        .map(|(id, data)| (id, data.name))
        .collect();

    let result = solo_each(session, &layers, &base);

    // Guaranteed restoration, not best-effort: show everything again before
    // surfacing whatever went wrong inside the loop.
    let mut restore = Ok(());
    for (id, _) in &layers {
        let shown = session.set_visible(*id, true);
        if restore.is_ok() {
            restore = shown;
        }
    }
    let written = result?;
    restore?;
    Ok(written)
}

/// Hide everything, then light up and export one layer at a time.
fn solo_each<H: Host>(
    session: &mut Session<'_, H>,
    layers: &[(AnyID, String)],
    base: &Path,
) -> HostResult<Vec<PathBuf>> {
    for (id, _) in layers {
        session.set_visible(*id, false)?;
    }

    let options = ImageOptions::default();
    let mut written = Vec::with_capacity(layers.len());
    for (id, name) in layers {
        let file = base.join(format!("{}.{IMAGE_EXT}", normalize(name)));
        log::debug!("rendering layer {name:?} to {}", file.display());
        session.set_visible(*id, true)?;
        session.export_image(*id, &file, &options)?;
        session.set_visible(*id, false)?;
        written.push(file);
    }
    Ok(written)
}
