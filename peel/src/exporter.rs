//! # The export pipeline
//!
//! One run, strictly sequential: prompt for a destination, duplicate the
//! active document, clear stale paths, dissolve groups, optionally drop
//! invisible layers, trace a boundary path around every remaining layer,
//! save, optionally render per-layer images, close the duplicate.
//!
//! Per-layer boundary failures never abort the run - each layer ends up in
//! the [`RunReport`] as `Exported` or `Skipped` with its reason, and that
//! report is the single place outcomes are surfaced. Failures anywhere else
//! (duplication, rasterization, saving) are fatal; the duplicate is still
//! closed on the way out.

use peel_core::report::{LayerOutcome, LayerReport, RunReport, SkipReason};
use peel_core::request::{ExportOptions, ExportRequest};
use peel_core::state::tree::{AnyID, LayerData, LeafKind};
use peel_core::util::PixelMargin;

use crate::host::{Host, HostError, SaveOptions};
use crate::session::Session;
use crate::writer;

/// File filter handed to the destination prompt.
const LAYERED_FILTER: &str = "*.psd";

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The user dismissed the destination prompt. Nothing was touched.
    #[error("destination prompt cancelled")]
    Cancelled,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Prompt for a destination, then [`run`] against the active document.
///
/// Cancelling the prompt aborts with [`RunError::Cancelled`] before any
/// document is duplicated or mutated.
pub fn run_interactive<H: Host>(
    host: &mut H,
    options: ExportOptions,
) -> Result<RunReport, RunError> {
    let source = host.active_document()?;
    let default_name = host.document_name(&source)?;
    let Some(destination) = host.prompt_save_location(&default_name, LAYERED_FILTER)? else {
        log::info!("destination prompt cancelled, nothing exported");
        return Err(RunError::Cancelled);
    };
    run(host, &source, options.into_request(destination))
}

/// Execute one export run against `source` with a fixed request.
pub fn run<H: Host>(
    host: &mut H,
    source: &H::Doc,
    request: ExportRequest,
) -> Result<RunReport, RunError> {
    let duplicate_name = request
        .destination
        .file_stem()
        .map_or_else(|| "Untitled".to_owned(), |s| s.to_string_lossy().into_owned());

    let mut session = Session::duplicate(host, source, &duplicate_name)?;
    // From here on the duplicate exists and must be closed, pass or fail.
    let result = run_in_session(&mut session, &request);
    let closed = session.close();
    let report = result?;
    closed?;

    host.notify("Export completed!");
    Ok(report)
}

fn run_in_session<H: Host>(
    session: &mut Session<'_, H>,
    request: &ExportRequest,
) -> Result<RunReport, RunError> {
    session.clear_paths()?;
    session.flatten_groups()?;
    if request.visible_only {
        session.remove_invisible()?;
    }

    let layers = session.top_level();
    let mut reports = Vec::with_capacity(layers.len());
    for (id, data) in layers {
        match data.kind() {
            Some(kind) => log::debug!("exporting layer {:?} ({kind})", data.name()),
            None => log::debug!("exporting layer {:?}", data.name()),
        }
        let outcome = export_layer(session, id, &data, request.margin)?;
        reports.push(LayerReport {
            layer: id,
            name: data.name,
            outcome,
        });
    }

    writer::save_document_copy(session, &request.destination, &SaveOptions::default())?;

    let images = if request.export_images {
        writer::export_layers_as_images(session, &request.destination)?
    } else {
        Vec::new()
    };

    Ok(RunReport {
        document: session.model.name.clone(),
        saved_to: request.destination.clone(),
        layers: reports,
        images,
    })
}

/// Trace one layer's boundary path. `Err` is fatal for the whole run;
/// recoverable trouble comes back as `Ok(Skipped { .. })`.
fn export_layer<H: Host>(
    session: &mut Session<'_, H>,
    id: AnyID,
    data: &LayerData,
    margin: PixelMargin,
) -> Result<LayerOutcome, HostError> {
    let skip = |reason| Ok(LayerOutcome::Skipped { reason });

    if data.is_background() {
        log::debug!("skipping background layer {:?}", data.name());
        return skip(SkipReason::Background);
    }
    let leaf = id
        .leaf()
        // Flattening ran before the export loop, so only leaves remain.
        .expect("group layer survived flattening");

    if data.kind() == Some(LeafKind::Fill) {
        // No addressable pixels until rasterized. Not recoverable per-layer:
        // a layer that cannot be rasterized means the document is in a state
        // this run does not understand.
        session.rasterize(leaf)?;
    }

    let selection = match session.select_opaque_region(leaf) {
        Ok(Some(selection)) => selection,
        Ok(None) => {
            log::info!("layer {:?} has no opaque pixels, no path made", data.name());
            return skip(SkipReason::EmptySelection);
        }
        Err(e) => {
            log::warn!("selecting opaque region of {:?} failed: {e}", data.name());
            return skip(SkipReason::SelectionFailed(e.to_string()));
        }
    };

    let selection = match session.expand_selection(selection, margin) {
        Ok(selection) => selection,
        Err(e) => {
            log::warn!("expanding selection of {:?} failed: {e}", data.name());
            return skip(SkipReason::ExpandFailed(e.to_string()));
        }
    };

    let path = match session.trace_selection(selection) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("tracing boundary of {:?} failed: {e}", data.name());
            return skip(SkipReason::TraceFailed(e.to_string()));
        }
    };
    // The path is only useful under the layer's name; a failed rename
    // counts as a failed trace.
    if let Err(e) = session.name_path(path, data.name()) {
        log::warn!("naming boundary path of {:?} failed: {e}", data.name());
        return skip(SkipReason::TraceFailed(e.to_string()));
    }

    Ok(LayerOutcome::Exported { path })
}
