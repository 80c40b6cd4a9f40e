//! Image XObject collection.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::model::{BBox, ImageAsset};

use super::backend::{ObjectRef, PdfBackend, Scope, XObjectKind};

/// Collect every image XObject reachable from a scope's resources.
///
/// Images listed inside Form XObjects are included. Each image object is
/// returned once, in resource listing order, with its stream bytes
/// untouched. `placements` supplies the on-page box of images that the
/// content stream actually paints.
pub fn collect_images<B: PdfBackend>(
    backend: &B,
    scope: Scope,
    placements: &HashMap<ObjectRef, BBox>,
) -> Result<Vec<ImageAsset>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    walk(backend, scope, &mut seen, &mut ids)?;

    let mut images = Vec::with_capacity(ids.len());
    for id in ids {
        match backend.image(id) {
            Ok(mut asset) => {
                asset.placement = placements.get(&id).copied();
                images.push(asset);
            }
            Err(e) => log::warn!("Skipping unreadable image object {:?}: {}", id, e),
        }
    }
    Ok(images)
}

fn walk<B: PdfBackend>(
    backend: &B,
    scope: Scope,
    seen: &mut HashSet<ObjectRef>,
    ids: &mut Vec<ObjectRef>,
) -> Result<()> {
    for entry in backend.xobjects(scope)? {
        if !seen.insert(entry.id) {
            continue;
        }
        match entry.kind {
            XObjectKind::Image => ids.push(entry.id),
            XObjectKind::Form(_) => walk(backend, Scope::Form(entry.id), seen, ids)?,
            XObjectKind::Other => {}
        }
    }
    Ok(())
}
