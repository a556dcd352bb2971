//! Joins the five fetched collections into a nested [`SearchResult`].
//!
//! # Algorithm
//!
//! 1. Index undertext objects by manuscript id (input order kept) and by
//!    undertext object id (last write wins).
//! 2. Index components by manuscript id, undertext layers by component id
//!    (input order kept), and overtext layers by component id (first
//!    encountered wins, later ones are dropped).
//! 3. Walk the manuscripts in input order. For each one attach its undertext
//!    objects and components; copy the manuscript's shelf mark and support
//!    material onto every component; attach each component's layers, copying
//!    decoration onto the overtext layer and the referenced undertext
//!    object's description onto each undertext layer whose reference
//!    resolves.
//!
//! Records that do not hang off a fetched manuscript are dropped. The
//! function never fails: dangling references are simply not followed.
//! Lookups never consume an index entry, so a manuscript or component id
//! that appears twice gets the same children both times.

use std::collections::HashMap;

use crate::models::{
    ComponentEntry, Manuscript, ManuscriptComponent, OvertextLayer, SearchResult,
    SearchResultEntry, UndertextLayer, UndertextObject,
};

/// The five collections fetched by one pipeline run, each already in the
/// order it should appear in the result.
#[derive(Debug, Clone, Default)]
pub struct FetchedRecords {
    pub manuscripts: Vec<Manuscript>,
    pub undertext_objects: Vec<UndertextObject>,
    pub manuscript_components: Vec<ManuscriptComponent>,
    pub overtext_layers: Vec<OvertextLayer>,
    pub undertext_layers: Vec<UndertextLayer>,
}

/// Builds the per-manuscript hierarchy.
pub fn assemble(records: FetchedRecords) -> SearchResult {
    let FetchedRecords {
        manuscripts,
        undertext_objects,
        manuscript_components,
        overtext_layers,
        undertext_layers,
    } = records;

    let mut utos_by_manuscript: HashMap<i64, Vec<UndertextObject>> = HashMap::new();
    let mut uto_by_id: HashMap<i64, &UndertextObject> = HashMap::new();
    for uto in &undertext_objects {
        utos_by_manuscript
            .entry(uto.manuscript_id)
            .or_default()
            .push(uto.clone());
        uto_by_id.insert(uto.id, uto);
    }

    let mut components_by_manuscript: HashMap<i64, Vec<ManuscriptComponent>> = HashMap::new();
    for component in manuscript_components {
        components_by_manuscript
            .entry(component.manuscript_id)
            .or_default()
            .push(component);
    }

    let mut overtext_by_component: HashMap<i64, OvertextLayer> = HashMap::new();
    for layer in overtext_layers {
        overtext_by_component
            .entry(layer.manuscript_component_id)
            .or_insert(layer);
    }

    let mut undertext_by_component: HashMap<i64, Vec<UndertextLayer>> = HashMap::new();
    for mut layer in undertext_layers {
        if let Some(uto) = layer.undertext_object_id.and_then(|id| uto_by_id.get(&id)) {
            layer.annotate_from(uto);
        }
        undertext_by_component
            .entry(layer.manuscript_component_id)
            .or_default()
            .push(layer);
    }

    manuscripts
        .into_iter()
        .map(|manuscript| {
            let undertext_objects = utos_by_manuscript
                .get(&manuscript.id)
                .cloned()
                .unwrap_or_default();

            let manuscript_components = components_by_manuscript
                .get(&manuscript.id)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|mut component| {
                    component.shelf_mark = Some(manuscript.shelf_mark.clone());
                    component.support_material = manuscript.support_material.clone();

                    let overtext_layer =
                        overtext_by_component
                            .get(&component.id)
                            .cloned()
                            .map(|mut layer| {
                                layer.decoration = component.decoration.clone();
                                layer
                            });
                    let undertext_layers = undertext_by_component
                        .get(&component.id)
                        .cloned()
                        .unwrap_or_default();

                    ComponentEntry {
                        component,
                        overtext_layer,
                        undertext_layers,
                    }
                })
                .collect();

            SearchResultEntry {
                manuscript,
                undertext_objects,
                manuscript_components,
            }
        })
        .collect()
}
