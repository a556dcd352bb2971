//! Catalog records as they come out of the search index, and the nested
//! [`SearchResult`] the pipeline hands back to callers.
//!
//! Field names on the wire follow the index schema written by the metadata
//! harvester (`*_i` integers, `*_s` strings, `*_ss` string lists, `*_b`
//! booleans). Every record keeps the index fields it does not model in an
//! open `extra` map, so consumers see the whole document.
//!
//! Some fields are only filled in during assembly (denormalized copies from
//! an owning record). They are marked as such below and are omitted from the
//! serialized output when unset.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Index fields not modeled explicitly.
pub type ExtraFields = Map<String, Value>;

/// Index field names used by queries and by the in-memory index.
pub mod fields {
    pub const RECORD_TYPE: &str = "record_type_s";
    pub const PUBLISH: &str = "publish_b";
    pub const KEYWORD: &str = "keyword_t";
    pub const MANUSCRIPT_ID: &str = "manuscript_id_i";
    pub const UNDERTEXT_OBJECT_ID: &str = "undertext_object_id_i";
    pub const MANUSCRIPT_COMPONENT_ID: &str = "manuscript_component_id_i";
    pub const SHELF_MARK: &str = "shelf_mark_s";
    pub const PRIMARY_LANGUAGE: &str = "primary_language_s";
    pub const AUTHOR: &str = "author_s";
    pub const WORK: &str = "work_s";
    pub const POSITION: &str = "position_i";
}

/// A cataloged physical manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    #[serde(rename = "manuscript_id_i")]
    pub id: i64,
    #[serde(rename = "shelf_mark_s", default)]
    pub shelf_mark: String,
    #[serde(rename = "title_s", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "primary_language_s", default, skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,
    #[serde(rename = "script_s", default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(rename = "date_text_s", default, skip_serializing_if = "Option::is_none")]
    pub date_text: Option<String>,
    #[serde(rename = "date_of_origin_start_i", default, skip_serializing_if = "Option::is_none")]
    pub date_of_origin_start: Option<i64>,
    #[serde(rename = "date_of_origin_end_i", default, skip_serializing_if = "Option::is_none")]
    pub date_of_origin_end: Option<i64>,
    #[serde(rename = "support_material_s", default, skip_serializing_if = "Option::is_none")]
    pub support_material: Option<String>,
    #[serde(rename = "folio_count_i", default, skip_serializing_if = "Option::is_none")]
    pub folio_count: Option<i64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A work recovered from the erased layer of a palimpsest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndertextObject {
    #[serde(rename = "undertext_object_id_i")]
    pub id: i64,
    #[serde(rename = "manuscript_id_i")]
    pub manuscript_id: i64,
    #[serde(rename = "author_s", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "work_s", default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(rename = "genre_s", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "primary_language_s", default, skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,
    #[serde(rename = "script_name_s", default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(rename = "script_characterization_s", default, skip_serializing_if = "Option::is_none")]
    pub script_characterization: Option<String>,
    #[serde(rename = "script_date_text_s", default, skip_serializing_if = "Option::is_none")]
    pub script_date_text: Option<String>,
    #[serde(rename = "script_date_start_i", default, skip_serializing_if = "Option::is_none")]
    pub script_date_start: Option<i64>,
    #[serde(rename = "script_date_end_i", default, skip_serializing_if = "Option::is_none")]
    pub script_date_end: Option<i64>,
    #[serde(rename = "place_of_origin_s", default, skip_serializing_if = "Option::is_none")]
    pub place_of_origin: Option<String>,
    #[serde(rename = "folios_ss", default, skip_serializing_if = "Vec::is_empty")]
    pub folios: Vec<String>,
    #[serde(rename = "undertext_folio_order_s", default, skip_serializing_if = "Option::is_none")]
    pub undertext_folio_order: Option<String>,
    #[serde(rename = "folio_order_comments_s", default, skip_serializing_if = "Option::is_none")]
    pub folio_order_comments: Option<String>,
    #[serde(rename = "scholar_name_ss", default, skip_serializing_if = "Vec::is_empty")]
    pub scholar_names: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A structural subdivision of a manuscript (a quire, a leaf, a section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptComponent {
    #[serde(rename = "manuscript_component_id_i")]
    pub id: i64,
    #[serde(rename = "manuscript_id_i")]
    pub manuscript_id: i64,
    #[serde(rename = "position_i", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(rename = "decoration_s", default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
    /// Copied from the owning manuscript during assembly.
    #[serde(rename = "shelf_mark_s", default, skip_serializing_if = "Option::is_none")]
    pub shelf_mark: Option<String>,
    /// Copied from the owning manuscript during assembly.
    #[serde(rename = "support_material_s", default, skip_serializing_if = "Option::is_none")]
    pub support_material: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// The visible text layer of one manuscript component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertextLayer {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "manuscript_component_id_i")]
    pub manuscript_component_id: i64,
    /// Copied from the owning component during assembly.
    #[serde(rename = "decoration_s", default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A recovered text layer of one manuscript component.
///
/// All fields after `undertext_object_id` are copied from the referenced
/// [`UndertextObject`] during assembly, and stay unset when the reference
/// is absent or does not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndertextLayer {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "manuscript_component_id_i")]
    pub manuscript_component_id: i64,
    #[serde(rename = "undertext_object_id_i", default, skip_serializing_if = "Option::is_none")]
    pub undertext_object_id: Option<i64>,
    #[serde(rename = "work_s", default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(rename = "author_s", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "genre_s", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(
        rename = "primary_language_undertext_object_s",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_language_of_undertext_object: Option<String>,
    #[serde(rename = "script_name_s", default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(rename = "script_characterization_s", default, skip_serializing_if = "Option::is_none")]
    pub script_characterization: Option<String>,
    #[serde(rename = "script_date_text_s", default, skip_serializing_if = "Option::is_none")]
    pub script_date_text: Option<String>,
    #[serde(rename = "script_date_start_i", default, skip_serializing_if = "Option::is_none")]
    pub script_date_start: Option<i64>,
    #[serde(rename = "script_date_end_i", default, skip_serializing_if = "Option::is_none")]
    pub script_date_end: Option<i64>,
    #[serde(rename = "place_of_origin_s", default, skip_serializing_if = "Option::is_none")]
    pub place_of_origin: Option<String>,
    #[serde(rename = "folios_ss", default, skip_serializing_if = "Option::is_none")]
    pub folios: Option<Vec<String>>,
    #[serde(rename = "undertext_folio_order_s", default, skip_serializing_if = "Option::is_none")]
    pub undertext_folio_order: Option<String>,
    #[serde(rename = "folio_order_comments_s", default, skip_serializing_if = "Option::is_none")]
    pub folio_order_comments: Option<String>,
    #[serde(rename = "scholar_name_ss", default, skip_serializing_if = "Option::is_none")]
    pub scholar_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl UndertextLayer {
    /// Copies the descriptive fields of `uto` onto this layer.
    pub fn annotate_from(&mut self, uto: &UndertextObject) {
        self.work = uto.work.clone();
        self.author = uto.author.clone();
        self.genre = uto.genre.clone();
        self.primary_language_of_undertext_object = uto.primary_language.clone();
        self.script_name = uto.script_name.clone();
        self.script_characterization = uto.script_characterization.clone();
        self.script_date_text = uto.script_date_text.clone();
        self.script_date_start = uto.script_date_start;
        self.script_date_end = uto.script_date_end;
        self.place_of_origin = uto.place_of_origin.clone();
        self.folios = Some(uto.folios.clone());
        self.undertext_folio_order = uto.undertext_folio_order.clone();
        self.folio_order_comments = uto.folio_order_comments.clone();
        self.scholar_names = Some(uto.scholar_names.clone());
    }
}

/// A manuscript component together with its text layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntry {
    #[serde(flatten)]
    pub component: ManuscriptComponent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overtext_layer: Option<OvertextLayer>,
    #[serde(default)]
    pub undertext_layers: Vec<UndertextLayer>,
}

/// One matching manuscript and everything hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultEntry {
    pub manuscript: Manuscript,
    pub undertext_objects: Vec<UndertextObject>,
    pub manuscript_components: Vec<ComponentEntry>,
}

/// The assembled answer to one search, ordered by shelf mark.
pub type SearchResult = Vec<SearchResultEntry>;
