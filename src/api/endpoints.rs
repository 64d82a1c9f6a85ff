//! Endpoint paths of the remote store, relative to the configured prefix.

use crate::model::ItemKind;

pub const FILE_PATH: &str = "/xbrl/ix/file_path/";
pub const HEAD_TITLES: &str = "/xbrl/ix/head/list/";
pub const NON_NUMERICS: &str = "/xbrl/ix/non_numeric/list/";
pub const NON_FRACTIONS: &str = "/xbrl/ix/non_fraction/list/";
pub const CONTEXTS: &str = "/xbrl/ix/context/list/";
pub const LABEL_LOCS: &str = "/xbrl/link/lab/loc/list/";
pub const LABEL_ARCS: &str = "/xbrl/link/lab/arc/list/";
pub const LABEL_VALUES: &str = "/xbrl/link/lab/value/list/";
pub const CAL_LOCS: &str = "/xbrl/link/cal/loc/list/";
pub const CAL_ARCS: &str = "/xbrl/link/cal/arc/list/";
pub const PRE_LOCS: &str = "/xbrl/link/pre/loc/list/";
pub const PRE_ARCS: &str = "/xbrl/link/pre/arc/list/";
// The server mounts the definition tables under `/def`, not `/xbrl`.
pub const DEF_LOCS: &str = "/def/link/def/loc/list/";
pub const DEF_ARCS: &str = "/def/link/def/arc/list/";
pub const SOURCES: &str = "/xbrl/source/list/";
pub const SCHEMA_LINKBASES: &str = "/xbrl/schema/linkbase/list/";
pub const SCHEMA_IMPORTS: &str = "/xbrl/schema/import/list/";
pub const SCHEMA_ELEMENTS: &str = "/xbrl/schema/element/list/";
pub const QUALITATIVE: &str = "/xbrl/qualitative/list/";

pub const HEAD_ACTIVE: &str = "/xbrl/ix/head/active/";
pub const HEAD_GENERATE: &str = "/xbrl/ix/head/generate/";
pub const HEAD_IS_ACTIVE: &str = "/xbrl/ix/head/is_active/";
pub const TITLE_SUMMARY: &str = "/ix/summary/ix_title_summary/item/";

/// Route for an item kind. Every source-file batch shares one table.
pub fn endpoint_for(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::FilePath => FILE_PATH,
        ItemKind::HeadTitle => HEAD_TITLES,
        ItemKind::NonFraction => NON_FRACTIONS,
        ItemKind::NonNumeric => NON_NUMERICS,
        ItemKind::Context => CONTEXTS,
        ItemKind::LabLocs => LABEL_LOCS,
        ItemKind::LabArcs => LABEL_ARCS,
        ItemKind::LabValues => LABEL_VALUES,
        ItemKind::CalLocs => CAL_LOCS,
        ItemKind::CalArcs => CAL_ARCS,
        ItemKind::DefLocs => DEF_LOCS,
        ItemKind::DefArcs => DEF_ARCS,
        ItemKind::PreLocs => PRE_LOCS,
        ItemKind::PreArcs => PRE_ARCS,
        ItemKind::Qualitative => QUALITATIVE,
        ItemKind::SchemaLinkBaseRefs => SCHEMA_LINKBASES,
        ItemKind::SchemaImports => SCHEMA_IMPORTS,
        ItemKind::SchemaElements => SCHEMA_ELEMENTS,
        ItemKind::IxSourceFile
        | ItemKind::LabSourceFile
        | ItemKind::CalSourceFile
        | ItemKind::DefSourceFile
        | ItemKind::PreSourceFile
        | ItemKind::QualitativeSourceFile
        | ItemKind::SchemaSourceFile => SOURCES,
    }
}
