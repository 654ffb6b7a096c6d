//! Source row → destination entity.

use crate::columns::{book as col, contributor as ccol};
use crate::matcher::{resolve_detailed, MatchMode, Resolution};
use crate::model::{Book, Contributor, ExternalRecord, InternalId, LegacyKey, OwnerId};
use crate::normalize::{
    convert_length, normalize_identifier, render, to_bounded_text, to_boolean, to_currency,
    to_date_string, to_float, to_integer, to_text,
};
use crate::reference::{ReferenceCatalog, ReferenceMap};
use crate::report::{SoftFailure, SoftFailureCounts};
use crate::vocabulary::{AliasTable, Vocabulary};

pub const UNTITLED: &str = "Untitled";

// Destination column widths.
const TITLE_MAX: usize = 500;
const NAME_MAX: usize = 255;
const SHORT_TEXT_MAX: usize = 255;
const ISBN_13_MAX: usize = 17;
const ISBN_10_MAX: usize = 13;

/// Everything a builder reads besides the row itself.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub owner: &'a OwnerId,
    pub catalog: &'a ReferenceCatalog,
    pub vocabulary: &'a Vocabulary,
    pub default_size_unit: &'a str,
}

pub fn build_contributor(
    record: &ExternalRecord,
    key: LegacyKey,
    id: InternalId,
    ctx: &BuildContext<'_>,
) -> Result<Contributor, SoftFailure> {
    let full_name =
        to_bounded_text(record.get(ccol::FULL_NAME), NAME_MAX).ok_or(SoftFailure::MissingName)?;
    let given_names = to_bounded_text(record.get(ccol::FIRST_NAMES), NAME_MAX);
    let family_name = to_bounded_text(record.get(ccol::LAST_NAME), NAME_MAX);

    let sort_name = match (&family_name, &given_names) {
        (Some(family), Some(given)) => format!("{family}, {given}"),
        _ => full_name.clone(),
    };

    Ok(Contributor {
        id,
        kind: "person",
        canonical_name: full_name.clone(),
        sort_name,
        display_name: full_name,
        given_names,
        family_name,
        created_by_user_id: ctx.owner.clone(),
        filemaker_id: key,
    })
}

/// Books have no required source field besides the key; missing titles
/// become [`UNTITLED`]. Category labels that do not resolve are dropped and
/// counted in `failures`.
pub fn build_book(
    record: &ExternalRecord,
    key: LegacyKey,
    id: InternalId,
    ctx: &BuildContext<'_>,
    failures: &mut SoftFailureCounts,
) -> Book {
    let vocab = ctx.vocabulary;
    let catalog = ctx.catalog;
    let text = |column: &str| to_text(record.get(column));
    let short = |column: &str| to_bounded_text(record.get(column), SHORT_TEXT_MAX);
    let float = |column: &str| to_float(record.get(column));

    let mut category = |column: &str,
                        reference: &ReferenceMap,
                        aliases: &AliasTable,
                        mode: MatchMode,
                        unmatched: SoftFailure| {
        let label = render(record.get(column));
        match resolve_detailed(label.as_deref(), reference, aliases, mode) {
            Resolution::Matched(id) => Some(id),
            Resolution::Blank => None,
            Resolution::IntentionallyUnmapped => {
                failures.record(SoftFailure::IntentionallyUnmapped);
                None
            }
            Resolution::Unmatched => {
                log::debug!(
                    "book {key} (row {}): {unmatched} '{}'",
                    record.row(),
                    label.as_deref().unwrap_or_default()
                );
                failures.record(unmatched);
                None
            }
        }
    };

    let language_id = category(
        col::LANGUAGE,
        &catalog.languages,
        &vocab.language_aliases,
        MatchMode::Exact,
        SoftFailure::UnmatchedLanguage,
    );
    let original_language_id = category(
        col::ORIGINAL_LANGUAGE,
        &catalog.languages,
        &vocab.language_aliases,
        MatchMode::Exact,
        SoftFailure::UnmatchedOriginalLanguage,
    );
    let condition_id = category(
        col::CONDITION,
        &catalog.conditions,
        &vocab.condition_aliases,
        MatchMode::Containment,
        SoftFailure::UnmatchedCondition,
    );
    let binding_id = category(
        col::BINDING,
        &catalog.bindings,
        &vocab.binding_aliases,
        MatchMode::Containment,
        SoftFailure::UnmatchedBinding,
    );

    let size_unit = render(record.get(col::SIZE_UNIT));
    let size_unit = size_unit.as_deref().unwrap_or(ctx.default_size_unit);
    let status_label = render(record.get(col::STATUS));

    Book {
        id,
        user_id: ctx.owner.clone(),
        title: to_bounded_text(record.get(col::TITLE), TITLE_MAX)
            .unwrap_or_else(|| UNTITLED.to_string()),
        subtitle: to_bounded_text(record.get(col::SUBTITLE), TITLE_MAX),
        original_title: to_bounded_text(record.get(col::ORIGINAL_TITLE), TITLE_MAX),
        language_id,
        original_language_id,
        series: short(col::SERIES),
        status: vocab.statuses.status_for(status_label.as_deref()),

        publication_place: short(col::PLACE_PUBLISHED),
        publication_year: to_integer(record.get(col::RELEASE_YEAR)),
        printer: short(col::PRINTER),
        printing_place: short(col::PLACE_PRINTED),

        edition: short(col::EDITION),
        impression: short(col::IMPRESSION),
        issue_state: short(col::ISSUE_STATE),
        edition_notes: text(col::EDITION_COMMENTS),

        page_count: to_integer(record.get(col::PAGES)),
        pagination_description: short(col::PAGINATION),
        volumes: short(col::VOLUMES),
        height_mm: convert_length(float(col::HEIGHT), Some(size_unit)),
        width_mm: convert_length(float(col::WIDTH), Some(size_unit)),
        weight_grams: float(col::WEIGHT),
        cover_type: short(col::COVER_FORMAT),
        binding_id,
        has_dust_jacket: to_boolean(record.get(col::DUST_JACKET)),
        is_signed: to_boolean(record.get(col::SIGNED)),
        condition_id,
        condition_notes: text(col::CONDITION_DESCRIPTION),

        isbn_13: normalize_identifier(record.get(col::ISBN_13), ISBN_13_MAX),
        isbn_10: normalize_identifier(record.get(col::ISBN_10), ISBN_10_MAX),
        oclc_number: short(col::OCN),
        lccn: short(col::LCCN),
        user_catalog_id: short(col::COLLECTION_ID),
        ddc: short(col::DDC),
        topic: short(col::TOPIC),

        storage_location: short(col::LOCATION),
        shelf: short(col::SHELF),
        shelf_section: short(col::SHELF_SECTION),

        acquired_from: short(col::PURCHASED_FROM),
        acquired_date: to_date_string(record.get(col::PURCHASE_DATE)),
        acquired_price: float(col::PAID),
        acquired_currency: to_currency(record.get(col::CURRENCY_PAID)),
        lowest_price: float(col::LOWEST_PRICE),
        highest_price: float(col::HIGHEST_PRICE),
        estimated_value: float(col::ESTIMATED_VALUE),
        sales_price: float(col::SALES_PRICE),
        price_currency: to_currency(record.get(col::CURRENCY_PRICES)),

        illustrations_description: text(col::ILLUSTRATIONS),
        signatures_description: text(col::SIGNATURES),
        provenance: text(col::PROVENANCE),
        bibliography: text(col::BIBLIOGRAPHY),
        summary: text(col::SUMMARY),
        catalog_entry: text(col::CATALOG_ENTRY),
        internal_notes: text(col::PRIVATE_COMMENTS),

        filemaker_id: key,
    }
}
