//! Column labels of the FileMaker exports.
//!
//! The export names columns `Layout » Field`; units live in separate
//! columns (`Description » Size measurement`).

pub mod contributor {
    pub const KEY: &str = "PrimaryKey";
    pub const FULL_NAME: &str = "Full Name";
    pub const FIRST_NAMES: &str = "First Names";
    pub const LAST_NAME: &str = "Last Name";
}

pub mod link {
    pub const BOOK: &str = "ID_Books";
    pub const CONTRIBUTOR: &str = "ID_Contributors";
    pub const ROLE: &str = "Role";
}

pub mod book {
    pub const KEY: &str = "PrimaryKey";

    pub const TITLE: &str = "Main » Title";
    pub const SUBTITLE: &str = "Main » SubTitle";
    pub const ORIGINAL_TITLE: &str = "Main » Original Title";
    pub const LANGUAGE: &str = "Main » Language";
    pub const ORIGINAL_LANGUAGE: &str = "Main » Original Language";
    pub const SERIES: &str = "Main » Series";
    pub const STATUS: &str = "Main » Status";

    pub const PLACE_PUBLISHED: &str = "Imprint » Place Published";
    pub const RELEASE_YEAR: &str = "Imprint » Release Year";
    pub const PRINTER: &str = "Imprint » Printer";
    pub const PLACE_PRINTED: &str = "Imprint » Place Printed";

    pub const EDITION: &str = "Edition » Edition";
    pub const IMPRESSION: &str = "Edition » Impression";
    pub const ISSUE_STATE: &str = "Edition » Issue State";
    pub const EDITION_COMMENTS: &str = "Edition » Comments";

    pub const PAGES: &str = "Description » Pages";
    pub const PAGINATION: &str = "Description » Pagination";
    pub const VOLUMES: &str = "Description » Volumes";
    pub const HEIGHT: &str = "Description » Height";
    pub const WIDTH: &str = "Description » Width";
    pub const SIZE_UNIT: &str = "Description » Size measurement";
    pub const WEIGHT: &str = "Description » Weight";
    pub const COVER_FORMAT: &str = "Description » Cover format";
    pub const BINDING: &str = "Description » Binding";
    pub const DUST_JACKET: &str = "Description » Dust Jacket";
    pub const SIGNED: &str = "Description » Signed";
    pub const CONDITION: &str = "Description » Condition";
    pub const CONDITION_DESCRIPTION: &str = "Description » Condition Description";

    pub const ISBN_13: &str = "Identifiers » ISBN 13";
    pub const ISBN_10: &str = "Identifiers » ISBN 10";
    pub const OCN: &str = "Identifiers » OCN";
    pub const LCCN: &str = "Identifiers » LCCN";
    pub const COLLECTION_ID: &str = "Identifiers » Collection ID";

    pub const DDC: &str = "Classification » DDC";
    pub const TOPIC: &str = "Classification » Topic";

    pub const LOCATION: &str = "Storage » Location";
    pub const SHELF: &str = "Storage » Shelf";
    pub const SHELF_SECTION: &str = "Storage » Shelf Section";

    pub const PURCHASED_FROM: &str = "Value » Purchased from";
    pub const PURCHASE_DATE: &str = "Value » Purchase Date";
    pub const PAID: &str = "Value » Paid";
    pub const CURRENCY_PAID: &str = "Value » Currency Paid";
    pub const LOWEST_PRICE: &str = "Value » Lowest Price";
    pub const HIGHEST_PRICE: &str = "Value » Highest Price";
    pub const ESTIMATED_VALUE: &str = "Value » Estimated Value";
    pub const SALES_PRICE: &str = "Value » Sales Price";
    pub const CURRENCY_PRICES: &str = "Value » Currency Prices";

    pub const ILLUSTRATIONS: &str = "Info » Illustrations";
    pub const SIGNATURES: &str = "Info » Signatures";
    pub const PROVENANCE: &str = "Info » Provenance";
    pub const BIBLIOGRAPHY: &str = "Info » Bibliography";
    pub const SUMMARY: &str = "Summary » Summary";
    pub const CATALOG_ENTRY: &str = "Catalog » Catalog Entry";
    pub const PRIVATE_COMMENTS: &str = "Info » Private Comments";
}
