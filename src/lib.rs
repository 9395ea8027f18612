#![forbid(unsafe_code)]
#![warn(
    clippy::cognitive_complexity,
    clippy::dbg_macro,
    clippy::doc_link_with_quotes,
    clippy::doc_markdown,
    clippy::empty_line_after_outer_attr,
    clippy::float_cmp_const,
    keyword_idents,
    missing_debug_implementations,
    clippy::mod_module_files,
    non_ascii_idents,
    noop_method_call,
    clippy::semicolon_if_nothing_returned,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
    clippy::suspicious_operation_groupings,
    unused_crate_dependencies,
    unused_extern_crates,
    unused_import_braces,
    clippy::unused_self,
    clippy::used_underscore_binding,
    clippy::useless_let_if_seq,
    clippy::wildcard_imports
)]

#[macro_use]
extern crate serde_json;

pub mod app_config;
pub mod coord_check;
pub mod coord_filter;
pub mod country_geometry;
pub mod desc_rules;
pub mod dump_scan;
pub mod dup_finder;
pub mod entity_details;
pub mod qid_source;
pub mod qid_source_file;
pub mod qid_source_page;
pub mod quickstatements;
pub mod report;
pub mod sparql;
pub mod wikidata_api;

use serde as _;
use tracing_subscriber as _;
