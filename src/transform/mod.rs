//! Column transformations: id resolution, splitting and list helpers.

pub mod lists;
pub mod rewrite;
pub mod split;

pub use lists::{concat_counts, empty_lists_to_null, strip_nulls_in_lists, unpack_lists, value_counts};
pub use rewrite::{
    resolve_cell, rewrite_column, ForeignKeyIndex, IndexKey, KeyColumns, ReplacePlan, ReplaceStep,
};
pub use split::{split_column, split_column_name};
