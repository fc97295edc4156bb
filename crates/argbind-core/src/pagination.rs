//! Pagination contract shared by every command carrying the
//! `page` / `page_size` / `include_total` keyword block.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::{
    bind::{ParamValue, ParameterMap},
    error::BindingError,
    schema::Command,
};

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(20) {
    Some(size) => size,
    None => NonZeroU32::MIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
    pub page: NonZeroU32,
    pub page_size: NonZeroU32,
    pub include_total: bool,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: NonZeroU32::MIN,
            page_size: DEFAULT_PAGE_SIZE,
            include_total: false,
        }
    }
}

impl PaginationRequest {
    /// Index of the first item on the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let page = usize::try_from(self.page.get() - 1).unwrap_or(usize::MAX);
        page.saturating_mul(self.limit())
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size.get()).unwrap_or(usize::MAX)
    }
}

/// Response envelope. Without `include_total` the two totals are absent from
/// the serialized form, not null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    pub items: Vec<T>,
}

impl<T> PaginatedResult<T> {
    /// Wrap one page of items; `total_items` is only reported when requested.
    #[must_use]
    pub fn new(request: &PaginationRequest, items: Vec<T>, total_items: u64) -> Self {
        let (total_pages, total_items) = if request.include_total {
            (
                Some(total_pages(total_items, request.page_size)),
                Some(total_items),
            )
        } else {
            (None, None)
        };
        Self {
            page: request.page.get(),
            page_size: request.page_size.get(),
            total_pages,
            total_items,
            items,
        }
    }
}

/// `ceil(total_items / page_size)`, zero when there are no items.
#[must_use]
pub fn total_pages(total_items: u64, page_size: NonZeroU32) -> u64 {
    total_items.div_ceil(u64::from(page_size.get()))
}

/// Slice an in-memory list into one page.
#[must_use]
pub fn paginate_list<T: Clone>(items: &[T], request: &PaginationRequest) -> PaginatedResult<T> {
    let page: Vec<T> = items
        .iter()
        .skip(request.offset())
        .take(request.limit())
        .cloned()
        .collect();
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    PaginatedResult::new(request, page, total)
}

// ═══════════════════════════════════════════════════════════════════════════
// NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════

/// Validate and fill the pagination trio of a bound parameter map.
///
/// Returns the map unchanged with `None` for commands without the trio.
/// Otherwise absent values are written back (`page` 1, `page_size` from the
/// argument default or `default_page_size`, `include_total` false).
///
/// # Errors
///
/// Returns `PaginationRange` when `page` or `page_size` is below 1, or too
/// large to represent.
pub fn normalize(
    command: &Command,
    params: ParameterMap,
    default_page_size: NonZeroU32,
) -> Result<(ParameterMap, Option<PaginationRequest>), BindingError> {
    if !command.is_paginated() {
        return Ok((params, None));
    }

    let page_size_default = command
        .argument("page_size")
        .and_then(|arg| ParamValue::from_default(arg).as_int())
        .and_then(|size| u32::try_from(size).ok())
        .and_then(NonZeroU32::new)
        .unwrap_or(default_page_size);

    let page = positive(&params, "page")?.unwrap_or(NonZeroU32::MIN);
    let page_size = positive(&params, "page_size")?.unwrap_or(page_size_default);
    let include_total = params
        .get("include_total")
        .and_then(ParamValue::as_bool)
        .unwrap_or(false);

    let request = PaginationRequest {
        page,
        page_size,
        include_total,
    };
    let params = params
        .update("page".to_string(), ParamValue::Int(i64::from(page.get())))
        .update(
            "page_size".to_string(),
            ParamValue::Int(i64::from(page_size.get())),
        )
        .update("include_total".to_string(), ParamValue::Bool(include_total));

    Ok((params, Some(request)))
}

fn positive(params: &ParameterMap, name: &str) -> Result<Option<NonZeroU32>, BindingError> {
    let Some(value) = params.get(name).and_then(ParamValue::as_int) else {
        return Ok(None);
    };
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .map(Some)
        .ok_or_else(|| BindingError::PaginationRange {
            argument: name.to_string(),
            received: value,
        })
}
