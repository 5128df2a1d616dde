use serde::{Deserialize, Serialize};

use super::status::ApprovalStatus;

pub const DEFAULT_PER_PAGE: usize = 15;
pub const MAX_PER_PAGE: usize = 10_000;

/// Common listing parameters: optional status filter plus pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
}

impl ListQuery {
    pub fn per_page(&self) -> usize {
        match self.per_page {
            Some(value) => value.clamp(1, MAX_PER_PAGE as i64) as usize,
            None => DEFAULT_PER_PAGE,
        }
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1) as usize
    }

    pub fn admits(&self, status: ApprovalStatus) -> bool {
        self.status.map_or(true, |wanted| wanted == status)
    }

    /// Slices already-ordered rows into the requested page.
    pub fn paginate<T>(&self, rows: Vec<T>) -> Page<T> {
        let per_page = self.per_page();
        let current_page = self.page();
        let total = rows.len();
        let last_page = total.div_ceil(per_page).max(1);
        let offset = (current_page - 1).saturating_mul(per_page);

        let data: Vec<T> = rows.into_iter().skip(offset).take(per_page).collect();
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + data.len()))
        };

        Page {
            data,
            meta: PageMeta {
                current_page,
                last_page,
                per_page,
                total,
                from,
                to,
            },
        }
    }

    pub fn empty_page<T>(&self) -> Page<T> {
        self.paginate(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: usize,
    pub last_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub from: Option<usize>,
    pub to: Option<usize>,
}
