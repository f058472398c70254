use serde::{Deserialize, Deserializer, Serialize};

/// A list endpoint response.
///
/// List routes answer with the paginated envelope
/// `{count, next, previous, results}` when pagination is enabled, and with a
/// bare JSON array otherwise. Both decode into `Page`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            next: None,
            previous: None,
            results,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Bare(Vec<T>),
    Paginated {
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
}

impl<'de, T> Deserialize<'de> for Page<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Paginated {
                count,
                next,
                previous,
                results,
            } => Page {
                count: count.unwrap_or(results.len()),
                next,
                previous,
                results,
            },
            PageRepr::Bare(results) => Page::from(results),
        })
    }
}
