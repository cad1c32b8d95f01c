//! Page/limit query decoding.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::PageRequest;

/// Raw pagination query parameters; out-of-range values fall back to the
/// defaults (page 1, limit 10, limit capped at 100).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Clamp into a validated page request.
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let request = PageQuery::default().to_request();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 10);
    }
}
