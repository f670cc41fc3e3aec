//! In-memory API catalog built from SP-API model documents.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Categories searched first when an endpoint is looked up by bare operation id.
pub const PRIORITY_CATEGORIES: &[&str] = &["Orders", "FBA Inventory", "Reports"];

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCatalog {
    pub categories: Vec<ApiCategory>,
    pub intent_mappings: Vec<IntentMapping>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    pub name: String,
    pub description: String,
    pub endpoints: Vec<ApiEndpoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<ApiCategory>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    /// `<categoryPrefix>_<operationId>`, unique across the catalog
    pub id: String,
    pub original_operation_id: String,
    pub name: String,
    pub path: String,
    pub method: String,
    pub description: String,
    pub purpose: String,
    pub common_use_cases: Vec<String>,
    pub parameters: Vec<ApiParameter>,
    pub responses: Vec<ApiResponse>,
    pub related_endpoints: Vec<RelatedEndpoint>,
    pub version: VersionInfo,
    pub examples: Vec<UsageExample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
    Other,
}

impl ParameterLocation {
    pub fn parse(value: &str) -> Self {
        match value {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "body" => ParameterLocation::Body,
            "formData" => ParameterLocation::FormData,
            _ => ParameterLocation::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Parsed status; `0` for non-numeric keys such as `default`
    pub status_code: u16,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, ResponseHeader>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseHeader {
    #[serde(rename = "type")]
    pub header_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedEndpoint {
    pub id: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionInfo {
    pub current: String,
    pub deprecated: Vec<String>,
    pub beta: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageExample {
    pub scenario: String,
    pub request: Value,
    pub response: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMapping {
    pub intent: String,
    pub primary_endpoint: String,
    pub reason: String,
}

impl ApiCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            endpoints: Vec::new(),
            subcategories: Vec::new(),
        }
    }

    /// Endpoints of this category followed by those of its subcategories,
    /// each paired with its display path ("Category" or "Category > Sub").
    fn endpoints_with_path(&self) -> impl Iterator<Item = (String, &ApiEndpoint)> {
        let own = self.endpoints.iter().map(move |e| (self.name.clone(), e));
        let nested = self.subcategories.iter().flat_map(move |sub| {
            sub.endpoints
                .iter()
                .map(move |e| (format!("{} > {}", self.name, sub.name), e))
        });
        own.chain(nested)
    }
}

impl ApiEndpoint {
    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &ApiParameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// 200 response, else the first 2xx response.
    pub fn success_response(&self) -> Option<&ApiResponse> {
        self.responses
            .iter()
            .find(|r| r.status_code == 200)
            .or_else(|| {
                self.responses
                    .iter()
                    .find(|r| (200..300).contains(&r.status_code))
            })
    }
}

impl ApiCatalog {
    /// Find an endpoint by unique id, falling back to the bare operation id.
    ///
    /// The fallback checks `Orders`, `FBA Inventory` and `Reports` before the
    /// remaining categories, so `getOrders` resolves to the Orders API even if
    /// another model reuses the operation id.
    pub fn find_endpoint(&self, id: &str) -> Option<&ApiEndpoint> {
        self.endpoint_with_category(id).map(|(endpoint, _)| endpoint)
    }

    /// Same lookup as [`find_endpoint`](Self::find_endpoint), also returning the
    /// category display path.
    pub fn endpoint_with_category(&self, id: &str) -> Option<(&ApiEndpoint, String)> {
        let by_id = self
            .categories
            .iter()
            .flat_map(|c| c.endpoints_with_path())
            .find(|(_, e)| e.id == id);
        if let Some((path, endpoint)) = by_id {
            return Some((endpoint, path));
        }

        for name in PRIORITY_CATEGORIES {
            if let Some(found) = self
                .categories
                .iter()
                .find(|c| c.name == *name)
                .and_then(|c| by_operation_id(c, id))
            {
                return Some(found);
            }
        }

        self.categories
            .iter()
            .filter(|c| !PRIORITY_CATEGORIES.contains(&c.name.as_str()))
            .find_map(|c| by_operation_id(c, id))
    }

    pub fn category_by_name(&self, name: &str) -> Option<&ApiCategory> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Endpoint count including subcategories.
    pub fn total_endpoints(&self) -> usize {
        self.categories
            .iter()
            .map(|c| {
                c.endpoints.len() + c.subcategories.iter().map(|s| s.endpoints.len()).sum::<usize>()
            })
            .sum()
    }
}

fn by_operation_id<'a>(category: &'a ApiCategory, id: &str) -> Option<(&'a ApiEndpoint, String)> {
    category
        .endpoints_with_path()
        .find(|(_, e)| e.original_operation_id == id)
        .map(|(path, e)| (e, path))
}
