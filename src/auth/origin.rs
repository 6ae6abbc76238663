use serde::Deserialize;

/// Query parameters that mark a flow as extension-initiated
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginQuery {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub extension_id: Option<String>,
}

/// Who started the credential flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOrigin {
    /// Opened directly in the browser
    Web,
    /// Opened by the extension (`?source=extension`), possibly without an id
    Extension { peer_id: Option<String> },
}

impl FlowOrigin {
    #[must_use]
    pub fn from_query(query: &OriginQuery) -> Self {
        if query.source.as_deref() == Some("extension") {
            Self::Extension {
                peer_id: query.extension_id.clone(),
            }
        } else {
            Self::Web
        }
    }

    #[must_use]
    pub fn is_extension(&self) -> bool {
        matches!(self, Self::Extension { .. })
    }

    #[must_use]
    pub fn peer_id(&self) -> Option<&str> {
        match self {
            Self::Extension { peer_id } => peer_id.as_deref(),
            Self::Web => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(source: Option<&str>, extension_id: Option<&str>) -> OriginQuery {
        OriginQuery {
            source: source.map(str::to_string),
            extension_id: extension_id.map(str::to_string),
        }
    }

    #[test]
    fn test_extension_origin() {
        let origin = FlowOrigin::from_query(&query(Some("extension"), Some("abcdef")));
        assert!(origin.is_extension());
        assert_eq!(origin.peer_id(), Some("abcdef"));
    }

    #[test]
    fn test_extension_origin_without_id() {
        let origin = FlowOrigin::from_query(&query(Some("extension"), None));
        assert_eq!(origin, FlowOrigin::Extension { peer_id: None });
    }

    #[test]
    fn test_web_origin_ignores_stray_extension_id() {
        assert_eq!(FlowOrigin::from_query(&query(None, Some("abcdef"))), FlowOrigin::Web);
        assert_eq!(
            FlowOrigin::from_query(&query(Some("web"), Some("abcdef"))),
            FlowOrigin::Web
        );
        assert_eq!(FlowOrigin::Web.peer_id(), None);
    }
}
