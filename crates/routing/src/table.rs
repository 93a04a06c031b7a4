use std::sync::Arc;

use {
    crossrelay_common::InboundEvent,
    crossrelay_config::{RelayConfig, validate},
    tracing::debug,
};

use crate::{
    error::{Error, Result},
    route::Route,
};

/// Immutable, validated set of routes in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Validate `config` and build the table. Any error diagnostic rejects
    /// the whole table.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let validation = validate(config);
        if validation.has_errors() {
            return Err(Error::InvalidConfig {
                diagnostics: validation.errors().cloned().collect(),
            });
        }
        let routes = config
            .routes
            .iter()
            .map(|cfg| Route::try_from(cfg).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            routes = routes.len(),
            enabled = routes.iter().filter(|r| r.enabled).count(),
            "route table built"
        );
        Ok(Self { routes })
    }

    /// Build from already-constructed routes. Used by tests and embedders
    /// that assemble routes in code.
    #[must_use]
    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: routes.into_iter().map(Arc::new).collect(),
        }
    }

    /// Enabled routes whose source matches `event`, in configuration order.
    #[must_use]
    pub fn match_event(&self, event: &InboundEvent) -> Vec<Arc<Route>> {
        self.routes
            .iter()
            .filter(|route| route.applies_to(event))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
