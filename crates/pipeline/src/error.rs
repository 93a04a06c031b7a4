use crossrelay_common::Network;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Routing(#[from] crossrelay_routing::Error),

    #[error(transparent)]
    Channel(#[from] crossrelay_channels::Error),

    #[error(transparent)]
    Queue(#[from] crossrelay_queue::Error),

    /// A route sends to a network nobody registered a client for.
    #[error("route {route} delivers to {network}, but no {network} client is registered")]
    MissingClient { route: String, network: Network },

    /// Some destinations of a work item failed. The others were delivered.
    #[error("{failed} of {total} destination(s) failed: {}", details.join("; "))]
    Delivery {
        failed: usize,
        total: usize,
        details: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
