use thiserror::Error;

/// Report generation errors, one variant per failing component.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider lookup or network failure while fetching market data
    #[error("fetch error for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    /// Chart rasterization failure
    #[error("chart error: {0}")]
    Chart(String),

    /// Template missing, unreadable, or without a title paragraph
    #[error("template error: {0}")]
    Template(String),

    /// Document construction or serialization failure
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Delivery surface failure
    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    pub fn fetch(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Error::Fetch {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::fetch("NEE", "HTTP 404");
        assert_eq!(err.to_string(), "fetch error for NEE: HTTP 404");

        let err = Error::Template("no paragraphs".to_string());
        assert_eq!(err.to_string(), "template error: no paragraphs");
    }
}
