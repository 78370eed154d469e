// lodestar-core/src/application/engine.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::error::EtlError;
use crate::ports::connector::{Connector, QueryOutput};

/// Runs an ad-hoc SQL query with instrumentation (logs + timing).
#[instrument(skip(connector), fields(query.len = query.len()))]
pub async fn execute_query(
    connector: &dyn Connector,
    query: &str,
) -> Result<QueryOutput, EtlError> {
    let start = Instant::now();
    debug!("⚡ Executing Query: {}", query);

    let result = connector.query_rows(query).await;

    let duration = start.elapsed();

    match result {
        Ok(output) => {
            debug!("✅ Query finished in {:.2?} ({} rows)", duration, output.rows.len());
            Ok(output)
        }
        Err(e) => {
            // Logged here to keep the timing context, then propagated.
            error!("❌ Query failed after {:.2?}: {}", duration, e);
            Err(e)
        }
    }
}
