use std::io::Read;
use std::path::Path;

use keyscope_filters::Domain;
use keyscope_query::{plan_query, ExecutorRequest, InMemoryKeyResolver, QueryInput};

pub fn run(domain: Domain, input: Option<&str>, keys: Option<&str>) -> anyhow::Result<()> {
    let query = load_input(input)?;
    let resolver = load_resolver(keys)?;
    let request = plan(&resolver, domain, &query)?;

    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

/// Read a query payload from `path`, or stdin when no path is given
pub fn load_input(path: Option<&str>) -> anyhow::Result<QueryInput> {
    let raw = match path {
        Some(p) => std::fs::read_to_string(Path::new(p))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(QueryInput::from_json(&raw)?)
}

/// Keyspaces file, or an empty resolver (every keyspace is unknown)
pub fn load_resolver(path: Option<&str>) -> anyhow::Result<InMemoryKeyResolver> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(Path::new(p))?;
            Ok(InMemoryKeyResolver::from_json(&content)?)
        }
        None => Ok(InMemoryKeyResolver::new()),
    }
}

pub fn plan(
    resolver: &InMemoryKeyResolver,
    domain: Domain,
    query: &QueryInput,
) -> anyhow::Result<ExecutorRequest> {
    let now = chrono::Utc::now().timestamp_millis();
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let request = runtime.block_on(plan_query(resolver, domain, query, now))?;
    Ok(request)
}
