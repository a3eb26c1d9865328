use keyscope_filters::{build_resolver_predicate, compile, fields, Domain};
use keyscope_query::{render_executor_where, render_resolver_where, QueryConfig};

use super::compile::{load_input, load_resolver, plan};

pub fn run(
    domain: Domain,
    input: Option<&str>,
    keys: Option<&str>,
    config: Option<&str>,
) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let query = load_input(input)?;
    let resolver = load_resolver(keys)?;

    let request = plan(&resolver, domain, &query)?;
    let mut output = serde_json::json!({
        "executor": render_executor_where(&request),
    });

    if domain.is_key_scoped() {
        let groups = query.filter_groups();
        let compiled = compile(domain, &groups);
        let predicate = build_resolver_predicate(&compiled, groups.get(fields::IDENTITIES));
        output["resolver"] = serde_json::json!(render_resolver_where(predicate.as_ref(), &config));
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<&str>) -> anyhow::Result<QueryConfig> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)?;
            Ok(QueryConfig::from_json(&content)?)
        }
        None => Ok(QueryConfig::default()),
    }
}
