use keyscope_core::{absolute_bounds, resolve_at, GranularityContext, GranularityResult};

pub fn run(
    context: GranularityContext,
    start: Option<i64>,
    end: Option<i64>,
    since: Option<&str>,
) -> anyhow::Result<()> {
    let now = chrono::Utc::now().timestamp_millis();
    let result = resolve(context, start, end, since, now);

    let output = serde_json::json!({
        "context": result.context,
        "granularity": result.granularity,
        "startTime": result.start_time,
        "endTime": result.end_time,
        "buckets": result.granularity.bucket_count(&result.window()),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolve(
    context: GranularityContext,
    start: Option<i64>,
    end: Option<i64>,
    since: Option<&str>,
    now: i64,
) -> GranularityResult {
    let (start, end) = absolute_bounds(start, end, since, now);
    resolve_at(context, start, end, now)
}
